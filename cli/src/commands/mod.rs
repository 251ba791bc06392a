mod cook;
mod helpers;
mod ingredient;
mod inventory;
mod measurement;
mod recipe;
mod user;

pub(crate) use cook::{
    cmd_cook_cancel, cmd_cook_check, cmd_cook_complete, cmd_cook_serving, cmd_cook_start,
    cmd_cook_status,
};
pub(crate) use ingredient::{cmd_ingredient_add, cmd_ingredient_list};
pub(crate) use inventory::{
    cmd_inventory_add, cmd_inventory_check, cmd_inventory_import, cmd_inventory_list,
    cmd_inventory_remove, cmd_inventory_set,
};
pub(crate) use measurement::{
    cmd_measurement_convert, cmd_measurement_link, cmd_measurement_list, cmd_measurement_show,
};
pub(crate) use recipe::{
    cmd_recipe_add, cmd_recipe_add_ingredient, cmd_recipe_add_step, cmd_recipe_delete,
    cmd_recipe_list, cmd_recipe_remove_ingredient, cmd_recipe_set_servings, cmd_recipe_show,
};
pub(crate) use user::{cmd_user_add, cmd_user_list, cmd_user_login};
