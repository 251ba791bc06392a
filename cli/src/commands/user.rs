use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::Style,
};

use larder_core::service::Organizer;

pub(crate) fn cmd_user_add(organizer: &mut Organizer, name: &str, json: bool) -> Result<()> {
    let user = organizer.add_user(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        let name = &user.name;
        println!("Added user: {name}");
        println!("Log in with: larder user login \"{name}\"");
    }
    Ok(())
}

pub(crate) fn cmd_user_login(organizer: &mut Organizer, name: &str, json: bool) -> Result<()> {
    let user = organizer.login(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("Logged in as {}", user.name);
    }
    Ok(())
}

pub(crate) fn cmd_user_list(organizer: &Organizer, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct UserRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Joined")]
        joined: String,
        #[tabled(rename = "Current")]
        current: String,
    }

    fn joined_date(created_at: &str) -> String {
        chrono::DateTime::parse_from_rfc3339(created_at)
            .map_or_else(|_| created_at.to_string(), |dt| dt.format("%Y-%m-%d").to_string())
    }

    let users = organizer.users();
    if users.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No users found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }

    let current = organizer.current_user().map(|u| u.id.clone()).ok();
    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            name: u.name.clone(),
            joined: joined_date(&u.created_at),
            current: if current.as_deref() == Some(&u.id) {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
