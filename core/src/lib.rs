//! larder-core: models, engines, and storage for the larder recipe organizer.
//!
//! The interesting parts live in three pure layers: `convert` (direct-edge
//! unit conversion), `deduct` (multi-lot inventory deduction), and `session`
//! (the cooking session state machine). `service::Organizer` coordinates
//! them, owning the `AppData` aggregate and persisting it through `store`.

pub mod convert;
pub mod csv_import;
pub mod deduct;
pub mod models;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;
