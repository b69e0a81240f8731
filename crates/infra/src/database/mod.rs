//! SQLite persistence

pub mod glucose_store;
pub mod manager;

pub use glucose_store::SqliteGlucoseStore;
pub use manager::DbManager;
