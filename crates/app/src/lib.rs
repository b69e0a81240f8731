//! # Glucolink Application
//!
//! Process bootstrap for the LibreLinkUp scraper: wires the SQLite store,
//! the LibreLinkUp client and the scraper coordinator into one
//! [`AppContext`].

pub mod context;
pub mod utils;

pub use context::AppContext;
