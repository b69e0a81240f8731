//! LibreLinkUp scraping logic

pub mod cycle;
pub mod errors;
pub mod ports;
pub mod resolver;
pub mod session;
