//! External service integrations

pub mod linkup;
