//! Storage ports

pub mod ports;
