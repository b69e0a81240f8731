//! LibreLinkUp cloud integration
//!
//! Implements the core `LinkUpApi` port over HTTPS. Every call is a single
//! request carrying the vendor client headers; successful responses carry a
//! renewed auth ticket which replaces the session's current one.

pub mod client;
mod wire;

pub use client::LinkUpClient;
