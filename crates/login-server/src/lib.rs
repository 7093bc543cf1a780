//! Process wiring for the login service: configuration loading and
//! validation. The binary in `main.rs` assembles the store, the identity
//! provider and the router from a [`ServerConfig`].

pub mod settings;

pub use settings::{ConfigError, ServerConfig};
