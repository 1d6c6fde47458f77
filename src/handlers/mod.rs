// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod health;
pub mod sessions;

pub use health::config as health_config;
pub use sessions::config as sessions_config;
