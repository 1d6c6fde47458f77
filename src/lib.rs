// src/lib.rs
// DOCUMENTATION: Library root
// PURPOSE: Map marker orchestration over the internal catalog and the external place provider

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
