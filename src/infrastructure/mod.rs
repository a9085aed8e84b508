//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Plugins: Module discovery and import
//! - Adapters: Platform integrations (console, REST, in-memory)
//! - Database: SQLite storage service

pub mod config;
pub mod plugins;
pub mod adapters;
pub mod database;
