//! herald-bot - Module-driven chat bot runtime
//!
//! Discovers command, event and service modules on disk, wires them into a
//! shared [`application::Client`], and keeps every plugin failure contained.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
