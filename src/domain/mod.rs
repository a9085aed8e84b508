//! Domain layer - Core objects and the seams plugins and platforms plug into
//!
//! This layer contains:
//! - Entities: Interactions, events, responses, modules, command descriptors
//! - Traits: Plugin capabilities (executor, handler, service) and the
//!   platform collaborators (gateway, responder, registrar)

pub mod entities;
pub mod traits;
