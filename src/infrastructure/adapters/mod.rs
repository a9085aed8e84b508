//! Platform adapters - Gateway, responder and registrar implementations

pub mod console;
pub mod memory;
pub mod rest;

pub use console::{ConsoleGateway, ConsoleResponder};
pub use memory::{MemoryGateway, MemoryRegistrar, RecordedResponse, RecordingResponder};
pub use rest::{LogRegistrar, RestRegistrar, DEFAULT_API_BASE};
