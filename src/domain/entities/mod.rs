//! Domain entities - Core objects exchanged between the runtime and plugins

pub mod user;
pub mod message;
pub mod interaction;
pub mod event;
pub mod response;
pub mod command;
pub mod module;

pub use user::User;
pub use message::ChatMessage;
pub use interaction::{Interaction, InteractionKind};
pub use event::{GatewayEvent, ReadyInfo, INTERACTION_CREATE, MESSAGE_CREATE, READY};
pub use response::{Embed, ResponsePayload, COLOR_RED};
pub use command::{CommandDescriptor, CommandMetadata};
pub use module::{EventBinding, LoadedModule, PluginModule, ServiceHandle};
