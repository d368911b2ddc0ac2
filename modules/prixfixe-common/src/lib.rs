pub mod config;
pub mod error;
pub mod events;
pub mod messages;
pub mod types;

#[cfg(feature = "fakes")]
pub mod fakes;

pub use config::{Config, LogFormat};
pub use error::PrixFixeError;
pub use events::{DataChangeMessage, Entity, MessageType};
pub use messages::*;
pub use types::*;
