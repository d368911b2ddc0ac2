//! Domain-agnostic, append-only outbox for outbound messages.
//!
//! Rows carry an opaque JSONB payload plus the routing columns a relay needs
//! (topic, message type, data type). Nothing here knows what a recipe is.

pub mod store;
pub mod types;

pub use store::OutboxStore;
pub use types::{OutboundMessage, StoredMessage};
