//! Asynchronous mutation workers.
//!
//! Three workers consume the pre-writes, pre-updates and pre-archives topics.
//! Each delivery is routed by its `dataType` tag to a handler that persists
//! the change through a [`DataManager`], mirrors searchable entities into
//! their index, and publishes a [`DataChangeMessage`](prixfixe_common::DataChangeMessage).
//! A handler error means the broker should redeliver.

pub mod archives;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod publish;
pub mod replay;
pub mod router;
pub mod search;
pub mod traits;
pub mod updates;
pub mod writes;

mod pipeline;
mod votes;

pub use archives::ArchivesWorker;
pub use context::{ContextError, MessageContext};
pub use dispatch::Dispatch;
pub use error::{CascadeStep, IndexOp, Verb, WorkerError};
pub use memory::{MemoryDataManager, MemorySearchIndex, MemorySearchIndexProvider};
pub use publish::MemoryPublisher;
pub use router::{Topic, Workers};
pub use search::{HttpSearchIndex, HttpSearchIndexProvider, IndexDefinition, SearchIndexes};
pub use traits::{DataManager, MessageHandler, Publisher, SearchIndexManager, SearchIndexProvider};
pub use updates::UpdatesWorker;
pub use writes::WritesWorker;
