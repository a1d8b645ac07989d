//! Host capabilities consumed by overlay controllers.
//!
//! A host exposes a document tree through the [`Document`] trait (selector
//! lookup, attribute access, event subscription) and deferred one-shot work
//! through the [`Scheduler`] trait. [`MemoryDocument`] and [`ManualScheduler`]
//! are complete in-process hosts used by tests and headless embedders;
//! [`TokioScheduler`] defers work onto a tokio runtime.

/// The document capability trait.
pub mod document;
/// Host error types.
pub mod error;
/// Events, event targets and listener handles.
pub mod event;
/// In-memory document tree with DOM-order event dispatch.
pub mod memory;
/// Node identifiers.
pub mod node;
/// Deferred one-shot task scheduling.
pub mod scheduler;
/// Simple CSS selector parsing and matching.
pub mod selector;

pub use document::Document;
pub use error::HostError;
pub use event::{Event, EventKind, EventTarget, Listener, ListenerId, ListenerOptions};
pub use memory::{ListenerStats, MemoryDocument};
pub use node::NodeId;
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler};
pub use selector::SelectorList;
