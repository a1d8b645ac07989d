//! Presentation-state controller for a dismissible overlay.
//!
//! An [`OverlayController`] owns the open/closed state of one overlay root in
//! a host [`Document`](scrim_host::Document). The state is projected onto an
//! attribute on the root for external styling to react to. While open the
//! controller optionally closes on Escape, closes on pointer-down outside the
//! dialog boundary, and marks `<body>` so styling can suppress scrolling.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use scrim_host::{Document, ManualScheduler, MemoryDocument};
//! use scrim_overlay::{OverlayController, OverlayOptions};
//!
//! let document = Arc::new(MemoryDocument::new());
//! let root = document
//! 	.append_element(document.body(), "div", &[("id", "signup")])
//! 	.unwrap();
//! let overlay = OverlayController::builder(document.clone(), "#signup")
//! 	.options(OverlayOptions::default().with_lock_scroll(true))
//! 	.scheduler(Arc::new(ManualScheduler::new()))
//! 	.on_open(|overlay| tracing::info!(root = ?overlay.root(), "signup shown"))
//! 	.build();
//!
//! overlay.open();
//! assert_eq!(document.attribute(root, "data-state").as_deref(), Some("open"));
//! document.key_down("Escape");
//! assert!(!overlay.is_open());
//! ```

/// The overlay controller and its builder.
pub mod controller;
/// Configuration and mount errors.
pub mod error;
/// Transition callbacks.
pub mod hooks;
#[cfg(test)]
mod invariants;
/// Selector-or-node references.
pub mod node_ref;
/// Construction options.
pub mod options;
mod scroll_lock;
/// Overlay state and close reasons.
pub mod state;

pub use controller::{OverlayBuilder, OverlayController};
pub use error::{ConfigError, MountError};
pub use hooks::{FnHooks, HookFn, NoopHooks, OverlayHooks};
pub use node_ref::NodeRef;
pub use options::{OverlayOptions, StateMarkers};
pub use state::{CloseReason, OverlayState};
