//! The overlay controller.
//!
//! # Lifecycle
//!
//! ```text
//! construct ──► resolve root ──┬─ missing ─► inert (warn once, every call a no-op)
//!                              └─ found ───► resolve dialog boundary
//!                                            write inactive marker unless one is present
//!                                            bind trigger clicks (permanent)
//!                                            schedule auto-open (optional)
//!
//!        open()                                  close()
//! Closed ──────► Open                      Open ──────► Closed
//!   1. state marker = active                 1. state marker = inactive
//!   2. body scroll lock (lock_scroll)        2. release body scroll lock
//!   3. document keydown, capture             3. remove every state-scoped listener
//!   4. root pointerdown + touchstart         4. on_close(controller)
//!   5. on_open(controller)
//! ```
//!
//! State-scoped listeners exist only while open. Trigger bindings live as long
//! as the document does and hold only weak references to the controller.
//! Dropping the last handle of an open overlay detaches its state-scoped
//! listeners and releases its scroll lock.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use scrim_host::{
	Document, Event, EventKind, EventTarget, Listener, ListenerId, ListenerOptions, NodeId,
	Scheduler, TokioScheduler,
};

use crate::error::MountError;
use crate::hooks::{FnHooks, NoopHooks, OverlayHooks};
use crate::node_ref::NodeRef;
use crate::options::{OverlayOptions, StateMarkers};
use crate::scroll_lock;
use crate::state::{CloseReason, OverlayState};

/// Controls the open/closed state of one overlay root.
///
/// Cheap to clone; clones share the same overlay.
#[derive(Clone)]
pub struct OverlayController {
	inner: Arc<Inner>,
}

struct Inner {
	document: Arc<dyn Document>,
	options: OverlayOptions,
	hooks: Arc<dyn OverlayHooks>,
	/// `None` when the root could not be resolved.
	mount: Option<Mount>,
	lifecycle: Mutex<Lifecycle>,
}

#[derive(Debug, Clone, Copy)]
struct Mount {
	root: NodeId,
	/// Outside-click boundary; the root unless a marked descendant exists.
	dialog: NodeId,
}

#[derive(Default)]
struct Lifecycle {
	state: OverlayState,
	/// Listeners attached on open and removed on close.
	scoped: Vec<ListenerId>,
	holds_scroll_lock: bool,
	last_opener: Option<NodeId>,
	last_close_reason: Option<CloseReason>,
}

impl OverlayController {
	/// Starts a builder for an overlay rooted at `root`.
	pub fn builder(document: Arc<dyn Document>, root: impl Into<NodeRef>) -> OverlayBuilder {
		OverlayBuilder {
			document,
			root: root.into(),
			options: OverlayOptions::default(),
			scheduler: None,
			hooks: None,
			callbacks: FnHooks::default(),
		}
	}

	/// Creates a controller.
	///
	/// Never fails. If the root cannot be resolved, or the options are
	/// invalid, a warning is logged and the controller is inert. Without a
	/// `scheduler`, auto-open falls back to the ambient tokio runtime.
	///
	/// Dropping the last handle while open removes the state-scoped listeners
	/// and releases the scroll lock without running `on_close`.
	#[must_use]
	pub fn new(
		document: Arc<dyn Document>,
		scheduler: Option<Arc<dyn Scheduler>>,
		root: impl Into<NodeRef>,
		options: OverlayOptions,
		hooks: Arc<dyn OverlayHooks>,
	) -> Self {
		let root = root.into();
		let mount = match mount(&*document, &root, &options) {
			Ok(mount) => Some(mount),
			Err(error) => {
				tracing::warn!(root = %root, %error, "overlay controller is inert");
				None
			}
		};

		let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
			let mut lifecycle = Lifecycle::default();
			if let Some(mount) = mount {
				adopt_initial_state(&*document, &options, mount, weak, &mut lifecycle);
				bind_triggers(&*document, &options, weak);
			}
			Inner {
				document,
				options,
				hooks,
				mount,
				lifecycle: Mutex::new(lifecycle),
			}
		});

		let overlay = Self { inner };
		if let Some(delay) = overlay.inner.options.auto_open_delay() {
			overlay.schedule_auto_open(scheduler, delay);
		}
		overlay
	}

	/// Returns true while the overlay is open. Always false when inert.
	///
	/// Reads the controller's own state. Writes to the state attribute made
	/// outside the controller are not observed; the next transition
	/// overwrites them.
	pub fn is_open(&self) -> bool {
		self.state().is_open()
	}

	pub fn state(&self) -> OverlayState {
		self.inner.lifecycle.lock().state
	}

	/// Returns true if the root was not resolved at construction.
	pub fn is_inert(&self) -> bool {
		self.inner.mount.is_none()
	}

	pub fn root(&self) -> Option<NodeId> {
		self.inner.mount.map(|m| m.root)
	}

	/// The outside-click boundary node.
	pub fn dialog(&self) -> Option<NodeId> {
		self.inner.mount.map(|m| m.dialog)
	}

	pub fn options(&self) -> &OverlayOptions {
		&self.inner.options
	}

	pub fn document(&self) -> &Arc<dyn Document> {
		&self.inner.document
	}

	/// The open trigger whose click caused the most recent open, if any.
	pub fn last_opener(&self) -> Option<NodeId> {
		self.inner.lifecycle.lock().last_opener
	}

	pub fn last_close_reason(&self) -> Option<CloseReason> {
		self.inner.lifecycle.lock().last_close_reason
	}

	/// Returns true if both handles control the same overlay.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Opens the overlay. Returns false, doing nothing, if already open or inert.
	pub fn open(&self) -> bool {
		let inner = &*self.inner;
		let Some(mount) = inner.mount else {
			return false;
		};
		{
			let mut life = inner.lifecycle.lock();
			if life.state.is_open() {
				return false;
			}
			life.state = OverlayState::Open;
			project(&*inner.document, mount.root, &inner.options.markers, OverlayState::Open);
			if inner.options.lock_scroll {
				life.holds_scroll_lock = lock_scroll(&*inner.document, &inner.options.markers, false);
			}
			life.scoped = attach_scoped(
				&*inner.document,
				&inner.options,
				mount,
				&Arc::downgrade(&self.inner),
			);
		}
		tracing::debug!(root = %mount.root, "overlay opened");
		inner.hooks.on_open(self);
		true
	}

	/// Closes the overlay. Returns false, doing nothing, if already closed or inert.
	pub fn close(&self) -> bool {
		self.close_with(CloseReason::Api)
	}

	/// Closes the overlay, recording `reason`.
	pub fn close_with(&self, reason: CloseReason) -> bool {
		let inner = &*self.inner;
		let Some(mount) = inner.mount else {
			return false;
		};
		{
			let mut life = inner.lifecycle.lock();
			if !life.state.is_open() {
				return false;
			}
			life.state = OverlayState::Closed;
			life.last_close_reason = Some(reason);
			project(&*inner.document, mount.root, &inner.options.markers, OverlayState::Closed);
			if std::mem::take(&mut life.holds_scroll_lock) {
				unlock_scroll(&*inner.document, &inner.options.markers);
			}
			for id in life.scoped.drain(..) {
				inner.document.remove_listener(id);
			}
		}
		tracing::debug!(root = %mount.root, ?reason, "overlay closed");
		inner.hooks.on_close(self);
		true
	}

	/// Closes if open, opens otherwise.
	pub fn toggle(&self) -> bool {
		if self.is_open() { self.close() } else { self.open() }
	}

	fn trigger_open(&self, trigger: NodeId) {
		self.inner.lifecycle.lock().last_opener = Some(trigger);
		self.open();
	}

	fn on_key_down(&self, event: &mut Event) {
		if event.key() != Some("Escape") {
			return;
		}
		// Subscribed only while open, but an event already in flight can still
		// arrive after close removed the listener.
		if !self.is_open() {
			return;
		}
		event.prevent_default();
		self.close_with(CloseReason::Escape);
	}

	fn on_pointer_down(&self, event: &mut Event) {
		let Some(mount) = self.inner.mount else {
			return;
		};
		if !self.inner.options.close_on_outside_click || !self.is_open() {
			return;
		}
		if self.inner.document.contains(mount.dialog, event.target()) {
			return;
		}
		self.close_with(CloseReason::OutsideClick);
	}

	fn schedule_auto_open(&self, scheduler: Option<Arc<dyn Scheduler>>, delay: Duration) {
		let scheduler = scheduler.or_else(|| {
			TokioScheduler::current().map(|s| Arc::new(s) as Arc<dyn Scheduler>)
		});
		let Some(scheduler) = scheduler else {
			tracing::warn!(?delay, "auto-open needs a scheduler or a tokio runtime; skipped");
			return;
		};
		let weak = Arc::downgrade(&self.inner);
		scheduler.schedule(
			delay,
			Box::new(move || {
				if let Some(inner) = weak.upgrade() {
					OverlayController { inner }.open();
				}
			}),
		);
		tracing::trace!(?delay, "auto-open scheduled");
	}
}

impl Drop for Inner {
	fn drop(&mut self) {
		let Some(mount) = self.mount else {
			return;
		};
		let life = self.lifecycle.get_mut();
		if std::mem::take(&mut life.holds_scroll_lock) {
			unlock_scroll(&*self.document, &self.options.markers);
		}
		if life.scoped.is_empty() {
			return;
		}
		for id in life.scoped.drain(..) {
			self.document.remove_listener(id);
		}
		tracing::debug!(root = %mount.root, "open overlay dropped; listeners detached");
	}
}

impl fmt::Debug for OverlayController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OverlayController")
			.field("root", &self.root())
			.field("dialog", &self.dialog())
			.field("state", &self.state())
			.finish_non_exhaustive()
	}
}

/// Builder for [`OverlayController`].
pub struct OverlayBuilder {
	document: Arc<dyn Document>,
	root: NodeRef,
	options: OverlayOptions,
	scheduler: Option<Arc<dyn Scheduler>>,
	hooks: Option<Arc<dyn OverlayHooks>>,
	callbacks: FnHooks,
}

impl OverlayBuilder {
	pub fn options(mut self, options: OverlayOptions) -> Self {
		self.options = options;
		self
	}

	pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
		self.scheduler = Some(scheduler);
		self
	}

	/// Installs hooks. Takes precedence over [`Self::on_open`] and [`Self::on_close`].
	pub fn hooks(mut self, hooks: impl OverlayHooks + 'static) -> Self {
		self.hooks = Some(Arc::new(hooks));
		self
	}

	pub fn on_open(mut self, f: impl Fn(&OverlayController) + Send + Sync + 'static) -> Self {
		self.callbacks.on_open = Some(Box::new(f));
		self
	}

	pub fn on_close(mut self, f: impl Fn(&OverlayController) + Send + Sync + 'static) -> Self {
		self.callbacks.on_close = Some(Box::new(f));
		self
	}

	#[must_use]
	pub fn build(self) -> OverlayController {
		let hooks: Arc<dyn OverlayHooks> = match self.hooks {
			Some(hooks) => hooks,
			None if self.callbacks.on_open.is_none() && self.callbacks.on_close.is_none() => {
				Arc::new(NoopHooks)
			}
			None => Arc::new(self.callbacks),
		};
		OverlayController::new(self.document, self.scheduler, self.root, self.options, hooks)
	}
}

fn mount(
	document: &dyn Document,
	root: &NodeRef,
	options: &OverlayOptions,
) -> Result<Mount, MountError> {
	options.validate()?;
	let root_node = root
		.resolve(document)?
		.ok_or_else(|| MountError::RootNotFound(root.to_string()))?;

	let dialog = if options.dialog_selector.is_empty() {
		root_node
	} else {
		match document.query_selector_within(root_node, &options.dialog_selector) {
			Ok(found) => found.unwrap_or(root_node),
			Err(error) => {
				tracing::debug!(selector = %options.dialog_selector, %error, "dialog boundary lookup failed; using root");
				root_node
			}
		}
	};
	Ok(Mount {
		root: root_node,
		dialog,
	})
}

/// Writes the inactive marker if the root has none, or adopts an open state
/// declared by existing markup. Hooks are not invoked for adopted state.
fn adopt_initial_state(
	document: &dyn Document,
	options: &OverlayOptions,
	mount: Mount,
	weak: &Weak<Inner>,
	lifecycle: &mut Lifecycle,
) {
	let markers = &options.markers;
	let Some(value) = document.attribute(mount.root, &markers.state_attribute) else {
		project(document, mount.root, markers, OverlayState::Closed);
		return;
	};
	if OverlayState::from_marker(&value, markers).is_open() {
		lifecycle.state = OverlayState::Open;
		if options.lock_scroll {
			lifecycle.holds_scroll_lock = lock_scroll(document, markers, true);
		}
		lifecycle.scoped = attach_scoped(document, options, mount, weak);
		tracing::debug!(root = %mount.root, "overlay adopted open state from markup");
	}
}

fn bind_triggers(document: &dyn Document, options: &OverlayOptions, weak: &Weak<Inner>) {
	for node in resolve_triggers(document, &options.open_triggers) {
		let weak = weak.clone();
		let listener: Listener = Arc::new(move |_: &mut Event| {
			if let Some(inner) = weak.upgrade() {
				OverlayController { inner }.trigger_open(node);
			}
		});
		document.add_listener(EventTarget::Node(node), EventKind::Click, ListenerOptions::default(), listener);
	}
	for node in resolve_triggers(document, &options.close_triggers) {
		let weak = weak.clone();
		let listener: Listener = Arc::new(move |_: &mut Event| {
			if let Some(inner) = weak.upgrade() {
				OverlayController { inner }.close_with(CloseReason::Trigger);
			}
		});
		document.add_listener(EventTarget::Node(node), EventKind::Click, ListenerOptions::default(), listener);
	}
}

/// Resolves trigger references into distinct nodes, in order of first match.
fn resolve_triggers(document: &dyn Document, refs: &[NodeRef]) -> Vec<NodeId> {
	let mut nodes = Vec::new();
	for trigger in refs {
		match trigger.resolve_all(document) {
			Ok(found) if found.is_empty() => {
				tracing::debug!(trigger = %trigger, "trigger matched no elements");
			}
			Ok(found) => {
				for node in found {
					if !nodes.contains(&node) {
						nodes.push(node);
					}
				}
			}
			Err(error) => tracing::debug!(trigger = %trigger, %error, "trigger lookup failed"),
		}
	}
	nodes
}

fn attach_scoped(
	document: &dyn Document,
	options: &OverlayOptions,
	mount: Mount,
	weak: &Weak<Inner>,
) -> Vec<ListenerId> {
	let mut ids = Vec::with_capacity(3);
	if options.close_on_escape {
		ids.push(document.add_listener(
			EventTarget::Document,
			EventKind::KeyDown,
			ListenerOptions::capture(),
			route(weak, OverlayController::on_key_down),
		));
	}
	if options.close_on_outside_click {
		for kind in [EventKind::PointerDown, EventKind::TouchStart] {
			ids.push(document.add_listener(
				EventTarget::Node(mount.root),
				kind,
				ListenerOptions::passive(),
				route(weak, OverlayController::on_pointer_down),
			));
		}
	}
	tracing::trace!(root = %mount.root, listeners = ids.len(), "overlay listeners attached");
	ids
}

/// Wraps a handler so it runs only while the controller is alive.
fn route(weak: &Weak<Inner>, handler: fn(&OverlayController, &mut Event)) -> Listener {
	let weak = weak.clone();
	Arc::new(move |event: &mut Event| {
		if let Some(inner) = weak.upgrade() {
			handler(&OverlayController { inner }, event);
		}
	})
}

fn project(document: &dyn Document, root: NodeId, markers: &StateMarkers, state: OverlayState) {
	if let Err(error) = document.set_attribute(root, &markers.state_attribute, state.marker(markers)) {
		tracing::warn!(%root, %error, "failed to write overlay state marker");
	}
}

fn lock_scroll(document: &dyn Document, markers: &StateMarkers, adopted: bool) -> bool {
	let acquired = if adopted {
		scroll_lock::adopt(document, &markers.scroll_lock_attribute)
	} else {
		scroll_lock::acquire(document, &markers.scroll_lock_attribute)
	};
	match acquired {
		Ok(depth) => {
			tracing::trace!(depth, "body scroll locked");
			true
		}
		Err(error) => {
			tracing::warn!(%error, "failed to lock body scroll");
			false
		}
	}
}

fn unlock_scroll(document: &dyn Document, markers: &StateMarkers) {
	match scroll_lock::release(document, &markers.scroll_lock_attribute) {
		Ok(depth) => tracing::trace!(depth, "body scroll lock released"),
		Err(error) => tracing::warn!(%error, "failed to release body scroll lock"),
	}
}
