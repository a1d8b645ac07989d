use std::sync::Arc;

use crate::NodeId;

/// Kinds of events an overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Click,
	KeyDown,
	PointerDown,
	TouchStart,
}

impl EventKind {
	/// DOM event type name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Click => "click",
			Self::KeyDown => "keydown",
			Self::PointerDown => "pointerdown",
			Self::TouchStart => "touchstart",
		}
	}
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
	/// The document itself, outermost in the propagation path.
	Document,
	/// A specific node.
	Node(NodeId),
}

/// Subscription flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
	/// Deliver during the capture phase instead of the bubble phase.
	pub capture: bool,
	/// The listener promises not to suppress default behavior.
	pub passive: bool,
}

impl ListenerOptions {
	pub const fn capture() -> Self {
		Self {
			capture: true,
			passive: false,
		}
	}

	pub const fn passive() -> Self {
		Self {
			capture: false,
			passive: true,
		}
	}
}

/// Handle returned by [`Document::add_listener`](crate::Document::add_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Callback invoked for each delivered event.
pub type Listener = Arc<dyn Fn(&mut Event) + Send + Sync>;

/// A dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
	kind: EventKind,
	target: NodeId,
	key: Option<String>,
	default_prevented: bool,
	in_passive_listener: bool,
}

impl Event {
	pub fn new(kind: EventKind, target: NodeId) -> Self {
		Self {
			kind,
			target,
			key: None,
			default_prevented: false,
			in_passive_listener: false,
		}
	}

	/// A key-down event carrying a DOM key name such as `"Escape"`.
	pub fn key_down(target: NodeId, key: impl Into<String>) -> Self {
		Self {
			key: Some(key.into()),
			..Self::new(EventKind::KeyDown, target)
		}
	}

	pub fn kind(&self) -> EventKind {
		self.kind
	}

	pub fn target(&self) -> NodeId {
		self.target
	}

	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}

	/// Suppresses the event's default behavior.
	///
	/// Ignored while a passive listener is running.
	pub fn prevent_default(&mut self) {
		if !self.in_passive_listener {
			self.default_prevented = true;
		}
	}

	pub fn default_prevented(&self) -> bool {
		self.default_prevented
	}

	/// Marks whether the listener about to run was registered as passive.
	pub fn set_passive_listener(&mut self, passive: bool) {
		self.in_passive_listener = passive;
	}
}
