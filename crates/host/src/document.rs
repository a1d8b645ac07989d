use crate::{EventKind, EventTarget, HostError, Listener, ListenerId, ListenerOptions, NodeId};

/// Document tree and event-dispatch capabilities provided by a host.
///
/// Implementations must not hold internal locks while invoking listeners:
/// a listener may call back into the document (for example to remove
/// itself or write an attribute).
pub trait Document: Send + Sync {
	/// The `<body>` element.
	fn body(&self) -> NodeId;

	/// Returns true if `node` belongs to this document.
	fn exists(&self, node: NodeId) -> bool;

	/// All elements matching `selector`, in document order.
	fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError>;

	/// First element matching `selector`, in document order.
	fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, HostError> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	/// First strict descendant of `scope` matching `selector`.
	fn query_selector_within(
		&self,
		scope: NodeId,
		selector: &str,
	) -> Result<Option<NodeId>, HostError>;

	/// Returns true if `node` is `ancestor` or one of its descendants.
	fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

	fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

	fn has_attribute(&self, node: NodeId, name: &str) -> bool {
		self.attribute(node, name).is_some()
	}

	fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

	/// Removes an attribute. Removing an absent attribute is not an error.
	fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), HostError>;

	/// Subscribes `listener` to `kind` events reaching `target`.
	fn add_listener(
		&self,
		target: EventTarget,
		kind: EventKind,
		options: ListenerOptions,
		listener: Listener,
	) -> ListenerId;

	/// Unsubscribes a listener. Returns false, and does nothing, for ids that
	/// are not registered.
	fn remove_listener(&self, id: ListenerId) -> bool;
}
