//! In-memory document host.
//!
//! Nodes live in an arena indexed by [`NodeId`]; the document starts with an
//! `<html>` root holding a `<body>`. Events are dispatched in DOM order:
//! document capture, capture down the ancestor path, the target, bubble up
//! the ancestor path, document bubble.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::selector::SelectorList;
use crate::{
	Document, Event, EventKind, EventTarget, HostError, Listener, ListenerId, ListenerOptions,
	NodeId,
};

const HTML: NodeId = NodeId(0);
const BODY: NodeId = NodeId(1);

/// Lifetime counters for listener subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
	/// Successful `add_listener` calls.
	pub added: usize,
	/// `remove_listener` calls that removed a registration.
	pub removed: usize,
}

impl ListenerStats {
	/// Subscriptions still registered.
	pub fn outstanding(&self) -> usize {
		self.added - self.removed
	}
}

/// Arena-backed [`Document`] implementation.
pub struct MemoryDocument {
	state: Mutex<DomState>,
}

struct DomState {
	nodes: Vec<NodeData>,
	listeners: Vec<Registration>,
	next_listener: u64,
	stats: ListenerStats,
}

struct NodeData {
	tag: String,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	attributes: BTreeMap<String, String>,
}

struct Registration {
	id: ListenerId,
	target: EventTarget,
	kind: EventKind,
	options: ListenerOptions,
	listener: Listener,
}

impl NodeData {
	fn new(tag: &str, parent: Option<NodeId>) -> Self {
		Self {
			tag: tag.to_ascii_lowercase(),
			parent,
			children: Vec::new(),
			attributes: BTreeMap::new(),
		}
	}
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDocument {
	/// Creates a document containing only `<html><body></body></html>`.
	pub fn new() -> Self {
		let mut html = NodeData::new("html", None);
		html.children.push(BODY);
		let body = NodeData::new("body", Some(HTML));
		Self {
			state: Mutex::new(DomState {
				nodes: vec![html, body],
				listeners: Vec::new(),
				next_listener: 0,
				stats: ListenerStats::default(),
			}),
		}
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> NodeId {
		HTML
	}

	/// Appends a new element under `parent` with the given attributes.
	pub fn append_element(
		&self,
		parent: NodeId,
		tag: &str,
		attributes: &[(&str, &str)],
	) -> Result<NodeId, HostError> {
		let mut state = self.state.lock();
		if parent.index() >= state.nodes.len() {
			return Err(HostError::UnknownNode(parent));
		}
		let id = NodeId(state.nodes.len() as u32);
		let mut node = NodeData::new(tag, Some(parent));
		for (name, value) in attributes {
			node.attributes.insert(name.to_string(), value.to_string());
		}
		state.nodes.push(node);
		state.nodes[parent.index()].children.push(id);
		Ok(id)
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.state.lock().nodes.get(node.index())?.parent
	}

	pub fn tag_name(&self, node: NodeId) -> Option<String> {
		self.state
			.lock()
			.nodes
			.get(node.index())
			.map(|n| n.tag.clone())
	}

	/// Number of currently registered listeners.
	pub fn listener_count(&self) -> usize {
		self.state.lock().listeners.len()
	}

	/// Number of currently registered listeners for one target and kind.
	pub fn listener_count_for(&self, target: EventTarget, kind: EventKind) -> usize {
		self.state
			.lock()
			.listeners
			.iter()
			.filter(|r| r.target == target && r.kind == kind)
			.count()
	}

	/// Options a registered listener was subscribed with.
	pub fn listener_options(&self, id: ListenerId) -> Option<ListenerOptions> {
		self.state
			.lock()
			.listeners
			.iter()
			.find(|r| r.id == id)
			.map(|r| r.options)
	}

	/// Options of every listener registered for one target and kind.
	pub fn listener_options_for(&self, target: EventTarget, kind: EventKind) -> Vec<ListenerOptions> {
		self.state
			.lock()
			.listeners
			.iter()
			.filter(|r| r.target == target && r.kind == kind)
			.map(|r| r.options)
			.collect()
	}

	pub fn stats(&self) -> ListenerStats {
		self.state.lock().stats
	}

	/// Dispatches `event` and returns it after propagation.
	///
	/// Listeners are snapshotted before dispatch; a listener removed by an
	/// earlier listener in the same dispatch is skipped, and listeners added
	/// during dispatch are not invoked.
	pub fn dispatch(&self, mut event: Event) -> Event {
		let order = self.propagation_order(&event);
		tracing::trace!(
			kind = event.kind().name(),
			target = %event.target(),
			listeners = order.len(),
			"dispatching event"
		);
		for id in order {
			let entry = {
				let state = self.state.lock();
				state
					.listeners
					.iter()
					.find(|r| r.id == id)
					.map(|r| (r.listener.clone(), r.options.passive))
			};
			let Some((listener, passive)) = entry else {
				continue;
			};
			event.set_passive_listener(passive);
			listener(&mut event);
		}
		event.set_passive_listener(false);
		event
	}

	pub fn click(&self, node: NodeId) -> Event {
		self.dispatch(Event::new(EventKind::Click, node))
	}

	/// Dispatches a key-down event targeted at the body.
	pub fn key_down(&self, key: &str) -> Event {
		self.dispatch(Event::key_down(BODY, key))
	}

	pub fn key_down_on(&self, node: NodeId, key: &str) -> Event {
		self.dispatch(Event::key_down(node, key))
	}

	pub fn pointer_down(&self, node: NodeId) -> Event {
		self.dispatch(Event::new(EventKind::PointerDown, node))
	}

	pub fn touch_start(&self, node: NodeId) -> Event {
		self.dispatch(Event::new(EventKind::TouchStart, node))
	}

	fn propagation_order(&self, event: &Event) -> Vec<ListenerId> {
		let state = self.state.lock();
		let kind = event.kind();

		// Target first, outermost ancestor last.
		let mut path: SmallVec<[NodeId; 16]> = SmallVec::new();
		let mut cursor = Some(event.target());
		while let Some(node) = cursor.filter(|n| n.index() < state.nodes.len()) {
			path.push(node);
			cursor = state.nodes[node.index()].parent;
		}

		let listeners = &state.listeners;
		let select = |target: EventTarget, capture: bool| {
			listeners
				.iter()
				.filter(move |r| {
					r.target == target
						&& r.kind == kind
						&& r.options.capture == capture
				})
				.map(|r| r.id)
		};

		let mut order = Vec::new();
		order.extend(select(EventTarget::Document, true));
		for node in path.iter().skip(1).rev() {
			order.extend(select(EventTarget::Node(*node), true));
		}
		if let Some(target) = path.first() {
			order.extend(select(EventTarget::Node(*target), true));
			order.extend(select(EventTarget::Node(*target), false));
		}
		for node in path.iter().skip(1) {
			order.extend(select(EventTarget::Node(*node), false));
		}
		order.extend(select(EventTarget::Document, false));
		order
	}

	fn with_node<R>(
		&self,
		node: NodeId,
		f: impl FnOnce(&mut NodeData) -> R,
	) -> Result<R, HostError> {
		let mut state = self.state.lock();
		state
			.nodes
			.get_mut(node.index())
			.map(f)
			.ok_or(HostError::UnknownNode(node))
	}
}

impl DomState {
	fn matching(&self, selector: &SelectorList, from: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.nodes[from.index()]
			.children
			.iter()
			.rev()
			.copied()
			.collect();
		while let Some(node) = stack.pop() {
			let data = &self.nodes[node.index()];
			if selector.matches(&data.tag, |name| data.attributes.get(name).map(String::as_str)) {
				out.push(node);
			}
			stack.extend(data.children.iter().rev().copied());
		}
		out
	}
}

impl Document for MemoryDocument {
	fn body(&self) -> NodeId {
		BODY
	}

	fn exists(&self, node: NodeId) -> bool {
		node.index() < self.state.lock().nodes.len()
	}

	fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
		let selector = SelectorList::parse(selector)?;
		let state = self.state.lock();
		let mut out = Vec::new();
		let root = &state.nodes[HTML.index()];
		if selector.matches(&root.tag, |name| root.attributes.get(name).map(String::as_str)) {
			out.push(HTML);
		}
		out.extend(state.matching(&selector, HTML));
		Ok(out)
	}

	fn query_selector_within(
		&self,
		scope: NodeId,
		selector: &str,
	) -> Result<Option<NodeId>, HostError> {
		let selector = SelectorList::parse(selector)?;
		let state = self.state.lock();
		if scope.index() >= state.nodes.len() {
			return Err(HostError::UnknownNode(scope));
		}
		Ok(state.matching(&selector, scope).into_iter().next())
	}

	fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		let state = self.state.lock();
		let mut cursor = Some(node);
		while let Some(current) = cursor {
			if current == ancestor {
				return true;
			}
			cursor = state.nodes.get(current.index()).and_then(|n| n.parent);
		}
		false
	}

	fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
		self.state
			.lock()
			.nodes
			.get(node.index())?
			.attributes
			.get(name)
			.cloned()
	}

	fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
		self.with_node(node, |n| {
			n.attributes.insert(name.to_string(), value.to_string());
		})
	}

	fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), HostError> {
		self.with_node(node, |n| {
			n.attributes.remove(name);
		})
	}

	fn add_listener(
		&self,
		target: EventTarget,
		kind: EventKind,
		options: ListenerOptions,
		listener: Listener,
	) -> ListenerId {
		let mut state = self.state.lock();
		state.next_listener += 1;
		let id = ListenerId(state.next_listener);
		state.listeners.push(Registration {
			id,
			target,
			kind,
			options,
			listener,
		});
		state.stats.added += 1;
		tracing::trace!(?id, ?target, kind = kind.name(), ?options, "listener added");
		id
	}

	fn remove_listener(&self, id: ListenerId) -> bool {
		let mut state = self.state.lock();
		let Some(pos) = state.listeners.iter().position(|r| r.id == id) else {
			return false;
		};
		state.listeners.remove(pos);
		state.stats.removed += 1;
		tracing::trace!(?id, "listener removed");
		true
	}
}

#[cfg(test)]
mod tests;
