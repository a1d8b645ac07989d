use std::sync::Arc;

use parking_lot::Mutex;

use super::*;

fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Listener {
	let log = log.clone();
	Arc::new(move |_: &mut Event| log.lock().push(label))
}

#[test]
fn starts_with_html_and_body() {
	let doc = MemoryDocument::new();
	assert_eq!(doc.tag_name(doc.document_element()).as_deref(), Some("html"));
	assert_eq!(doc.tag_name(doc.body()).as_deref(), Some("body"));
	assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
	assert_eq!(doc.query_selector("body").unwrap(), Some(doc.body()));
}

#[test]
fn query_in_document_order() {
	let doc = MemoryDocument::new();
	let a = doc.append_element(doc.body(), "div", &[("class", "x")]).unwrap();
	let a1 = doc.append_element(a, "span", &[("class", "x")]).unwrap();
	let b = doc.append_element(doc.body(), "div", &[("class", "x")]).unwrap();

	assert_eq!(doc.query_selector_all(".x").unwrap(), vec![a, a1, b]);
	assert_eq!(doc.query_selector("div.x").unwrap(), Some(a));
	assert_eq!(doc.query_selector("#missing").unwrap(), None);
	assert!(doc.query_selector("div span").is_err());
}

#[test]
fn query_within_excludes_scope() {
	let doc = MemoryDocument::new();
	let outer = doc.append_element(doc.body(), "div", &[("data-marker", "")]).unwrap();
	let inner = doc.append_element(outer, "div", &[("data-marker", "")]).unwrap();

	assert_eq!(doc.query_selector_within(outer, "[data-marker]").unwrap(), Some(inner));
	assert_eq!(doc.query_selector_within(inner, "[data-marker]").unwrap(), None);
	assert_eq!(
		doc.query_selector_within(NodeId(99), "div"),
		Err(HostError::UnknownNode(NodeId(99)))
	);
}

#[test]
fn contains_is_inclusive() {
	let doc = MemoryDocument::new();
	let outer = doc.append_element(doc.body(), "div", &[]).unwrap();
	let inner = doc.append_element(outer, "p", &[]).unwrap();
	let sibling = doc.append_element(doc.body(), "p", &[]).unwrap();

	assert!(doc.contains(outer, outer));
	assert!(doc.contains(outer, inner));
	assert!(!doc.contains(inner, outer));
	assert!(!doc.contains(outer, sibling));
	assert!(doc.contains(doc.document_element(), sibling));
}

#[test]
fn attributes_round_trip_and_unknown_nodes_error() {
	let doc = MemoryDocument::new();
	let node = doc.append_element(doc.body(), "div", &[]).unwrap();

	assert!(!doc.has_attribute(node, "data-state"));
	doc.set_attribute(node, "data-state", "open").unwrap();
	assert_eq!(doc.attribute(node, "data-state").as_deref(), Some("open"));
	doc.remove_attribute(node, "data-state").unwrap();
	doc.remove_attribute(node, "data-state").unwrap();
	assert_eq!(doc.attribute(node, "data-state"), None);

	assert_eq!(
		doc.set_attribute(NodeId(42), "x", "y"),
		Err(HostError::UnknownNode(NodeId(42)))
	);
	assert!(doc.append_element(NodeId(42), "div", &[]).is_err());
}

#[test]
fn dispatch_follows_capture_target_bubble_order() {
	let doc = MemoryDocument::new();
	let outer = doc.append_element(doc.body(), "div", &[]).unwrap();
	let inner = doc.append_element(outer, "button", &[]).unwrap();
	let log = Arc::new(Mutex::new(Vec::new()));

	let click = EventKind::Click;
	doc.add_listener(EventTarget::Document, click, ListenerOptions::default(), recorder(&log, "doc-bubble"));
	doc.add_listener(EventTarget::Node(outer), click, ListenerOptions::default(), recorder(&log, "outer-bubble"));
	doc.add_listener(EventTarget::Node(inner), click, ListenerOptions::default(), recorder(&log, "target"));
	doc.add_listener(EventTarget::Node(outer), click, ListenerOptions::capture(), recorder(&log, "outer-capture"));
	doc.add_listener(EventTarget::Document, click, ListenerOptions::capture(), recorder(&log, "doc-capture"));
	doc.add_listener(
		EventTarget::Node(inner),
		EventKind::KeyDown,
		ListenerOptions::default(),
		recorder(&log, "wrong-kind"),
	);

	doc.click(inner);

	assert_eq!(
		*log.lock(),
		vec!["doc-capture", "outer-capture", "target", "outer-bubble", "doc-bubble"]
	);
}

#[test]
fn listener_removed_mid_dispatch_is_skipped() {
	let doc = Arc::new(MemoryDocument::new());
	let log = Arc::new(Mutex::new(Vec::new()));
	let second = Arc::new(Mutex::new(None));

	let remover = {
		let doc = Arc::downgrade(&doc);
		let second = second.clone();
		Arc::new(move |_: &mut Event| {
			if let (Some(doc), Some(id)) = (doc.upgrade(), *second.lock()) {
				doc.remove_listener(id);
			}
		})
	};
	doc.add_listener(EventTarget::Document, EventKind::KeyDown, ListenerOptions::capture(), remover);
	let id = doc.add_listener(
		EventTarget::Document,
		EventKind::KeyDown,
		ListenerOptions::default(),
		recorder(&log, "late"),
	);
	*second.lock() = Some(id);

	doc.key_down("Escape");

	assert!(log.lock().is_empty());
	assert_eq!(doc.listener_count(), 1);
}

#[test]
fn passive_listener_cannot_prevent_default() {
	let doc = MemoryDocument::new();
	let prevent: Listener = Arc::new(|event: &mut Event| event.prevent_default());

	doc.add_listener(EventTarget::Document, EventKind::PointerDown, ListenerOptions::passive(), prevent.clone());
	assert!(!doc.pointer_down(doc.body()).default_prevented());

	doc.add_listener(EventTarget::Document, EventKind::KeyDown, ListenerOptions::capture(), prevent);
	let event = doc.key_down("Escape");
	assert!(event.default_prevented());
	assert_eq!(event.key(), Some("Escape"));
}

#[test]
fn stats_count_only_real_removals() {
	let doc = MemoryDocument::new();
	let noop: Listener = Arc::new(|_: &mut Event| {});
	let id = doc.add_listener(EventTarget::Node(doc.body()), EventKind::TouchStart, ListenerOptions::passive(), noop);

	assert_eq!(doc.listener_count_for(EventTarget::Node(doc.body()), EventKind::TouchStart), 1);
	assert_eq!(doc.listener_options(id), Some(ListenerOptions::passive()));
	assert!(doc.remove_listener(id));
	assert!(!doc.remove_listener(id));
	assert!(!doc.remove_listener(ListenerId(999)));

	let stats = doc.stats();
	assert_eq!(stats, ListenerStats { added: 1, removed: 1 });
	assert_eq!(stats.outstanding(), 0);
}
