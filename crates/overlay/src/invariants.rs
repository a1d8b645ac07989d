use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use proptest::prelude::*;
use scrim_host::{Document, EventKind, EventTarget, ManualScheduler, MemoryDocument, NodeId};

use crate::{OverlayController, OverlayOptions};

struct Harness {
	doc: Arc<MemoryDocument>,
	root: NodeId,
	backdrop: NodeId,
	inside: NodeId,
	overlay: OverlayController,
	opened: Arc<AtomicUsize>,
}

fn harness(options: OverlayOptions) -> Harness {
	let doc = Arc::new(MemoryDocument::new());
	let root = doc.append_element(doc.body(), "div", &[("id", "modal")]).unwrap();
	let backdrop = doc.append_element(root, "div", &[]).unwrap();
	let dialog = doc.append_element(root, "div", &[("data-overlay-dialog", "")]).unwrap();
	let inside = doc.append_element(dialog, "button", &[]).unwrap();
	let opened = Arc::new(AtomicUsize::new(0));
	let overlay = {
		let opened = opened.clone();
		OverlayController::builder(doc.clone(), "#modal")
			.options(options)
			.on_open(move |_| {
				opened.fetch_add(1, Ordering::SeqCst);
			})
			.build()
	};
	Harness {
		doc,
		root,
		backdrop,
		inside,
		overlay,
		opened,
	}
}

impl Harness {
	fn marker_agrees(&self) -> bool {
		let active = self.doc.attribute(self.root, "data-state").as_deref() == Some("open");
		active == self.overlay.is_open()
	}

	fn scoped_listeners(&self) -> usize {
		self.doc.listener_count_for(EventTarget::Document, EventKind::KeyDown)
			+ self.doc.listener_count_for(EventTarget::Node(self.root), EventKind::PointerDown)
			+ self.doc.listener_count_for(EventTarget::Node(self.root), EventKind::TouchStart)
	}
}

/// Must not re-apply side effects or re-run `on_open` when already open.
///
/// - Enforced in: `OverlayController::open`
/// - Failure symptom: Duplicate escape listeners close the overlay twice and
///   `on_open` analytics fire on every redundant call.
#[cfg_attr(test, test)]
pub(crate) fn test_open_is_idempotent() {
	let h = harness(OverlayOptions::default());
	h.overlay.open();
	let stats = h.doc.stats();
	h.overlay.open();
	h.overlay.open();
	assert_eq!(h.doc.stats(), stats);
	assert_eq!(h.opened.load(Ordering::SeqCst), 1);
}

/// Must leave zero state-scoped subscriptions after any number of cycles.
///
/// - Enforced in: `OverlayController::close`
/// - Failure symptom: Keydown listeners accumulate on the document across
///   open/close cycles.
#[cfg_attr(test, test)]
pub(crate) fn test_no_listener_leak_across_cycles() {
	let h = harness(OverlayOptions::default());
	for _ in 0..25 {
		h.overlay.open();
		h.overlay.close();
	}
	let stats = h.doc.stats();
	assert_eq!(stats.added, 75);
	assert_eq!(stats.removed, 75);
	assert_eq!(h.doc.listener_count(), 0);
}

/// Must ignore pointer-down inside the dialog boundary.
///
/// - Enforced in: `OverlayController::on_pointer_down`
/// - Failure symptom: Clicking a form field inside the dialog dismisses it.
#[cfg_attr(test, test)]
pub(crate) fn test_outside_click_containment() {
	let h = harness(OverlayOptions::default());
	h.overlay.open();
	h.doc.pointer_down(h.inside);
	assert!(h.overlay.is_open(), "inside click must not close");
	h.doc.pointer_down(h.backdrop);
	assert!(!h.overlay.is_open(), "backdrop click must close");
}

/// Must close on Escape only while open, suppressing the default action.
///
/// - Enforced in: `OverlayController::on_key_down`
/// - Failure symptom: Escape is swallowed on pages where the overlay is closed.
#[cfg_attr(test, test)]
pub(crate) fn test_escape_containment() {
	let h = harness(OverlayOptions::default());
	assert!(!h.doc.key_down("Escape").default_prevented());
	h.overlay.open();
	assert!(h.doc.key_down("Escape").default_prevented());
	assert!(!h.overlay.is_open());
}

/// Must keep the body scroll-lock marker present exactly while open.
///
/// - Enforced in: `OverlayController::open`, `OverlayController::close_with`
/// - Failure symptom: Page stays unscrollable after the overlay is dismissed.
#[cfg_attr(test, test)]
pub(crate) fn test_scroll_lock_correlation() {
	let h = harness(OverlayOptions::default().with_lock_scroll(true));
	let body = h.doc.body();
	for _ in 0..3 {
		assert!(!h.doc.has_attribute(body, "data-scroll-locked"));
		h.overlay.open();
		assert!(h.doc.has_attribute(body, "data-scroll-locked"));
		h.doc.pointer_down(h.backdrop);
	}
	assert!(!h.doc.has_attribute(body, "data-scroll-locked"));
}

/// Must open exactly once after the configured delay.
///
/// - Enforced in: `OverlayController::schedule_auto_open`
/// - Failure symptom: Auto-open overlay never appears, or `on_open` fires twice.
#[cfg_attr(test, test)]
pub(crate) fn test_auto_open_once() {
	let doc = Arc::new(MemoryDocument::new());
	doc.append_element(doc.body(), "div", &[("id", "modal")]).unwrap();
	let scheduler = Arc::new(ManualScheduler::new());
	let opened = Arc::new(AtomicUsize::new(0));
	let overlay = {
		let opened = opened.clone();
		OverlayController::builder(doc.clone(), "#modal")
			.scheduler(scheduler.clone())
			.options(OverlayOptions::default().with_auto_open_delay(Duration::from_millis(50)))
			.on_open(move |_| {
				opened.fetch_add(1, Ordering::SeqCst);
			})
			.build()
	};
	scheduler.advance(Duration::from_millis(50));
	scheduler.advance(Duration::from_millis(500));
	assert!(overlay.is_open());
	assert_eq!(opened.load(Ordering::SeqCst), 1);
}

/// Must detach state-scoped listeners and release the scroll lock when the
/// last handle of an open overlay is dropped.
///
/// - Enforced in: `Drop for Inner`
/// - Failure symptom: A discarded open overlay keeps swallowing Escape and the
///   page can never scroll again.
#[cfg_attr(test, test)]
pub(crate) fn test_drop_while_open_releases_everything() {
	let h = harness(OverlayOptions::default().with_lock_scroll(true));
	h.overlay.open();
	let Harness { doc, overlay, .. } = h;
	drop(overlay);
	assert_eq!(doc.stats().outstanding(), 0);
	assert!(!doc.has_attribute(doc.body(), "data-scroll-locked"));
}

#[derive(Debug, Clone, Copy)]
enum Step {
	Open,
	Close,
	Toggle,
	Escape,
	PointerInside,
	PointerBackdrop,
}

fn arb_step() -> impl Strategy<Value = Step> {
	prop_oneof![
		Just(Step::Open),
		Just(Step::Close),
		Just(Step::Toggle),
		Just(Step::Escape),
		Just(Step::PointerInside),
		Just(Step::PointerBackdrop),
	]
}

proptest! {
	/// State marker agrees with `is_open` after every step, and closing
	/// leaves no state-scoped listener behind.
	#[test]
	fn prop_marker_agreement_and_no_leak(
		steps in prop::collection::vec(arb_step(), 0..40),
		lock_scroll in any::<bool>(),
	) {
		let h = harness(OverlayOptions::default().with_lock_scroll(lock_scroll));
		for step in steps {
			match step {
				Step::Open => { h.overlay.open(); }
				Step::Close => { h.overlay.close(); }
				Step::Toggle => { h.overlay.toggle(); }
				Step::Escape => { h.doc.key_down("Escape"); }
				Step::PointerInside => { h.doc.pointer_down(h.inside); }
				Step::PointerBackdrop => { h.doc.touch_start(h.backdrop); }
			}
			prop_assert!(h.marker_agrees());
			prop_assert_eq!(h.scoped_listeners(), if h.overlay.is_open() { 3 } else { 0 });
			prop_assert_eq!(
				h.doc.has_attribute(h.doc.body(), "data-scroll-locked"),
				lock_scroll && h.overlay.is_open()
			);
		}
		h.overlay.close();
		prop_assert_eq!(h.doc.stats().outstanding(), 0);
	}
}
