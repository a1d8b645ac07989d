//! Body scroll-lock marker shared by every overlay in a document.
//!
//! The marker's value is the number of open scroll-locking overlays, so the
//! attribute is present iff at least one of them is open. A marker set by
//! something else without a numeric value counts as depth one, except when an
//! overlay adopts open markup: it then claims that marker as its own.

use scrim_host::{Document, HostError};

fn depth(document: &dyn Document, attribute: &str, unnumbered: u32) -> u32 {
	match document.attribute(document.body(), attribute) {
		None => 0,
		Some(value) => value.parse().unwrap_or(unnumbered),
	}
}

fn store(document: &dyn Document, attribute: &str, depth: u32) -> Result<u32, HostError> {
	document.set_attribute(document.body(), attribute, &depth.to_string())?;
	Ok(depth)
}

/// Adds one holder to the body marker.
pub(crate) fn acquire(document: &dyn Document, attribute: &str) -> Result<u32, HostError> {
	store(document, attribute, depth(document, attribute, 1).saturating_add(1))
}

/// Adds one holder for an overlay adopting server-rendered open state.
///
/// A non-numeric marker was rendered alongside that state and belongs to the
/// adopting overlay, so it is taken over rather than stacked on.
pub(crate) fn adopt(document: &dyn Document, attribute: &str) -> Result<u32, HostError> {
	store(document, attribute, depth(document, attribute, 0).saturating_add(1))
}

/// Drops one holder, removing the marker when none remain.
pub(crate) fn release(document: &dyn Document, attribute: &str) -> Result<u32, HostError> {
	let next = depth(document, attribute, 1).saturating_sub(1);
	if next == 0 {
		document.remove_attribute(document.body(), attribute)?;
		Ok(0)
	} else {
		store(document, attribute, next)
	}
}
