use crate::StateMarkers;

/// Presentation state of an overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverlayState {
	Open,
	#[default]
	Closed,
}

impl OverlayState {
	pub const fn is_open(self) -> bool {
		matches!(self, Self::Open)
	}

	/// The state attribute value this state projects to.
	pub fn marker(self, markers: &StateMarkers) -> &str {
		match self {
			Self::Open => &markers.active_value,
			Self::Closed => &markers.inactive_value,
		}
	}

	/// Reads a state attribute value. Anything but the active value is closed.
	pub fn from_marker(value: &str, markers: &StateMarkers) -> Self {
		if value == markers.active_value {
			Self::Open
		} else {
			Self::Closed
		}
	}
}

/// Why an overlay was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
	/// Escape was pressed while open.
	Escape,
	/// A pointer went down outside the dialog boundary.
	OutsideClick,
	/// A close trigger was clicked.
	Trigger,
	/// `close()` or `toggle()` was called directly.
	Api,
}
