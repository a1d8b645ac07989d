//! Construction-time overlay options.
//!
//! Options are captured once when a controller is built and never change
//! afterwards. Every field has a default, so a TOML table only needs the
//! keys it overrides:
//!
//! ```toml
//! open_triggers = ["[data-open-signup]"]
//! close_triggers = [".modal__close"]
//! lock_scroll = true
//! auto_open_delay_ms = 1500
//!
//! [markers]
//! state_attribute = "data-modal"
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::node_ref::NodeRef;

/// Attribute names and values shared with external styling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateMarkers {
	/// Attribute on the overlay root carrying the state.
	pub state_attribute: String,
	/// State attribute value while open.
	pub active_value: String,
	/// State attribute value while closed.
	pub inactive_value: String,
	/// Attribute on `<body>` present while a scroll-locking overlay is open.
	pub scroll_lock_attribute: String,
}

impl Default for StateMarkers {
	fn default() -> Self {
		Self {
			state_attribute: "data-state".to_string(),
			active_value: "open".to_string(),
			inactive_value: "closed".to_string(),
			scroll_lock_attribute: "data-scroll-locked".to_string(),
		}
	}
}

/// Recognized overlay options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayOptions {
	/// Elements whose click requests open.
	pub open_triggers: Vec<NodeRef>,
	/// Elements whose click requests close.
	pub close_triggers: Vec<NodeRef>,
	/// Escape while open requests close.
	pub close_on_escape: bool,
	/// Pointer-down or touch-start outside the dialog boundary requests close.
	pub close_on_outside_click: bool,
	/// Open once, this many milliseconds after construction.
	pub auto_open_delay_ms: Option<u64>,
	/// Mark `<body>` while open so styling can suppress background scroll.
	pub lock_scroll: bool,
	/// Selector, looked up inside the root, of the outside-click boundary.
	/// Empty means the root itself.
	pub dialog_selector: String,
	pub markers: StateMarkers,
}

impl Default for OverlayOptions {
	fn default() -> Self {
		Self {
			open_triggers: Vec::new(),
			close_triggers: Vec::new(),
			close_on_escape: true,
			close_on_outside_click: true,
			auto_open_delay_ms: None,
			lock_scroll: false,
			dialog_selector: "[data-overlay-dialog]".to_string(),
			markers: StateMarkers::default(),
		}
	}
}

impl OverlayOptions {
	/// Parses and validates options from a TOML document.
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		let options: Self = toml::from_str(source)?;
		options.validate()?;
		Ok(options)
	}

	/// Checks marker consistency.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let markers = &self.markers;
		if markers.state_attribute.is_empty() {
			return Err(ConfigError::EmptyAttribute("the state marker"));
		}
		if markers.scroll_lock_attribute.is_empty() {
			return Err(ConfigError::EmptyAttribute("the scroll-lock marker"));
		}
		if markers.active_value == markers.inactive_value {
			return Err(ConfigError::IdenticalStateValues(markers.active_value.clone()));
		}
		Ok(())
	}

	pub fn auto_open_delay(&self) -> Option<Duration> {
		self.auto_open_delay_ms.map(Duration::from_millis)
	}

	pub fn with_open_trigger(mut self, trigger: impl Into<NodeRef>) -> Self {
		self.open_triggers.push(trigger.into());
		self
	}

	pub fn with_close_trigger(mut self, trigger: impl Into<NodeRef>) -> Self {
		self.close_triggers.push(trigger.into());
		self
	}

	pub fn with_close_on_escape(mut self, enabled: bool) -> Self {
		self.close_on_escape = enabled;
		self
	}

	pub fn with_close_on_outside_click(mut self, enabled: bool) -> Self {
		self.close_on_outside_click = enabled;
		self
	}

	pub fn with_auto_open_delay(mut self, delay: Duration) -> Self {
		self.auto_open_delay_ms = Some(delay.as_millis().try_into().unwrap_or(u64::MAX));
		self
	}

	pub fn with_lock_scroll(mut self, enabled: bool) -> Self {
		self.lock_scroll = enabled;
		self
	}

	pub fn with_dialog_selector(mut self, selector: impl Into<String>) -> Self {
		self.dialog_selector = selector.into();
		self
	}

	pub fn with_markers(mut self, markers: StateMarkers) -> Self {
		self.markers = markers;
		self
	}
}
