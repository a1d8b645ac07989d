//! Error types for overlay configuration and mounting.

use scrim_host::HostError;
use thiserror::Error;

/// Errors produced while loading or validating [`OverlayOptions`](crate::OverlayOptions).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// The active and inactive state values are the same string.
	#[error("state marker values must differ (both are '{0}')")]
	IdenticalStateValues(String),

	/// A marker attribute name is empty.
	#[error("attribute name for {0} must not be empty")]
	EmptyAttribute(&'static str),
}

/// Why a controller could not attach to its root.
///
/// Never returned to callers: construction logs it once and yields an inert
/// controller.
#[derive(Debug, Error)]
pub enum MountError {
	/// No node matched the root reference.
	#[error("overlay root '{0}' not found")]
	RootNotFound(String),

	/// The host rejected the root lookup.
	#[error("overlay root lookup failed: {0}")]
	RootLookup(#[from] HostError),

	/// The options failed validation.
	#[error("invalid overlay options: {0}")]
	InvalidOptions(#[from] ConfigError),
}
