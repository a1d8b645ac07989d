//! Error types for host document operations.

use thiserror::Error;

use crate::NodeId;

/// Errors reported by a [`Document`](crate::Document) host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
	/// A selector string could not be parsed.
	#[error("invalid selector '{selector}': {reason}")]
	InvalidSelector {
		/// The selector as given.
		selector: String,
		/// What the parser rejected.
		reason: String,
	},

	/// The node id does not belong to this document.
	#[error("unknown node {0}")]
	UnknownNode(NodeId),
}
