use std::fmt;

use scrim_host::{Document, HostError, NodeId};
use serde::Deserialize;

/// A node given either as a selector or as an already resolved id.
///
/// Resolved once, at controller construction. Deserializes from a selector
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NodeRef {
	Selector(String),
	Node(NodeId),
}

impl NodeRef {
	/// Resolves to the first matching node.
	pub fn resolve(&self, document: &dyn Document) -> Result<Option<NodeId>, HostError> {
		match self {
			Self::Selector(selector) => document.query_selector(selector),
			Self::Node(node) => Ok(document.exists(*node).then_some(*node)),
		}
	}

	/// Resolves to every matching node.
	pub fn resolve_all(&self, document: &dyn Document) -> Result<Vec<NodeId>, HostError> {
		match self {
			Self::Selector(selector) => document.query_selector_all(selector),
			Self::Node(_) => Ok(self.resolve(document)?.into_iter().collect()),
		}
	}
}

impl From<String> for NodeRef {
	fn from(selector: String) -> Self {
		Self::Selector(selector)
	}
}

impl From<&str> for NodeRef {
	fn from(selector: &str) -> Self {
		Self::Selector(selector.to_string())
	}
}

impl From<NodeId> for NodeRef {
	fn from(node: NodeId) -> Self {
		Self::Node(node)
	}
}

impl fmt::Display for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Selector(selector) => f.write_str(selector),
			Self::Node(node) => write!(f, "{node}"),
		}
	}
}
