//! The read-through seam to the configuration cache.

use std::sync::Arc;

use regex::Regex;

use crate::catalog::{HostId, RuleId, RuleState};

/// Rule-item metadata the filter loader hands to the macro substitutor.
#[derive(Debug, Clone)]
pub struct ItemMeta {
	/// The rule item's identifier.
	pub item: RuleId,

	/// Owning host.
	pub host: HostId,

	/// The item's key.
	pub key: String,
}

/// One entry of the configuration-cache diff produced by writeback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDiff {
	/// The rule item the diff applies to.
	pub item: RuleId,

	/// New state, when it changed.
	pub state: Option<RuleState>,

	/// New error text, when it changed.
	pub error: Option<String>,
}

/// Read-through access to the configuration cache.
///
/// The cache is the only process-wide mutable resource the pipeline
/// touches; its mutation is confined to one [`apply_diff`] call per
/// invocation, made under the rule claim after the catalog write.
///
/// [`apply_diff`]: ConfigCache::apply_diff
pub trait ConfigCache: Send + Sync {
	/// Metadata of the rule item, as macro substitution context. `None`
	/// skips interpolation.
	fn item(&self, rule: RuleId) -> Option<ItemMeta>;

	/// Pre-compiled alternatives of a named expression set; empty when the
	/// name is unknown.
	fn named_expressions(&self, name: &str) -> Vec<Arc<Regex>>;

	/// Applies the writeback diff.
	fn apply_diff(&self, diffs: Vec<ItemDiff>);
}
