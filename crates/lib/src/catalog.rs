//! The read/write seam to the persistent rule catalog.

use discorule_filterer::{ConditionId, EvalType, Op};

use crate::error::ExternalError;

/// Identifier of a discovery rule (an item of the discovery class in the
/// store).
pub type RuleId = u64;

/// Identifier of the host a rule belongs to.
pub type HostId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// Widest error text the catalog's `error` column accepts; writeback
/// truncates to this before comparing and persisting.
pub const ERROR_FIELD_LEN: usize = 2048;

/// The state a discovery rule is in, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
	/// The rule processes values normally.
	Normal,

	/// The last value could not be processed; the error column says why.
	NotSupported,
}

impl TryFrom<u8> for RuleState {
	type Error = u8;

	/// Converts from the catalog's state codes.
	fn try_from(code: u8) -> Result<Self, u8> {
		match code {
			0 => Ok(Self::Normal),
			1 => Ok(Self::NotSupported),
			other => Err(other),
		}
	}
}

/// One row of the rule catalog.
#[derive(Debug, Clone)]
pub struct RuleRow {
	/// Rule identifier.
	pub rule: RuleId,

	/// Owning host.
	pub host: HostId,

	/// The discovery item's key.
	pub key: String,

	/// Persisted state.
	pub state: RuleState,

	/// Filter combinator.
	pub evaltype: EvalType,

	/// Expression-mode formula; empty otherwise.
	pub formula: String,

	/// Persisted error text; empty when there is none.
	pub error: String,

	/// Lifetime spec for lost resources, possibly carrying user macros.
	pub lifetime: String,
}

/// One filter condition row. `pattern` is either a literal regular
/// expression source or `@name` referencing a named expression set.
#[derive(Debug, Clone)]
pub struct ConditionRow {
	/// Persistent condition identifier.
	pub id: ConditionId,

	/// The discovery macro the condition applies to.
	pub lld_macro: String,

	/// Literal pattern or `@name` reference.
	pub pattern: String,

	/// Match polarity.
	pub op: Op,
}

/// One macro-to-path mapping row.
#[derive(Debug, Clone)]
pub struct MacroPathRow {
	/// The macro the path projects.
	pub lld_macro: String,

	/// The path expression source.
	pub path: String,
}

/// The single rule-row update of a processing invocation; fields left
/// `None` keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUpdate {
	/// The rule to update.
	pub rule: RuleId,

	/// New state, when transitioning.
	pub state: Option<RuleState>,

	/// New error text, when it changed.
	pub error: Option<String>,
}

impl RuleUpdate {
	/// Whether the update would change nothing.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.state.is_none() && self.error.is_none()
	}
}

/// Read and write access to the persistent rule catalog.
///
/// Reads are scoped to one rule. The only write is the single state/error
/// update at the end of an invocation; implementations should escape the
/// error text for their store as needed (length is already capped at
/// [`ERROR_FIELD_LEN`]).
pub trait Catalog: Send + Sync {
	/// Loads the rule row, or `None` when the rule vanished.
	fn rule(&self, rule: RuleId) -> Result<Option<RuleRow>, ExternalError>;

	/// Loads the rule's filter conditions.
	fn conditions(&self, rule: RuleId) -> Result<Vec<ConditionRow>, ExternalError>;

	/// Loads the rule's macro-to-path mappings, sorted by macro ascending.
	fn macro_paths(&self, rule: RuleId) -> Result<Vec<MacroPathRow>, ExternalError>;

	/// Applies the end-of-invocation update to the rule row.
	fn update_rule(&self, update: &RuleUpdate) -> Result<(), ExternalError>;
}
