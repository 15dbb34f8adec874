use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use crate::{path::MacroPathSet, row::Row};

/// Persistent identifier of a filter condition, also the `{<id>}`
/// placeholder name in expression-mode formulas.
pub type ConditionId = u64;

/// The operation a condition applies to the macro's resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Op {
	/// The value must match the regular expression.
	RegexpMatch,

	/// The value must not match the regular expression.
	RegexpNotMatch,
}

impl TryFrom<u8> for Op {
	type Error = u8;

	/// Converts from the catalog's operator codes.
	fn try_from(code: u8) -> Result<Self, u8> {
		match code {
			8 => Ok(Self::RegexpMatch),
			9 => Ok(Self::RegexpNotMatch),
			other => Err(other),
		}
	}
}

/// Three-way outcome of matching a value against a condition's compiled
/// alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
	/// At least one alternative matched.
	Matched,

	/// No alternative matched.
	NotMatched,

	/// The match could not be performed.
	Error,
}

/// One filter condition: a discovery macro, an operation, and the compiled
/// regular-expression alternatives to apply to the macro's value.
///
/// Loaders guarantee a non-empty alternatives set; a hand-built condition
/// without any yields [`MatchOutcome::Error`] on every match, which maps to
/// fail under either operation.
#[derive(Debug, Clone)]
pub struct Condition {
	/// Persistent condition identifier.
	pub id: ConditionId,

	/// The discovery macro whose per-row value is matched.
	pub lld_macro: String,

	/// How the match outcome maps to pass/fail.
	pub op: Op,

	/// Compiled alternatives: one for a literal pattern, one or more for a
	/// named expression set.
	pub regexps: Vec<Arc<Regex>>,
}

impl Condition {
	/// Assembles a condition from loaded parts.
	#[must_use]
	pub fn new(
		id: ConditionId,
		lld_macro: impl Into<String>,
		op: Op,
		regexps: Vec<Arc<Regex>>,
	) -> Self {
		Self {
			id,
			lld_macro: lld_macro.into(),
			op,
			regexps,
		}
	}

	/// Matches a resolved macro value against the alternatives,
	/// case-sensitively.
	#[must_use]
	pub fn match_value(&self, value: &str) -> MatchOutcome {
		if self.regexps.is_empty() {
			return MatchOutcome::Error;
		}

		if self.regexps.iter().any(|rx| rx.is_match(value)) {
			MatchOutcome::Matched
		} else {
			MatchOutcome::NotMatched
		}
	}

	/// Evaluates the condition against one row: resolve the macro, match its
	/// value, map the outcome through the operation.
	///
	/// An unresolvable macro fails the condition, as does a match error.
	#[must_use]
	pub fn check_row(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		let Some(value) = paths.resolve(row, &self.lld_macro) else {
			trace!(id = %self.id, lld_macro = %self.lld_macro, "no value for macro, condition fails");
			return false;
		};

		let outcome = self.match_value(&value);
		trace!(id = %self.id, op = ?self.op, ?outcome, "matched condition");
		matches!(
			(self.op, outcome),
			(Op::RegexpMatch, MatchOutcome::Matched) | (Op::RegexpNotMatch, MatchOutcome::NotMatched)
		)
	}
}
