use tracing::{debug, trace};

use crate::{condition::Condition, formula, path::MacroPathSet, row::Row};

/// How condition results compose into a filter result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalType {
	/// Conditions group by macro: disjunctive within a group, groups
	/// conjoined.
	AndOr,

	/// Every condition must pass.
	And,

	/// Any condition passing suffices.
	Or,

	/// A boolean formula over `{<condition id>}` placeholders decides.
	Expression,
}

impl TryFrom<u8> for EvalType {
	type Error = u8;

	/// Converts from the catalog's evaltype codes.
	fn try_from(code: u8) -> Result<Self, u8> {
		match code {
			0 => Ok(Self::AndOr),
			1 => Ok(Self::And),
			2 => Ok(Self::Or),
			3 => Ok(Self::Expression),
			other => Err(other),
		}
	}
}

/// The filter of one discovery rule: loaded conditions plus the combinator
/// that folds their per-row results into pass or fail.
#[derive(Debug)]
pub struct Filter {
	evaltype: EvalType,
	formula: String,
	conditions: Vec<Condition>,
}

impl Filter {
	/// Assembles a filter from loaded conditions.
	///
	/// Under [`EvalType::AndOr`] the conditions are sorted by macro, with
	/// the condition id as tiebreaker, so that adjacent entries sharing a
	/// macro form a group and group boundaries are deterministic across
	/// reloads. `formula` is only significant for
	/// [`EvalType::Expression`].
	#[must_use]
	pub fn new(
		evaltype: EvalType,
		formula: impl Into<String>,
		mut conditions: Vec<Condition>,
	) -> Self {
		if evaltype == EvalType::AndOr {
			conditions.sort_by(|a, b| a.lld_macro.cmp(&b.lld_macro).then(a.id.cmp(&b.id)));
		}

		Self {
			evaltype,
			formula: formula.into(),
			conditions,
		}
	}

	/// The filter's combinator.
	#[must_use]
	pub fn evaltype(&self) -> EvalType {
		self.evaltype
	}

	/// The loaded conditions, in evaluation order.
	#[must_use]
	pub fn conditions(&self) -> &[Condition] {
		&self.conditions
	}

	/// Whether the filter has no conditions at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty()
	}

	/// The distinct macros the filter references, sorted.
	#[must_use]
	pub fn referenced_macros(&self) -> Vec<&str> {
		let mut macros: Vec<&str> = self
			.conditions
			.iter()
			.map(|c| c.lld_macro.as_str())
			.collect();
		macros.sort_unstable();
		macros.dedup();
		macros
	}

	/// Evaluates the filter against one row.
	///
	/// A filter without conditions passes everything.
	#[must_use]
	pub fn check_row(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		if self.conditions.is_empty() {
			trace!("no conditions, skipping entire check (pass)");
			return true;
		}

		match self.evaltype {
			EvalType::And => self.check_and(row, paths),
			EvalType::Or => self.check_or(row, paths),
			EvalType::AndOr => self.check_and_or(row, paths),
			EvalType::Expression => self.check_expression(row, paths),
		}
	}

	fn check_and(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		for condition in &self.conditions {
			if !condition.check_row(row, paths) {
				trace!(id = %condition.id, "condition fails, failing entire row");
				return false;
			}
		}

		true
	}

	fn check_or(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		for condition in &self.conditions {
			if condition.check_row(row, paths) {
				trace!(id = %condition.id, "condition passes, passing entire row");
				return true;
			}
		}

		false
	}

	/// Conditions arrive sorted by macro; adjacent entries sharing a macro
	/// form a disjunctive group, and the groups conjoin.
	fn check_and_or(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		let mut group_macro: Option<&str> = None;
		let mut group_result = false;

		for condition in &self.conditions {
			if group_macro != Some(condition.lld_macro.as_str()) {
				if group_macro.is_some() && !group_result {
					trace!(lld_macro = ?group_macro, "macro group fails, failing entire row");
					return false;
				}
				group_macro = Some(condition.lld_macro.as_str());
				group_result = false;
			}

			if !group_result && condition.check_row(row, paths) {
				group_result = true;
			}
		}

		group_result
	}

	fn check_expression(&self, row: &Row<'_>, paths: &MacroPathSet) -> bool {
		let mut buffer = self.formula.clone();
		for condition in &self.conditions {
			let token = format!("{{{}}}", condition.id);
			formula::substitute(&mut buffer, &token, condition.check_row(row, paths));
		}

		match formula::eval(&buffer) {
			Ok(result) => !formula::double_eq(result, 0.0),
			Err(err) => {
				debug!(formula = %buffer, %err, "cannot evaluate filter formula, failing row");
				false
			}
		}
	}
}
