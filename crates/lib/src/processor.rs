//! The discovery rule processing pipeline.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
	cache::{ConfigCache, ItemDiff},
	catalog::{Catalog, RuleId, RuleState, RuleUpdate, Timestamp, ERROR_FIELD_LEN},
	error::DiscoveryError,
	events::{EventBus, StateEvent},
	extract::{extract_rows, Extraction},
	gate::RuleGate,
	load::{load_filter, load_macro_paths},
	reconcile::{ReconcileError, Reconciler},
	rule::Rule,
	subst::MacroSubstitutor,
};

/// The low-level discovery pipeline.
///
/// All this really does is tie the collaborators together around one
/// invocation: claim the rule, load its filter and macro paths, extract the
/// surviving rows, fan out to the reconcilers, write state and error back.
pub struct Processor {
	catalog: Arc<dyn Catalog>,
	cache: Arc<dyn ConfigCache>,
	events: Arc<dyn EventBus>,
	subst: Arc<dyn MacroSubstitutor>,
	reconcilers: Vec<Box<dyn Reconciler>>,
	gate: RuleGate,
}

impl fmt::Debug for Processor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Processor")
			.field(
				"reconcilers",
				&self.reconcilers.iter().map(|r| r.name()).collect::<Vec<_>>(),
			)
			.field("gate", &self.gate)
			.finish_non_exhaustive()
	}
}

impl Processor {
	/// Builds a processor around its collaborators, with no reconcilers.
	#[must_use]
	pub fn new(
		catalog: Arc<dyn Catalog>,
		cache: Arc<dyn ConfigCache>,
		events: Arc<dyn EventBus>,
		subst: Arc<dyn MacroSubstitutor>,
	) -> Self {
		Self {
			catalog,
			cache,
			events,
			subst,
			reconcilers: Vec::new(),
			gate: RuleGate::new(),
		}
	}

	/// Appends a reconciler to the fan-out. Registration order is
	/// invocation order: items, then triggers, then graphs, then hosts.
	#[must_use]
	pub fn with_reconciler(mut self, reconciler: Box<dyn Reconciler>) -> Self {
		self.reconcilers.push(reconciler);
		self
	}

	/// The per-rule claim registry.
	#[must_use]
	pub fn gate(&self) -> &RuleGate {
		&self.gate
	}

	/// Processes one discovery value for one rule.
	///
	/// Returns `Err` only when a collaborator fails in a way that prevents
	/// even the error writeback. Every processing-level failure is folded
	/// into the rule's persisted error per its disposition; a contended or
	/// vanished rule aborts with a log line and the value is dropped.
	pub fn process(&self, rule: RuleId, value: &str, now: Timestamp) -> Result<(), DiscoveryError> {
		debug!(%rule, "processing received value");

		let Some(_claim) = self.gate.try_lock(rule) else {
			let err = DiscoveryError::RuleLocked { rule };
			warn!(%rule, %err, "dropping value");
			return Ok(());
		};

		let Some(row) = self.catalog.rule(rule)? else {
			let err = DiscoveryError::RuleMissing { rule };
			debug!(%rule, %err, "dropping value");
			return Ok(());
		};
		let rule = Rule::from_row(row, self.subst.as_ref());

		let mut error = String::new();
		let mut warnings = String::new();
		let mut processed = false;

		match self.run(&rule, value, now, &mut warnings) {
			Ok(()) => processed = true,
			Err(DiscoveryError::External(err)) => return Err(DiscoveryError::External(err)),
			Err(err) => {
				debug!(rule = %rule.id, %err, "cannot process discovery value");
				error = err.to_string();
			}
		}

		self.write_back(&rule, processed, error, &warnings, now)
	}

	/// S3–S6: load, extract, reconcile. Only load and extraction failures
	/// propagate; a reconciler stopping the fan-out is not an error of the
	/// invocation.
	fn run(
		&self,
		rule: &Rule,
		value: &str,
		now: Timestamp,
		warnings: &mut String,
	) -> Result<(), DiscoveryError> {
		let filter = load_filter(
			self.catalog.as_ref(),
			self.cache.as_ref(),
			self.subst.as_ref(),
			rule,
		)?;
		let paths = load_macro_paths(self.catalog.as_ref(), rule)?;

		// the parsed payload stays on this frame: rows borrow into it
		let payload: Value =
			serde_json::from_str(value).map_err(|err| DiscoveryError::InvalidPayload { err })?;

		let Extraction {
			mut rows,
			warnings: missing,
		} = extract_rows(&payload, &filter, &paths)?;
		warnings.push_str(&missing);
		debug!(rule = %rule.id, rows = rows.len(), "extracted surviving rows");

		for reconciler in &self.reconcilers {
			trace!(rule = %rule.id, reconciler = %reconciler.name(), "reconciling");
			match reconciler.reconcile(rule, &mut rows, now) {
				Ok(()) => {}
				Err(ReconcileError::HostGone) => {
					debug!(rule = %rule.id, reconciler = %reconciler.name(), "parent host disappeared, stopping reconciliation");
					break;
				}
				Err(err) => {
					warn!(rule = %rule.id, reconciler = %reconciler.name(), %err, "reconciler failed, stopping reconciliation");
					break;
				}
			}
		}

		Ok(())
	}

	/// S7: emit the became-supported event when transitioning, persist the
	/// combined error when it changed, and push the same diff into the
	/// configuration cache, exactly once, still under the claim.
	fn write_back(
		&self,
		rule: &Rule,
		processed: bool,
		error: String,
		warnings: &str,
		now: Timestamp,
	) -> Result<(), DiscoveryError> {
		let mut update = RuleUpdate {
			rule: rule.id,
			state: None,
			error: None,
		};

		if processed && rule.state == RuleState::NotSupported {
			info!(rule = %rule.id, key = %rule.key, "discovery rule became supported");
			self.events.emit(StateEvent {
				rule: rule.id,
				clock: now,
				state: RuleState::Normal,
			});
			self.events.process();
			self.events.clean();
			update.state = Some(RuleState::Normal);
		}

		let mut combined = error;
		if !warnings.is_empty() {
			if !combined.is_empty() && !combined.ends_with('\n') {
				combined.push('\n');
			}
			combined.push_str(warnings);
		}
		let combined = truncate_error(combined);

		if combined != rule.last_error {
			debug!(rule = %rule.id, error = %combined, "updating rule error");
			update.error = Some(combined);
		}

		if !update.is_empty() {
			self.catalog.update_rule(&update)?;
			self.cache.apply_diff(vec![ItemDiff {
				item: rule.id,
				state: update.state,
				error: update.error,
			}]);
		}

		Ok(())
	}
}

/// Truncates error text to the catalog's field limit on a char boundary.
fn truncate_error(mut error: String) -> String {
	if error.len() > ERROR_FIELD_LEN {
		let mut cut = ERROR_FIELD_LEN;
		while !error.is_char_boundary(cut) {
			cut -= 1;
		}
		error.truncate(cut);
	}

	error
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncation_respects_char_boundaries() {
		let error = "é".repeat(ERROR_FIELD_LEN);
		let truncated = truncate_error(error);

		assert!(truncated.len() <= ERROR_FIELD_LEN);
		assert!(truncated.chars().all(|c| c == 'é'));
	}

	#[test]
	fn short_errors_pass_through() {
		assert_eq!(truncate_error("prev".into()), "prev");
		assert_eq!(truncate_error(String::new()), "");
	}
}
