//! Per-rule exclusion for the processing pipeline.

use dashmap::DashSet;
use tracing::trace;

use crate::catalog::RuleId;

/// Process-wide claim registry serializing work per discovery rule.
///
/// Claims are non-blocking: a contended [`try_lock`](RuleGate::try_lock)
/// returns `None` and the caller abandons its value. There are no waiters;
/// dropping the contending value is intentional. A claim is held across the
/// whole pipeline, reconciler fan-out and writeback included.
#[derive(Debug, Default)]
pub struct RuleGate {
	claims: DashSet<RuleId>,
}

impl RuleGate {
	/// Creates an empty registry.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Claims a rule. `None` means another worker holds it.
	#[must_use]
	pub fn try_lock(&self, rule: RuleId) -> Option<RuleClaim<'_>> {
		if self.claims.insert(rule) {
			trace!(%rule, "claimed rule");
			Some(RuleClaim { gate: self, rule })
		} else {
			None
		}
	}

	/// Whether a rule is currently claimed.
	#[must_use]
	pub fn is_locked(&self, rule: RuleId) -> bool {
		self.claims.contains(&rule)
	}
}

/// An exclusive claim on one rule; dropping it releases the rule.
#[derive(Debug)]
pub struct RuleClaim<'g> {
	gate: &'g RuleGate,
	rule: RuleId,
}

impl Drop for RuleClaim<'_> {
	fn drop(&mut self) {
		self.gate.claims.remove(&self.rule);
		trace!(rule = %self.rule, "released rule");
	}
}
