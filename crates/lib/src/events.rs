//! The append-only seam to the event pipeline.

use crate::catalog::{RuleId, RuleState, Timestamp};

/// An internal event recording a discovery rule's state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEvent {
	/// The rule whose state changed.
	pub rule: RuleId,

	/// When the value that caused the change arrived.
	pub clock: Timestamp,

	/// The state the rule moved to.
	pub state: RuleState,
}

/// The event pipeline state-change events are pushed into.
///
/// The processor emits, processes, then cleans, in that order, at the point
/// a rule becomes supported again.
pub trait EventBus: Send + Sync {
	/// Queues a state-change event.
	fn emit(&self, event: StateEvent);

	/// Flushes queued events through the pipeline.
	fn process(&self);

	/// Releases flushed events.
	fn clean(&self);
}
