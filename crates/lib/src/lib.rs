//! Discorule: the low-level discovery (LLD) rule processing core.
//!
//! A monitored host periodically emits a discovery payload: a JSON array of
//! objects, each describing one candidate entity (a filesystem, a network
//! interface, …). The [`Processor`] ingests one payload for one discovery
//! rule: it claims the rule, loads the rule's filter and macro-path
//! mappings from the [`Catalog`], keeps the payload rows the filter
//! accepts, hands the surviving row set to the registered [`Reconciler`]s
//! in order, and writes the resulting state and error back to the catalog
//! and the [configuration cache](ConfigCache).
//!
//! Filtering and macro projection themselves live in the
//! [`discorule-filterer`](filterer) crate; this crate drives them from
//! loaded rule state and owns every side effect.
//!
//! Processing is synchronous and single-threaded within one invocation.
//! Worker threads may call [`Processor::process`] concurrently for
//! different rules; for one rule, the [`RuleGate`] serializes invocations
//! by dropping the contending value, which is the intended behaviour of a
//! best-effort sampled pipeline.
//!
//! Note that the library generates a _lot_ of debug messaging with
//! [tracing]; processing-level failures are folded into the rule's
//! persisted error rather than returned, so log output is for debugging,
//! not error handling.

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]

pub mod error;

mod cache;
mod catalog;
mod events;
mod extract;
mod gate;
mod load;
mod processor;
mod reconcile;
mod rule;
mod subst;

/// The pure filtering layer, re-exported for embedders.
pub use discorule_filterer as filterer;

#[doc(inline)]
pub use crate::{
	cache::{ConfigCache, ItemDiff, ItemMeta},
	catalog::{
		Catalog, ConditionRow, HostId, MacroPathRow, RuleId, RuleRow, RuleState, RuleUpdate,
		Timestamp, ERROR_FIELD_LEN,
	},
	events::{EventBus, StateEvent},
	gate::{RuleClaim, RuleGate},
	processor::Processor,
	reconcile::{ReconcileError, Reconciler},
	rule::{Rule, MAX_LIFETIME},
	subst::{MacroSubstitutor, NoopSubstitutor},
};
