//! The seam to the entity reconcilers.

use discorule_filterer::Row;
use miette::Diagnostic;
use thiserror::Error;

use crate::{catalog::Timestamp, error::ExternalError, rule::Rule};

/// Errors a reconciler reports back to the pipeline.
///
/// Either kind stops the remaining fan-out; the pipeline still proceeds to
/// writeback.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ReconcileError {
	/// The parent host vanished mid-flight.
	#[error("parent host disappeared")]
	#[diagnostic(code(discorule::reconcile::host_gone))]
	HostGone,

	/// Any other reconciler failure.
	#[error("external: {0}")]
	#[diagnostic(code(discorule::reconcile::external))]
	External(#[from] ExternalError),
}

/// Materializes one family of derived entities (items, triggers, graphs,
/// hosts) from the surviving row set.
///
/// Reconcilers run in registration order; by convention items go first, so
/// later reconcilers can read the [item links](Row::links) the item
/// reconciler left on each row.
pub trait Reconciler: Send + Sync {
	/// Short name for diagnostics (`"items"`, `"triggers"`, …).
	fn name(&self) -> &'static str;

	/// Reconciles this family's entities against the surviving rows.
	fn reconcile(
		&self,
		rule: &Rule,
		rows: &mut [Row<'_>],
		now: Timestamp,
	) -> Result<(), ReconcileError>;
}
