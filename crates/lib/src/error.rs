//! Error types for the discovery pipeline.

use miette::Diagnostic;
use thiserror::Error;

use crate::catalog::RuleId;

pub use discorule_filterer::{FilterError, FormulaError};

/// Failures external collaborators (catalog, configuration cache, event
/// bus, reconcilers) can produce, flattened at the seam.
pub type ExternalError = Box<dyn std::error::Error + Send + Sync>;

/// Errors arising while processing one discovery value.
///
/// Most of these never leave [`Processor::process`]: the silent-abort kinds
/// are logged and swallowed, and the kinds that describe a bad rule or a
/// bad value surface into the rule's persisted error text instead. Only
/// [`External`](DiscoveryError::External) reaches the caller.
///
/// [`Processor::process`]: crate::Processor::process
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
	/// The rule vanished from the catalog between delivery and processing.
	#[error("discovery rule {rule} is not in the catalog")]
	#[diagnostic(code(discorule::process::rule_missing), url(docsrs))]
	RuleMissing {
		/// The rule the value arrived for.
		rule: RuleId,
	},

	/// Another worker holds the rule's claim.
	#[error("discovery rule {rule} is being processed already")]
	#[diagnostic(code(discorule::process::rule_locked), url(docsrs))]
	RuleLocked {
		/// The contended rule.
		rule: RuleId,
	},

	/// The payload is not well-formed JSON.
	#[error("invalid discovery rule value: {err}")]
	#[diagnostic(code(discorule::process::invalid_payload), url(docsrs))]
	InvalidPayload {
		/// The parser's diagnostic.
		#[source]
		err: serde_json::Error,
	},

	/// The payload is neither an array nor an object carrying a `data`
	/// array.
	#[error("value should be a JSON array or an object containing a \"data\" array")]
	#[diagnostic(code(discorule::process::not_an_array), url(docsrs))]
	NotAnArray,

	/// The legacy payload object's `data` element is not an array.
	#[error("the \"data\" element of the discovery value is not an array")]
	#[diagnostic(code(discorule::process::bad_data_field), url(docsrs))]
	BadDataField,

	/// Filter or macro-path load failure.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Filter(#[from] FilterError),

	/// A collaborator failed; nothing was persisted.
	#[error("external: {0}")]
	#[diagnostic(code(discorule::process::external), url(docsrs))]
	External(#[from] ExternalError),
}
