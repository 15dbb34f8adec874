//! The seam to the host- and item-scoped macro substitutor.

use crate::{cache::ItemMeta, catalog::HostId};

/// User-macro substitution, provided by the embedding process.
///
/// Literal filter patterns are interpolated in the context of the rule item
/// itself; named expression references are not interpolated at all, as they
/// name a pre-compiled registry entry. That asymmetry is deliberate.
pub trait MacroSubstitutor: Send + Sync {
	/// Interpolates user macros into a literal filter pattern.
	fn filter_pattern(&self, item: &ItemMeta, pattern: &str) -> String;

	/// Interpolates user macros into a lifetime spec.
	fn lifetime(&self, host: HostId, spec: &str) -> String;
}

/// The identity substitutor, for embedders without user macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSubstitutor;

impl MacroSubstitutor for NoopSubstitutor {
	fn filter_pattern(&self, _item: &ItemMeta, pattern: &str) -> String {
		pattern.to_owned()
	}

	fn lifetime(&self, _host: HostId, spec: &str) -> String {
		spec.to_owned()
	}
}
