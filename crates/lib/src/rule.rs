//! Loaded metadata of the rule being processed.

use std::time::Duration;

use discorule_filterer::EvalType;
use tracing::warn;

use crate::{
	catalog::{HostId, RuleId, RuleRow, RuleState},
	subst::MacroSubstitutor,
};

/// Lifetimes are capped at 25 years; unparsable specs clamp to this too.
pub const MAX_LIFETIME: Duration = Duration::from_secs(25 * 365 * 24 * 60 * 60);

/// The in-memory form of the rule being processed.
#[derive(Debug, Clone)]
pub struct Rule {
	/// Rule identifier.
	pub id: RuleId,

	/// Owning host.
	pub host: HostId,

	/// The discovery item's key.
	pub key: String,

	/// Persisted state before this invocation.
	pub state: RuleState,

	/// Filter combinator.
	pub evaltype: EvalType,

	/// Expression-mode formula.
	pub formula: String,

	/// Persisted error text before this invocation.
	pub last_error: String,

	/// How long lost resources are kept, parsed from the lifetime spec.
	pub lifetime: Duration,
}

impl Rule {
	/// Builds the in-memory rule from its catalog row, substituting and
	/// parsing the lifetime spec.
	#[must_use]
	pub fn from_row(row: RuleRow, subst: &dyn MacroSubstitutor) -> Self {
		let spec = subst.lifetime(row.host, &row.lifetime);
		let lifetime = parse_lifetime(&row.key, &spec);

		Self {
			id: row.rule,
			host: row.host,
			key: row.key,
			state: row.state,
			evaltype: row.evaltype,
			formula: row.formula,
			last_error: row.error,
			lifetime,
		}
	}
}

/// Parses a lifetime spec, clamping to [`MAX_LIFETIME`] on overflow and
/// falling back to it on parse failure.
fn parse_lifetime(key: &str, spec: &str) -> Duration {
	match humantime::parse_duration(spec.trim()) {
		Ok(lifetime) if lifetime > MAX_LIFETIME => {
			warn!(%key, %spec, "lifetime exceeds the maximum, clamping to 25 years");
			MAX_LIFETIME
		}
		Ok(lifetime) => lifetime,
		Err(err) => {
			warn!(%key, %spec, %err, "invalid lifetime, using 25 years");
			MAX_LIFETIME
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_specs_parse() {
		assert_eq!(parse_lifetime("k", "30d"), Duration::from_secs(30 * 86400));
		assert_eq!(
			parse_lifetime("k", "1h 30m"),
			Duration::from_secs(90 * 60)
		);
		assert_eq!(parse_lifetime("k", " 2w "), Duration::from_secs(14 * 86400));
	}

	#[test]
	fn garbage_clamps_to_max() {
		assert_eq!(parse_lifetime("k", "{$LIFETIME}"), MAX_LIFETIME);
		assert_eq!(parse_lifetime("k", ""), MAX_LIFETIME);
	}

	#[test]
	fn overlong_specs_clamp_to_max() {
		assert_eq!(parse_lifetime("k", "100years"), MAX_LIFETIME);
	}
}
