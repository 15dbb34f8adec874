//! Loading a rule's filter and macro-path mappings from the catalog.

use std::sync::Arc;

use discorule_filterer::{Condition, Filter, FilterError, MacroPath, MacroPathSet};
use regex::Regex;
use tracing::{debug, trace};

use crate::{
	cache::ConfigCache, catalog::Catalog, error::DiscoveryError, rule::Rule,
	subst::MacroSubstitutor,
};

/// Loads and compiles the rule's filter conditions.
///
/// `@name` patterns resolve against the named expression registry and are
/// not interpolated; literal patterns are interpolated in the rule item's
/// context before compiling. One bad condition fails the whole load.
pub(crate) fn load_filter(
	catalog: &dyn Catalog,
	cache: &dyn ConfigCache,
	subst: &dyn MacroSubstitutor,
	rule: &Rule,
) -> Result<Filter, DiscoveryError> {
	let rows = catalog.conditions(rule.id)?;

	let item = cache.item(rule.id);
	if item.is_none() {
		debug!(rule = %rule.id, "rule item not cached, skipping pattern interpolation");
	}

	let mut conditions = Vec::with_capacity(rows.len());
	for row in rows {
		let regexps = if let Some(name) = row.pattern.strip_prefix('@') {
			let refs = cache.named_expressions(name);
			if refs.is_empty() {
				return Err(FilterError::UnknownNamedExpression {
					name: name.to_owned(),
				}
				.into());
			}
			refs
		} else {
			let pattern = item.as_ref().map_or_else(
				|| row.pattern.clone(),
				|item| subst.filter_pattern(item, &row.pattern),
			);
			let regexp =
				Regex::new(&pattern).map_err(|err| FilterError::InvalidPattern { pattern, err })?;
			vec![Arc::new(regexp)]
		};

		trace!(id = %row.id, lld_macro = %row.lld_macro, alternatives = regexps.len(), "loaded condition");
		conditions.push(Condition::new(row.id, row.lld_macro, row.op, regexps));
	}

	Ok(Filter::new(rule.evaltype, rule.formula.clone(), conditions))
}

/// Loads and validates the rule's macro-to-path mappings.
pub(crate) fn load_macro_paths(
	catalog: &dyn Catalog,
	rule: &Rule,
) -> Result<MacroPathSet, DiscoveryError> {
	let rows = catalog.macro_paths(rule.id)?;

	let mut paths = Vec::with_capacity(rows.len());
	for row in rows {
		paths.push(MacroPath::new(row.lld_macro, row.path)?);
	}

	Ok(MacroPathSet::new(paths))
}
