//! Opening a discovery payload and extracting its surviving rows.

use std::fmt::Write;

use discorule_filterer::{Filter, MacroPathSet, Row};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::DiscoveryError;

/// The rows surviving filter evaluation, in payload order, plus the
/// accumulated missing-macro diagnostics.
#[derive(Debug, Default)]
pub(crate) struct Extraction<'a> {
	pub rows: Vec<Row<'a>>,
	pub warnings: String,
}

/// Locates the payload's row array: either the top-level array or the
/// `data` member of the legacy wrapper object.
fn row_array(payload: &Value) -> Result<&Vec<Value>, DiscoveryError> {
	if let Some(rows) = payload.as_array() {
		return Ok(rows);
	}

	let data = payload
		.as_object()
		.and_then(|obj| obj.get("data"))
		.ok_or(DiscoveryError::NotAnArray)?;

	debug!("discovery value uses the deprecated {{\"data\": [...]}} wrapper");
	data.as_array().ok_or(DiscoveryError::BadDataField)
}

/// Walks the payload: skips non-object elements, notes every
/// filter-referenced macro a row carries no value for, and keeps the rows
/// the filter accepts.
///
/// Warnings do not prevent row acceptance; they end up appended to the
/// rule's persisted error.
pub(crate) fn extract_rows<'a>(
	payload: &'a Value,
	filter: &Filter,
	paths: &MacroPathSet,
) -> Result<Extraction<'a>, DiscoveryError> {
	let elements = row_array(payload)?;
	let macros = filter.referenced_macros();

	let mut out = Extraction::default();
	for element in elements {
		let Some(row) = Row::from_value(element) else {
			debug!("skipping non-object discovery row");
			continue;
		};

		for &lld_macro in &macros {
			if paths.resolve(&row, lld_macro).is_none() {
				warn_missing_macro(&mut out.warnings, lld_macro, paths);
			}
		}

		if filter.check_row(&row, paths) {
			trace!(row = %element, "row passes filter");
			out.rows.push(row);
		} else {
			trace!(row = %element, "row fails filter");
		}
	}

	Ok(out)
}

fn warn_missing_macro(warnings: &mut String, lld_macro: &str, paths: &MacroPathSet) {
	if let Some(path) = paths.lookup(lld_macro) {
		let _ = writeln!(
			warnings,
			"cannot accurately apply filter: no value received for macro \"{lld_macro}\" at JSON path \"{}\".",
			path.path()
		);
	} else {
		let _ = writeln!(
			warnings,
			"cannot accurately apply filter: no value received for macro \"{lld_macro}\"."
		);
	}
}
