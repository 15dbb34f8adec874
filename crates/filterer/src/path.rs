use std::fmt;
use std::str::FromStr;

use jsonpath_rust::{JsonPath, JsonPathValue};
use serde_json::Value;
use tracing::trace;

use crate::{
	error::FilterError,
	row::{value_text, Row},
};

/// A discovery macro bound to a structured-document path expression.
///
/// The path is validated when the mapping is constructed; projecting through
/// it can then only fail by finding nothing.
pub struct MacroPath {
	lld_macro: String,
	path: String,
	parsed: JsonPath,
}

impl MacroPath {
	/// Validates `path` and binds it to `lld_macro`.
	pub fn new(lld_macro: impl Into<String>, path: impl Into<String>) -> Result<Self, FilterError> {
		let lld_macro = lld_macro.into();
		let path = path.into();
		let parsed: JsonPath = JsonPath::from_str(&path).map_err(|err| FilterError::BadPath {
			lld_macro: lld_macro.clone(),
			path: path.clone(),
			detail: err.to_string(),
		})?;

		Ok(Self {
			lld_macro,
			path,
			parsed,
		})
	}

	/// The macro this path projects.
	#[must_use]
	pub fn lld_macro(&self) -> &str {
		&self.lld_macro
	}

	/// The path expression source.
	#[must_use]
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Projects the value at this path out of a row subtree.
	///
	/// A single match projects as its text; several matches project as the
	/// serialized array of them.
	#[must_use]
	pub fn project(&self, data: &Value) -> Option<String> {
		let found: Vec<&Value> = self
			.parsed
			.find_slice(data)
			.into_iter()
			.filter_map(|v| match v {
				JsonPathValue::Slice(value, _) => Some(value),
				JsonPathValue::NewValue(_) | JsonPathValue::NoValue => None,
			})
			.collect();

		match found.as_slice() {
			[] => None,
			[single] => Some(value_text(single)),
			many => Some(Value::Array(many.iter().map(|&v| v.clone()).collect()).to_string()),
		}
	}
}

impl fmt::Debug for MacroPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MacroPath")
			.field("macro", &self.lld_macro)
			.field("path", &self.path)
			.finish_non_exhaustive()
	}
}

/// The macro-to-path mappings of one discovery rule, sorted by macro for
/// binary-search lookup.
#[derive(Debug, Default)]
pub struct MacroPathSet {
	paths: Vec<MacroPath>,
}

impl MacroPathSet {
	/// Assembles the set, sorting by macro.
	#[must_use]
	pub fn new(mut paths: Vec<MacroPath>) -> Self {
		paths.sort_by(|a, b| a.lld_macro.cmp(&b.lld_macro));
		Self { paths }
	}

	/// The registered path for a macro, if any.
	#[must_use]
	pub fn lookup(&self, lld_macro: &str) -> Option<&MacroPath> {
		self.paths
			.binary_search_by(|p| p.lld_macro.as_str().cmp(lld_macro))
			.ok()
			.map(|pos| &self.paths[pos])
	}

	/// Whether any mappings are registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	/// Number of registered mappings.
	#[must_use]
	pub fn len(&self) -> usize {
		self.paths.len()
	}

	/// Resolves a discovery macro against a row: through the registered path
	/// when one exists, as the row's same-named field otherwise.
	///
	/// A registered path that finds nothing is an absence; there is no
	/// fallback to the direct field. Allocates a fresh buffer per call.
	#[must_use]
	pub fn resolve(&self, row: &Row<'_>, lld_macro: &str) -> Option<String> {
		if let Some(path) = self.lookup(lld_macro) {
			let value = path.project(row.data());
			trace!(%lld_macro, path = %path.path(), found = value.is_some(), "resolved macro via path");
			return value;
		}

		row.field(lld_macro).map(value_text)
	}
}
