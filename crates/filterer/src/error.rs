//! Error types for filter assembly and formula evaluation.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from assembling a discovery filter or its macro-path mappings.
///
/// Any of these fails the whole load; the pipeline surfaces them into the
/// rule's persisted error text.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
#[diagnostic(url(docsrs))]
pub enum FilterError {
	/// A macro-path mapping carries an invalid path expression.
	#[error("cannot use JSON path \"{path}\" for macro \"{lld_macro}\": {detail}")]
	#[diagnostic(code(discorule::filter::bad_path))]
	BadPath {
		/// The macro the path was registered for.
		lld_macro: String,

		/// The offending path expression.
		path: String,

		/// The path parser's diagnostic.
		detail: String,
	},

	/// A literal condition pattern does not compile after interpolation.
	#[error("cannot compile regular expression \"{pattern}\"")]
	#[diagnostic(code(discorule::filter::bad_pattern))]
	InvalidPattern {
		/// The interpolated pattern source.
		pattern: String,

		/// The compile failure.
		#[source]
		err: regex::Error,
	},

	/// A `@name` pattern references a named expression set the registry
	/// does not know.
	#[error("global regular expression \"{name}\" does not exist")]
	#[diagnostic(code(discorule::filter::unknown_named_expression))]
	UnknownNamedExpression {
		/// The referenced set name, without the `@` sigil.
		name: String,
	},
}

/// Errors from the arithmetic evaluator behind expression-mode filters.
///
/// These fail the affected row, not the rule.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FormulaError {
	/// The evaluator rejected the substituted formula, or produced a result
	/// that is not a number.
	#[error("cannot evaluate \"{formula}\"")]
	#[diagnostic(code(discorule::filter::formula))]
	Eval {
		/// The substituted formula buffer as handed to the evaluator.
		formula: String,

		/// The evaluator's error.
		#[source]
		err: evalexpr::EvalexprError,
	},
}
