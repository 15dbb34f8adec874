//! The bridge between expression-mode filters and the arithmetic evaluator.
//!
//! An expression-mode formula is boolean arithmetic over `{<condition id>}`
//! placeholders in the catalog's dialect: `and`/`or`/`not` word operators,
//! `1`/`0` truth values, parentheses. Substitution writes the truth values
//! in place; evaluation hands the buffer to [evalexpr] through a small
//! rewrite, since that evaluator types its boolean operators strictly.

use crate::error::FormulaError;

/// Margin inside which two floats compare as equal.
pub(crate) const EPSILON: f64 = 1e-9;

/// Float equality within a fixed epsilon, as used for the formula's
/// non-zero test.
#[must_use]
pub fn double_eq(a: f64, b: f64) -> bool {
	(a - b).abs() <= EPSILON
}

/// Replaces every occurrence of `token` in `buffer` with `'1'` or `'0'`
/// padded with spaces to the token's length, so the positions of tokens not
/// yet substituted stay valid.
pub(crate) fn substitute(buffer: &mut String, token: &str, value: bool) {
	debug_assert!(!token.is_empty());

	let mut from = 0;
	while let Some(found) = buffer[from..].find(token) {
		let start = from + found;
		let end = start + token.len();

		let mut replacement = String::with_capacity(token.len());
		replacement.push(if value { '1' } else { '0' });
		for _ in 1..token.len() {
			replacement.push(' ');
		}

		buffer.replace_range(start..end, &replacement);
		from = end;
	}
}

/// Evaluates a substituted formula buffer and returns its numeric result.
///
/// Anything left in the buffer that the evaluator cannot digest, such as an
/// unreplaced `{id}` token, is the evaluator's to reject.
pub fn eval(formula: &str) -> Result<f64, FormulaError> {
	let expr = rewrite(formula);
	let value = evalexpr::eval(&expr).map_err(|err| FormulaError::Eval {
		formula: formula.to_owned(),
		err,
	})?;

	match value {
		evalexpr::Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
		other => other.as_number().map_err(|err| FormulaError::Eval {
			formula: formula.to_owned(),
			err,
		}),
	}
}

/// Rewrites the catalog's formula dialect into the evaluator's: word
/// operators become symbolic ones and bare numbers become zero-comparisons,
/// which is how a numeric truth value enters a strictly boolean operator.
/// `{…}` tokens are copied verbatim.
fn rewrite(formula: &str) -> String {
	let bytes = formula.as_bytes();
	let mut out = String::with_capacity(formula.len() + 16);
	let mut i = 0;

	while i < bytes.len() {
		let c = bytes[i] as char;
		if c == '{' {
			let end = formula[i..]
				.find('}')
				.map_or(formula.len(), |p| i + p + 1);
			out.push_str(&formula[i..end]);
			i = end;
		} else if c.is_ascii_alphabetic() {
			let mut j = i;
			while j < bytes.len() && (bytes[j] as char).is_ascii_alphanumeric() {
				j += 1;
			}
			match &formula[i..j] {
				"and" => out.push_str("&&"),
				"or" => out.push_str("||"),
				"not" => out.push('!'),
				word => out.push_str(word),
			}
			i = j;
		} else if c.is_ascii_digit() {
			let mut j = i;
			while j < bytes.len() && ((bytes[j] as char).is_ascii_digit() || bytes[j] == b'.') {
				j += 1;
			}
			out.push('(');
			out.push_str(&formula[i..j]);
			out.push_str(" != 0)");
			i = j;
		} else {
			out.push(c);
			i += 1;
		}
	}

	out
}
