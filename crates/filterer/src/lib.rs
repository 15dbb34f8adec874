//! Row filtering and macro projection for low-level discovery.
//!
//! A discovery payload is an array of JSON objects; each object is a [`Row`]
//! describing one candidate entity. A [`Filter`] is a set of [`Condition`]s
//! combined according to an [`EvalType`]; it decides which rows survive.
//! Discovery macros are projected onto a row either through a registered
//! [`MacroPath`] or by direct field lookup.
//!
//! This crate is the pure evaluation layer: it performs no I/O and knows
//! nothing about catalogs, caches, or locks. The `discorule` crate drives it
//! from loaded rule state.
//!
//! Note that evaluation generates a _lot_ of trace-level messaging with
//! [tracing]; enable it only when debugging a filter.

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]

pub mod error;

mod condition;
mod filter;
mod formula;
mod path;
mod row;

#[doc(inline)]
pub use crate::{
	condition::{Condition, ConditionId, MatchOutcome, Op},
	error::{FilterError, FormulaError},
	filter::{EvalType, Filter},
	formula::double_eq,
	path::{MacroPath, MacroPathSet},
	row::{value_text, ItemLink, Row},
};
