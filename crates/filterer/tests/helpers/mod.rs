#![allow(dead_code)]

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use discorule_filterer::{Condition, Filter, MacroPath, MacroPathSet, Op, Row};

pub fn init_logging() {
	tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init()
		.ok();
}

pub fn rx(pattern: &str) -> Vec<Arc<Regex>> {
	vec![Arc::new(Regex::new(pattern).expect("test pattern compiles"))]
}

pub fn cond(id: u64, lld_macro: &str, pattern: &str) -> Condition {
	Condition::new(id, lld_macro, Op::RegexpMatch, rx(pattern))
}

pub fn not_cond(id: u64, lld_macro: &str, pattern: &str) -> Condition {
	Condition::new(id, lld_macro, Op::RegexpNotMatch, rx(pattern))
}

pub fn paths(pairs: &[(&str, &str)]) -> MacroPathSet {
	MacroPathSet::new(
		pairs
			.iter()
			.map(|(m, p)| MacroPath::new(*m, *p).expect("test path is valid"))
			.collect(),
	)
}

pub trait FilterHarness {
	fn check(&self, row: &Value, paths: &MacroPathSet) -> bool;

	fn row_pass(&self, row: &Value, paths: &MacroPathSet, pass: bool) {
		tracing::info!(%row, ?pass, "check");

		assert_eq!(
			self.check(row, paths),
			pass,
			"{row} (expected {})",
			if pass { "pass" } else { "fail" }
		);
	}

	fn row_does_pass(&self, row: &Value) {
		self.row_pass(row, &MacroPathSet::default(), true);
	}

	fn row_doesnt_pass(&self, row: &Value) {
		self.row_pass(row, &MacroPathSet::default(), false);
	}

	fn row_does_pass_with(&self, row: &Value, paths: &MacroPathSet) {
		self.row_pass(row, paths, true);
	}

	fn row_doesnt_pass_with(&self, row: &Value, paths: &MacroPathSet) {
		self.row_pass(row, paths, false);
	}
}

impl FilterHarness for Filter {
	fn check(&self, row: &Value, paths: &MacroPathSet) -> bool {
		let row = Row::from_value(row).expect("test row is an object");
		self.check_row(&row, paths)
	}
}
