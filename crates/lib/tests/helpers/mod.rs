#![allow(dead_code)]

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

use regex::Regex;

use discorule::{
	error::ExternalError,
	filterer::{EvalType, Op, Row},
	Catalog, ConditionRow, ConfigCache, EventBus, ItemDiff, ItemMeta, MacroPathRow,
	NoopSubstitutor, Processor, ReconcileError, Reconciler, Rule, RuleId, RuleRow, RuleState,
	RuleUpdate, StateEvent, Timestamp,
};

pub const NOW: Timestamp = 1_700_000_000;

/// In-memory rule catalog; `update_rule` applies the update so consecutive
/// invocations observe it, like the real store would.
#[derive(Default)]
pub struct MemCatalog {
	rules: Mutex<HashMap<RuleId, RuleRow>>,
	conditions: Mutex<HashMap<RuleId, Vec<ConditionRow>>>,
	macro_paths: Mutex<HashMap<RuleId, Vec<MacroPathRow>>>,
	updates: Mutex<Vec<RuleUpdate>>,
}

impl MemCatalog {
	pub fn put_rule(&self, row: RuleRow) {
		self.rules.lock().expect("catalog lock").insert(row.rule, row);
	}

	pub fn put_conditions(&self, rule: RuleId, rows: Vec<ConditionRow>) {
		self.conditions.lock().expect("catalog lock").insert(rule, rows);
	}

	pub fn put_macro_paths(&self, rule: RuleId, rows: Vec<MacroPathRow>) {
		self.macro_paths.lock().expect("catalog lock").insert(rule, rows);
	}

	pub fn updates(&self) -> Vec<RuleUpdate> {
		self.updates.lock().expect("catalog lock").clone()
	}

	pub fn stored_error(&self, rule: RuleId) -> String {
		self.rules.lock().expect("catalog lock")[&rule].error.clone()
	}

	pub fn stored_state(&self, rule: RuleId) -> RuleState {
		self.rules.lock().expect("catalog lock")[&rule].state
	}
}

impl Catalog for MemCatalog {
	fn rule(&self, rule: RuleId) -> Result<Option<RuleRow>, ExternalError> {
		Ok(self.rules.lock().expect("catalog lock").get(&rule).cloned())
	}

	fn conditions(&self, rule: RuleId) -> Result<Vec<ConditionRow>, ExternalError> {
		Ok(self
			.conditions
			.lock()
			.expect("catalog lock")
			.get(&rule)
			.cloned()
			.unwrap_or_default())
	}

	fn macro_paths(&self, rule: RuleId) -> Result<Vec<MacroPathRow>, ExternalError> {
		let mut rows = self
			.macro_paths
			.lock()
			.expect("catalog lock")
			.get(&rule)
			.cloned()
			.unwrap_or_default();
		rows.sort_by(|a, b| a.lld_macro.cmp(&b.lld_macro));
		Ok(rows)
	}

	fn update_rule(&self, update: &RuleUpdate) -> Result<(), ExternalError> {
		self.updates.lock().expect("catalog lock").push(update.clone());

		let mut rules = self.rules.lock().expect("catalog lock");
		if let Some(row) = rules.get_mut(&update.rule) {
			if let Some(state) = update.state {
				row.state = state;
			}
			if let Some(error) = &update.error {
				row.error = error.clone();
			}
		}

		Ok(())
	}
}

/// In-memory configuration cache with a named-expression registry.
#[derive(Default)]
pub struct MemCache {
	items: Mutex<HashMap<RuleId, ItemMeta>>,
	named: Mutex<HashMap<String, Vec<Arc<Regex>>>>,
	diffs: Mutex<Vec<Vec<ItemDiff>>>,
}

impl MemCache {
	pub fn put_item(&self, meta: ItemMeta) {
		self.items.lock().expect("cache lock").insert(meta.item, meta);
	}

	pub fn put_named(&self, name: &str, patterns: &[&str]) {
		let refs = patterns
			.iter()
			.map(|p| Arc::new(Regex::new(p).expect("test pattern compiles")))
			.collect();
		self.named.lock().expect("cache lock").insert(name.to_owned(), refs);
	}

	pub fn diffs(&self) -> Vec<Vec<ItemDiff>> {
		self.diffs.lock().expect("cache lock").clone()
	}
}

impl ConfigCache for MemCache {
	fn item(&self, rule: RuleId) -> Option<ItemMeta> {
		self.items.lock().expect("cache lock").get(&rule).cloned()
	}

	fn named_expressions(&self, name: &str) -> Vec<Arc<Regex>> {
		self.named
			.lock()
			.expect("cache lock")
			.get(name)
			.cloned()
			.unwrap_or_default()
	}

	fn apply_diff(&self, diffs: Vec<ItemDiff>) {
		self.diffs.lock().expect("cache lock").push(diffs);
	}
}

/// In-memory event bus counting its pipeline calls.
#[derive(Default)]
pub struct MemBus {
	events: Mutex<Vec<StateEvent>>,
	processed: AtomicUsize,
	cleaned: AtomicUsize,
}

impl MemBus {
	pub fn events(&self) -> Vec<StateEvent> {
		self.events.lock().expect("bus lock").clone()
	}

	pub fn processed(&self) -> usize {
		self.processed.load(Ordering::SeqCst)
	}

	pub fn cleaned(&self) -> usize {
		self.cleaned.load(Ordering::SeqCst)
	}
}

impl EventBus for MemBus {
	fn emit(&self, event: StateEvent) {
		self.events.lock().expect("bus lock").push(event);
	}

	fn process(&self) {
		self.processed.fetch_add(1, Ordering::SeqCst);
	}

	fn clean(&self) {
		self.cleaned.fetch_add(1, Ordering::SeqCst);
	}
}

/// Shared call log of the recording reconcilers: (name, surviving rows).
pub type CallLog = Arc<Mutex<Vec<(String, usize)>>>;

pub fn calls(log: &CallLog) -> Vec<(String, usize)> {
	log.lock().expect("log lock").clone()
}

/// A reconciler that records its invocation, optionally reporting a
/// vanished parent host.
pub struct Recorder {
	name: &'static str,
	log: CallLog,
	host_gone: bool,
}

impl Recorder {
	pub fn new(name: &'static str, log: &CallLog) -> Box<Self> {
		Box::new(Self {
			name,
			log: Arc::clone(log),
			host_gone: false,
		})
	}

	pub fn host_gone(name: &'static str, log: &CallLog) -> Box<Self> {
		Box::new(Self {
			name,
			log: Arc::clone(log),
			host_gone: true,
		})
	}
}

impl Reconciler for Recorder {
	fn name(&self) -> &'static str {
		self.name
	}

	fn reconcile(
		&self,
		_rule: &Rule,
		rows: &mut [Row<'_>],
		_now: Timestamp,
	) -> Result<(), ReconcileError> {
		self.log
			.lock()
			.expect("log lock")
			.push((self.name.to_owned(), rows.len()));

		if self.host_gone {
			return Err(ReconcileError::HostGone);
		}
		Ok(())
	}
}

/// A reconciler that snapshots each surviving row's subtree, in order.
pub struct Snapshot {
	pub seen: Arc<Mutex<Vec<String>>>,
}

impl Snapshot {
	pub fn new(seen: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
		Box::new(Self {
			seen: Arc::clone(seen),
		})
	}
}

impl Reconciler for Snapshot {
	fn name(&self) -> &'static str {
		"snapshot"
	}

	fn reconcile(
		&self,
		_rule: &Rule,
		rows: &mut [Row<'_>],
		_now: Timestamp,
	) -> Result<(), ReconcileError> {
		let mut seen = self.seen.lock().expect("seen lock");
		for row in rows {
			seen.push(row.data().to_string());
		}
		Ok(())
	}
}

/// The collaborator fakes of one test, plus the processor constructor.
pub struct World {
	pub catalog: Arc<MemCatalog>,
	pub cache: Arc<MemCache>,
	pub bus: Arc<MemBus>,
}

impl World {
	pub fn processor(&self) -> Processor {
		Processor::new(
			self.catalog.clone(),
			self.cache.clone(),
			self.bus.clone(),
			Arc::new(NoopSubstitutor),
		)
	}
}

pub fn world() -> World {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init()
		.ok();

	World {
		catalog: Arc::new(MemCatalog::default()),
		cache: Arc::new(MemCache::default()),
		bus: Arc::new(MemBus::default()),
	}
}

pub fn rule_row(rule: RuleId, evaltype: EvalType, formula: &str) -> RuleRow {
	RuleRow {
		rule,
		host: 10,
		key: "net.if.discovery".into(),
		state: RuleState::Normal,
		evaltype,
		formula: formula.into(),
		error: String::new(),
		lifetime: "30d".into(),
	}
}

pub fn cond_row(id: u64, lld_macro: &str, pattern: &str) -> ConditionRow {
	ConditionRow {
		id,
		lld_macro: lld_macro.into(),
		pattern: pattern.into(),
		op: Op::RegexpMatch,
	}
}

pub fn path_row(lld_macro: &str, path: &str) -> MacroPathRow {
	MacroPathRow {
		lld_macro: lld_macro.into(),
		path: path.into(),
	}
}
