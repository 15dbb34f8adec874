use serde_json::Value;

/// A link between an item prototype and the item discovered from it.
///
/// Links are owned by the row they were discovered on. The item reconciler
/// populates them; the trigger and graph reconcilers look them up to attach
/// derived entities to the right item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLink {
	/// Identifier of the item prototype under the discovery rule.
	pub prototype_id: u64,

	/// Identifier of the discovered item.
	pub item_id: u64,
}

/// One candidate entity: a single object element of the discovery payload.
///
/// Rows borrow their subtree from the parsed payload, which must outlive the
/// row set; the pipeline keeps the parsed document on the orchestrator frame
/// below every row-consuming stage.
#[derive(Debug)]
pub struct Row<'a> {
	data: &'a Value,
	links: Vec<ItemLink>,
}

impl<'a> Row<'a> {
	/// Wraps a payload element. `None` when the element is not an object.
	#[must_use]
	pub fn from_value(data: &'a Value) -> Option<Self> {
		data.is_object().then(|| Self {
			data,
			links: Vec::new(),
		})
	}

	/// The row's subtree in the parsed payload.
	#[must_use]
	pub fn data(&self) -> &'a Value {
		self.data
	}

	/// Direct field lookup by name.
	#[must_use]
	pub fn field(&self, name: &str) -> Option<&'a Value> {
		self.data.as_object().and_then(|obj| obj.get(name))
	}

	/// Records a prototype-to-item link, keeping the list sorted by prototype.
	///
	/// Linking the same prototype twice keeps the latest item.
	pub fn link(&mut self, link: ItemLink) {
		match self
			.links
			.binary_search_by_key(&link.prototype_id, |l| l.prototype_id)
		{
			Ok(pos) => self.links[pos] = link,
			Err(pos) => self.links.insert(pos, link),
		}
	}

	/// Finds the discovered item linked to a prototype.
	#[must_use]
	pub fn link_for(&self, prototype_id: u64) -> Option<ItemLink> {
		self.links
			.binary_search_by_key(&prototype_id, |l| l.prototype_id)
			.ok()
			.map(|pos| self.links[pos])
	}

	/// All links recorded on this row, sorted by prototype.
	#[must_use]
	pub fn links(&self) -> &[ItemLink] {
		&self.links
	}
}

/// Canonical text projection of a JSON value: strings verbatim, everything
/// else in compact serialized form.
#[must_use]
pub fn value_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
