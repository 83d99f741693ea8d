//! Stable identifiers for nodes and edges.
//!
//! Backend records name the same thing through different fields depending on
//! which analysis produced them. Node ids resolve through one fixed table so the
//! precedence is the same everywhere; edge ids are canonical per unordered pair
//! unless a caller asks for a parallel edge.

use serde_json::{Map, Value};

use super::types::NodeCategory;
use crate::error::{Error, Result};

/// Fields tried in order for a record's natural key.
pub const KEY_FIELDS: &[&str] = &["id", "number", "wxid", "contact_id"];

/// Field used when a record carries only a display name.
pub const NAME_FIELD: &str = "name";

/// Derives node and edge identifiers.
///
/// Node ids are pure functions of their input. The codec only holds the
/// discriminator counter handed out to parallel edges.
#[derive(Clone, Debug, Default)]
pub struct IdentityCodec {
	next_discriminator: u64,
}

impl IdentityCodec {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves a raw record's node id.
	///
	/// The first non-empty field of [`KEY_FIELDS`] wins. Records with none of
	/// them fall back to `"<prefix>_<name>"`, the prefix coming from `declared`.
	pub fn node_id(record: &Map<String, Value>, declared: NodeCategory) -> Result<String> {
		if let Some(key) = KEY_FIELDS.iter().find_map(|f| scalar(record.get(*f))) {
			return Ok(key);
		}
		match scalar(record.get(NAME_FIELD)) {
			Some(name) => Ok(format!("{}_{}", declared.id_prefix(), name)),
			None => Err(Error::invalid(
				"node",
				format!("none of {KEY_FIELDS:?} or `{NAME_FIELD}` is set"),
			)),
		}
	}

	/// Id of the pseudo-node standing for a named person.
	pub fn person_id(name: &str) -> Result<String> {
		prefixed(NodeCategory::Person, name)
	}

	/// Id of the node standing for a phone number.
	pub fn phone_id(number: &str) -> Result<String> {
		prefixed(NodeCategory::Phone, number)
	}

	/// Canonical id of the relationship between `a` and `b`, whatever the
	/// declared direction.
	pub fn edge_id(a: &str, b: &str) -> String {
		let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
		format!("{}:{lo}~{hi}", lo.len())
	}

	/// A fresh id for one of several parallel edges between `a` and `b`.
	pub fn parallel_edge_id(&mut self, a: &str, b: &str, role: &str) -> String {
		let n = self.next_discriminator;
		self.next_discriminator += 1;
		format!("{}/{role}#{n}", Self::edge_id(a, b))
	}
}

fn prefixed(category: NodeCategory, key: &str) -> Result<String> {
	let key = key.trim();
	if key.is_empty() {
		return Err(Error::invalid(category.id_prefix(), "empty key"));
	}
	Ok(format!("{}_{}", category.id_prefix(), key))
}

/// Non-empty string or number value as an owned key.
pub(crate) fn scalar(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}
