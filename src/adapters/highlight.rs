//! Path and community results. These carry no graph data of their own; they
//! name nodes already on screen for the highlight engine.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{first_key, object};
use crate::error::{Error, Result};
use crate::graph::ident::scalar;

/// Ordered node ids of a shortest-path result, read from `path_nodes` or `path`.
///
/// Entries may be bare ids or node records; records resolve through their `id`.
pub fn path_nodes(payload: &Value) -> Result<Vec<String>> {
	let entries = ["path_nodes", "path"]
		.iter()
		.find_map(|f| payload.get(*f).and_then(Value::as_array))
		.ok_or(Error::MalformedResult {
			shape: "path",
			field: "path_nodes",
		})?;
	entries.iter().map(|e| entry_id(e, "path node")).collect()
}

/// Member sets of a community-detection result, one per `communities[]` item.
pub fn communities(payload: &Value) -> Result<Vec<BTreeSet<String>>> {
	let groups = payload
		.get("communities")
		.and_then(Value::as_array)
		.ok_or(Error::MalformedResult {
			shape: "communities",
			field: "communities",
		})?;
	groups
		.iter()
		.map(|group| {
			let members = object(group, "community")?
				.get("members")
				.and_then(Value::as_array)
				.ok_or_else(|| Error::invalid("community", "missing `members`"))?;
			members.iter().map(|m| entry_id(m, "community member")).collect()
		})
		.collect()
}

fn entry_id(entry: &Value, kind: &'static str) -> Result<String> {
	let id = match entry {
		Value::Object(record) => first_key(record, &["id", "number", "wxid"]),
		other => scalar(Some(other)),
	};
	id.ok_or_else(|| Error::invalid(kind, "no usable id"))
}
