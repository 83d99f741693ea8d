//! Target-centric analysis: one target number, the people whose contact lists
//! hold it, its own contacts, and the links between those people.

use log::{info, warn};
use serde_json::{Map, Value};

use super::{AdapterContext, Adapted, first_key, object, required_array};
use crate::error::{Error, Result};
use crate::graph::color::{Color, ColorAssigner, ColorKey};
use crate::graph::ident::IdentityCodec;
use crate::graph::types::{Edge, Node, NodeCategory, RelationType, StrengthTier};

const SHAPE: &str = "target";

/// Node fields consumed structurally; everything else lands in `detail`.
const NODE_FIELDS: &[&str] = &["id", "label", "type", "size"];

pub fn adapt(payload: &Value, ctx: &mut AdapterContext<'_>) -> Result<Adapted> {
	let nodes = required_array(payload, SHAPE, "nodes")?;
	let edges = required_array(payload, SHAPE, "edges")?;
	let mut out = Adapted::default();

	for record in nodes {
		match node(record, ctx) {
			Ok(n) => out.delta.nodes.push(n),
			Err(err) => {
				warn!("{SHAPE}: skipping node: {err}");
				out.rejected.push(err);
			}
		}
	}
	for record in edges {
		match edge(record) {
			Ok(e) => out.delta.edges.push(e),
			Err(err) => {
				warn!("{SHAPE}: skipping edge: {err}");
				out.rejected.push(err);
			}
		}
	}

	out.empty = out.delta.nodes.len() <= 1;
	info!(
		"{SHAPE}: {} nodes, {} edges, {} skipped{}",
		out.delta.nodes.len(),
		out.delta.edges.len(),
		out.rejected.len(),
		if out.empty { " (no relationships)" } else { "" }
	);
	Ok(out)
}

fn node(record: &Value, ctx: &mut AdapterContext<'_>) -> Result<Node> {
	let record = object(record, "node")?;
	let category = record
		.get("type")
		.and_then(Value::as_str)
		.map(NodeCategory::from_tag)
		.unwrap_or_default();
	let id = IdentityCodec::node_id(record, category)?;
	let label = first_key(record, &["label", "name"]).unwrap_or_else(|| id.clone());
	let size = record.get("size").and_then(Value::as_f64).unwrap_or(0.0);

	let mut node = Node::new(id, label, category)
		.with_size(size)
		.with_color(ctx.colors.color_for(ColorKey::Category(category)));
	node.detail.extend(extra_fields(record));
	Ok(node)
}

fn extra_fields(record: &Map<String, Value>) -> impl Iterator<Item = (String, Value)> + '_ {
	record
		.iter()
		.filter(|(k, _)| !NODE_FIELDS.contains(&k.as_str()))
		.map(|(k, v)| (k.clone(), v.clone()))
}

fn edge(record: &Value) -> Result<Edge> {
	let record = object(record, "edge")?;
	let from = first_key(record, &["from", "source"])
		.ok_or_else(|| Error::invalid("edge", "missing `from`"))?;
	let to = first_key(record, &["to", "target"])
		.ok_or_else(|| Error::invalid("edge", "missing `to`"))?;
	let tag = record.get("type").and_then(Value::as_str);
	let relation = tag.map(RelationType::from_tag).unwrap_or(RelationType::Contact);
	let label = record.get("label").and_then(Value::as_str).unwrap_or_default();

	let edge = Edge::new(from, to, relation).with_label(label);
	if !tag.is_some_and(is_styled_tag) {
		return Ok(edge.with_style(Color::hex(0x64748b), 1.5, false));
	}
	Ok(match relation {
		RelationType::Common => {
			// Zero reads as unset.
			let strength = record
				.get("strength")
				.and_then(Value::as_f64)
				.filter(|s| *s != 0.0)
				.unwrap_or(1.0);
			let tier = StrengthTier::for_common_strength(strength);
			let color = ColorAssigner::fixed(ColorKey::Strength(tier)).unwrap_or(edge.color);
			edge.with_weight(strength)
				.with_style(color, 1.0 + strength, true)
				.with_detail("strength", strength)
		}
		_ => edge,
	})
}

/// Tags with a dedicated edge style. Any other tag, or none, draws plain gray.
fn is_styled_tag(tag: &str) -> bool {
	matches!(tag.to_ascii_lowercase().as_str(), "contact" | "knows" | "common")
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn run(payload: Value) -> Result<Adapted> {
		let mut colors = ColorAssigner::default();
		let mut codec = IdentityCodec::new();
		adapt(
			&payload,
			&mut AdapterContext {
				colors: &mut colors,
				codec: &mut codec,
			},
		)
	}

	#[test]
	fn target_and_person_with_knows_edge() {
		let adapted = run(json!({
			"nodes": [{"id": "T", "type": "Target"}, {"id": "P1", "type": "Person"}],
			"edges": [{"from": "T", "to": "P1", "type": "knows"}]
		}))
		.unwrap();

		assert_eq!(adapted.delta.nodes.len(), 2);
		assert_eq!(adapted.delta.edges.len(), 1);
		let target = &adapted.delta.nodes[0];
		assert_eq!(target.category, NodeCategory::Target);
		assert_eq!(target.color, Color::hex(0xef4444));
		assert_eq!(target.size, 40.0);
		assert_eq!(adapted.delta.edges[0].relation, RelationType::Knows);
		assert!(!adapted.empty);
	}

	#[test]
	fn common_edges_scale_with_strength() {
		let adapted = run(json!({
			"nodes": [{"id": "person_A", "type": "Person"}, {"id": "person_B", "type": "Person"}],
			"edges": [
				{"from": "person_A", "to": "person_B", "type": "common", "strength": 4},
				{"from": "person_B", "to": "person_A", "type": "common", "strength": 2, "label": "2个共同联系人"}
			]
		}))
		.unwrap();

		let strong = &adapted.delta.edges[0];
		assert_eq!(strong.width, 5.0);
		assert!(strong.dashed);
		assert_eq!(strong.color, Color::hex(0xef4444));

		let weak = &adapted.delta.edges[1];
		assert_eq!(weak.width, 3.0);
		assert_eq!(weak.color, Color::hex(0xf97316));
		assert_eq!(weak.label, "2个共同联系人");
		assert_eq!(strong.id, weak.id);
	}

	#[test]
	fn zero_strength_reads_as_one() {
		let adapted = run(json!({
			"nodes": [{"id": "person_A", "type": "Person"}, {"id": "person_B", "type": "Person"}],
			"edges": [{"from": "person_A", "to": "person_B", "type": "common", "strength": 0}]
		}))
		.unwrap();
		let edge = &adapted.delta.edges[0];
		assert_eq!(edge.width, 2.0);
		assert_eq!(edge.weight, 1.0);
		assert_eq!(edge.color, Color::hex(0xf97316));
	}

	#[test]
	fn unstyled_tags_draw_plain_gray() {
		let adapted = run(json!({
			"nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
			"edges": [
				{"from": "A", "to": "B", "type": "CALL"},
				{"from": "B", "to": "C"},
				{"from": "A", "to": "C", "type": "contact"}
			]
		}))
		.unwrap();
		for edge in &adapted.delta.edges[..2] {
			assert_eq!(edge.color, Color::hex(0x64748b));
			assert_eq!(edge.width, 1.5);
			assert!(!edge.dashed);
		}
		let contact = &adapted.delta.edges[2];
		assert_eq!(contact.color, Color::hex(0x22c55e));
		assert_eq!(contact.width, 2.0);
	}

	#[test]
	fn extra_fields_become_detail() {
		let adapted = run(json!({
			"nodes": [
				{"id": "target_139", "label": "王五", "type": "Target", "number": "139", "size": 44},
				{"id": "phone_1", "type": "Phone"}
			],
			"edges": []
		}))
		.unwrap();
		let target = &adapted.delta.nodes[0];
		assert_eq!(target.label, "王五");
		assert_eq!(target.size, 44.0);
		assert_eq!(target.detail.get("number"), Some(&json!("139")));
		assert!(!target.detail.contains_key("label"));
	}

	#[test]
	fn single_node_is_empty_not_error() {
		let adapted = run(json!({"nodes": [{"id": "target_1", "type": "Target"}], "edges": []}))
			.unwrap();
		assert!(adapted.empty);
		assert_eq!(adapted.delta.nodes.len(), 1);
	}

	#[test]
	fn bad_records_are_skipped() {
		let adapted = run(json!({
			"nodes": [{"label": "no id"}, 42, {"id": "a"}],
			"edges": [{"from": "a"}]
		}))
		.unwrap();
		assert_eq!(adapted.delta.nodes.len(), 1);
		assert_eq!(adapted.rejected.len(), 3);
		assert!(adapted.rejected.iter().all(Error::is_recoverable));
	}

	#[test]
	fn missing_edges_array_is_malformed() {
		let err = run(json!({"nodes": []})).unwrap_err();
		assert!(matches!(err, Error::MalformedResult { field: "edges", .. }));
	}
}
