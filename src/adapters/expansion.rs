//! Breadth-limited network expansion around one identifier.
//!
//! Two payload forms exist. The flat form carries `nodes` and `relationships`,
//! with endpoints spelled either `source`/`target` or `from`/`to`. The grouped
//! form is what the expansion endpoint returns directly: a `target` and a
//! `network` object mapping each degree to the contacts found at that distance.

use log::{info, warn};
use serde_json::{Map, Value};

use super::{AdapterContext, Adapted, first_key, object, required_array};
use crate::error::{Error, Result};
use crate::graph::color::ColorKey;
use crate::graph::ident::IdentityCodec;
use crate::graph::types::{Edge, Node, NodeCategory, RelationType};

const SHAPE: &str = "expansion";

/// Adapts either payload form. Nodes without a `type` take `default_category`.
///
/// An expansion with no usable nodes is reported as [`Adapted::empty`] so the
/// caller can fall back to another source.
pub fn adapt(
	payload: &Value,
	default_category: NodeCategory,
	ctx: &mut AdapterContext<'_>,
) -> Result<Adapted> {
	let mut out = if payload.get("nodes").is_none() && payload.get("network").is_some() {
		grouped(payload, default_category, ctx)?
	} else {
		flat(payload, default_category, ctx)?
	};
	out.empty = out.delta.nodes.is_empty();
	info!(
		"{SHAPE}: {} nodes, {} edges, {} skipped{}",
		out.delta.nodes.len(),
		out.delta.edges.len(),
		out.rejected.len(),
		if out.empty { " (empty expansion)" } else { "" }
	);
	Ok(out)
}

fn flat(payload: &Value, default_category: NodeCategory, ctx: &mut AdapterContext<'_>) -> Result<Adapted> {
	let nodes = required_array(payload, SHAPE, "nodes")?;
	let relationships = required_array(payload, SHAPE, "relationships")?;
	let mut out = Adapted::default();

	for record in nodes {
		match object(record, "node").and_then(|r| node(r, default_category, ctx)) {
			Ok(n) => out.delta.nodes.push(n),
			Err(err) => {
				warn!("{SHAPE}: skipping node: {err}");
				out.rejected.push(err);
			}
		}
	}
	for record in relationships {
		match object(record, "relationship").and_then(relationship) {
			Ok(e) => out.delta.edges.push(e),
			Err(err) => {
				warn!("{SHAPE}: skipping relationship: {err}");
				out.rejected.push(err);
			}
		}
	}
	Ok(out)
}

fn category_of(record: &Map<String, Value>, default_category: NodeCategory) -> NodeCategory {
	record
		.get("type")
		.and_then(Value::as_str)
		.map(NodeCategory::from_tag)
		.unwrap_or(default_category)
}

fn node(
	record: &Map<String, Value>,
	default_category: NodeCategory,
	ctx: &mut AdapterContext<'_>,
) -> Result<Node> {
	let category = category_of(record, default_category);
	let id = IdentityCodec::node_id(record, category)?;
	let mut node = Node::new(&id, &id, category)
		.with_color(ctx.colors.color_for(ColorKey::Category(category)));
	node.detail.extend(
		record
			.iter()
			.filter(|(k, _)| k.as_str() != "type")
			.map(|(k, v)| (k.clone(), v.clone())),
	);
	Ok(node)
}

fn relationship(record: &Map<String, Value>) -> Result<Edge> {
	let from = first_key(record, &["source", "from"])
		.ok_or_else(|| Error::invalid("relationship", "missing `source`/`from`"))?;
	let to = first_key(record, &["target", "to"])
		.ok_or_else(|| Error::invalid("relationship", "missing `target`/`to`"))?;
	let tag = record.get("type").and_then(Value::as_str).unwrap_or_default();

	let mut edge = Edge::new(from, to, RelationType::from_tag(tag)).with_label(tag);
	if let Some(count) = record.get("count").filter(|v| !v.is_null()) {
		edge.weight = count.as_f64().unwrap_or(1.0);
		edge.detail.insert("count".into(), count.clone());
	}
	if let Some(duration) = record.get("total_duration").filter(|v| !v.is_null()) {
		edge.detail.insert("duration".into(), duration.clone());
	}
	Ok(edge)
}

fn grouped(payload: &Value, default_category: NodeCategory, ctx: &mut AdapterContext<'_>) -> Result<Adapted> {
	let target = first_key(
		payload.as_object().ok_or(Error::MalformedResult {
			shape: SHAPE,
			field: "target",
		})?,
		&["target"],
	)
	.ok_or(Error::MalformedResult {
		shape: SHAPE,
		field: "target",
	})?;
	let network = payload
		.get("network")
		.and_then(Value::as_object)
		.ok_or(Error::MalformedResult {
			shape: SHAPE,
			field: "network",
		})?;

	let mut out = Adapted::default();
	out.delta.nodes.push(
		Node::new(&target, &target, default_category)
			.with_color(ctx.colors.color_for(ColorKey::Category(default_category)))
			.with_detail("degree", 0),
	);

	let mut degrees: Vec<(u64, &Value)> = Vec::with_capacity(network.len());
	for (key, contacts) in network {
		match key.trim().parse::<u64>() {
			Ok(degree) => degrees.push((degree, contacts)),
			Err(_) => out.rejected.push(Error::invalid("degree", format!("`{key}` is not a number"))),
		}
	}
	degrees.sort_by_key(|(degree, _)| *degree);

	for (degree, contacts) in degrees {
		for record in contacts.as_array().map(Vec::as_slice).unwrap_or_default() {
			let staged = object(record, "contact").and_then(|r| node(r, default_category, ctx));
			let mut contact = match staged {
				Ok(n) if n.id == target => continue,
				Ok(n) => n,
				Err(err) => {
					warn!("{SHAPE}: skipping contact: {err}");
					out.rejected.push(err);
					continue;
				}
			};
			contact.detail.insert("degree".into(), degree.into());
			if degree == 1 {
				let paths = contact.detail.get("path_count").and_then(Value::as_f64);
				out.delta.edges.push(
					Edge::new(&target, &contact.id, RelationType::Contact)
						.with_weight(paths.unwrap_or(1.0)),
				);
			}
			out.delta.nodes.push(contact);
		}
	}
	Ok(out)
}
