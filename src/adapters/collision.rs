//! Pairwise collision analysis across every imported contact list.
//!
//! The backend reports three independent tables: person pairs sharing
//! contacts, numbers present in several people's lists ("hot" numbers), and
//! inferred person-to-person relations with a strength tier. Persons carry no
//! backend id, so they become `person_<name>` pseudo-nodes.

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{AdapterContext, Adapted, decode, required_array};
use crate::error::{Error, Result};
use crate::graph::color::{ColorAssigner, ColorKey};
use crate::graph::ident::IdentityCodec;
use crate::graph::types::{Edge, Node, NodeCategory, RelationType, StrengthTier};

const SHAPE: &str = "collision";

/// Size of every person node.
pub const PERSON_SIZE: f64 = 30.0;
/// Size of a hot number before its owners are counted.
pub const HOT_NUMBER_BASE_SIZE: f64 = 15.0;
/// Size added per owner of a hot number. Uncapped.
pub const HOT_NUMBER_SIZE_PER_OWNER: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct CommonContact {
	person1: String,
	person2: String,
	#[serde(default)]
	common_phones: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HotNumber {
	number: String,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	owner_count: Option<u64>,
	#[serde(default)]
	owners: Vec<String>,
}

impl HotNumber {
	fn owner_count(&self) -> u64 {
		self.owner_count.unwrap_or(self.owners.len() as u64)
	}

	fn size(&self) -> f64 {
		HOT_NUMBER_BASE_SIZE + self.owner_count() as f64 * HOT_NUMBER_SIZE_PER_OWNER
	}
}

#[derive(Debug, Deserialize)]
struct PersonRelation {
	person1: String,
	person2: String,
	#[serde(default)]
	shared_contacts: u64,
	#[serde(default)]
	relation_strength: String,
}

/// Names in first-seen order, without duplicates or blanks.
#[derive(Default)]
struct Persons {
	order: Vec<String>,
	seen: HashSet<String>,
}

impl Persons {
	fn insert(&mut self, name: &str) {
		let name = name.trim();
		if !name.is_empty() && self.seen.insert(name.to_string()) {
			self.order.push(name.to_string());
		}
	}
}

pub fn adapt(payload: &Value, ctx: &mut AdapterContext<'_>) -> Result<Adapted> {
	let common_raw = required_array(payload, SHAPE, "common_contacts")?;
	let hot_raw = required_array(payload, SHAPE, "hot_numbers")?;
	let relations_raw = required_array(payload, SHAPE, "person_relations")?;
	let mut out = Adapted {
		empty: common_raw.is_empty() && hot_raw.is_empty() && relations_raw.is_empty(),
		..Adapted::default()
	};

	let common: Vec<CommonContact> = decode_all(common_raw, "common contact", &mut out.rejected);
	let hot: Vec<HotNumber> = decode_all(hot_raw, "hot number", &mut out.rejected);
	let relations: Vec<PersonRelation> =
		decode_all(relations_raw, "person relation", &mut out.rejected);

	// Persons first: every edge below hangs off one of them.
	let mut persons = Persons::default();
	for item in &common {
		persons.insert(&item.person1);
		persons.insert(&item.person2);
	}
	for item in &hot {
		item.owners.iter().for_each(|o| persons.insert(o));
	}
	for item in &relations {
		persons.insert(&item.person1);
		persons.insert(&item.person2);
	}
	for name in &persons.order {
		let id = IdentityCodec::person_id(name)?;
		let color = ctx.colors.color_for(ColorKey::Person(name));
		out.delta.nodes.push(
			Node::new(id, name.clone(), NodeCategory::Person)
				.with_size(PERSON_SIZE)
				.with_color(color),
		);
	}
	debug!("{SHAPE}: {} persons", persons.order.len());

	for item in &hot {
		if let Err(err) = hot_number(item, &mut out) {
			warn!("{SHAPE}: skipping hot number: {err}");
			out.rejected.push(err);
		}
	}

	for item in &relations {
		match inferred_edge(item) {
			Ok(edge) => out.delta.edges.push(edge),
			Err(err) => {
				warn!("{SHAPE}: skipping relation: {err}");
				out.rejected.push(err);
			}
		}
	}

	for item in &common {
		let (Ok(a), Ok(b)) = (
			IdentityCodec::person_id(&item.person1),
			IdentityCodec::person_id(&item.person2),
		) else {
			out.rejected.push(Error::invalid("common contact", "blank person name"));
			continue;
		};
		for phone in item.common_phones.iter().filter(|p| !p.trim().is_empty()) {
			let color = ColorAssigner::fixed(ColorKey::Strength(StrengthTier::Medium));
			let id = ctx.codec.parallel_edge_id(&a, &b, "common");
			let mut edge = Edge::parallel(id, &a, &b, RelationType::Common)
				.with_label(phone.as_str())
				.with_detail("phone", phone.as_str());
			if let Some(color) = color {
				edge = edge.with_style(color, 1.0, true);
			}
			out.delta.edges.push(edge);
		}
	}

	info!(
		"{SHAPE}: {} nodes, {} edges, {} skipped{}",
		out.delta.nodes.len(),
		out.delta.edges.len(),
		out.rejected.len(),
		if out.empty { " (no collisions)" } else { "" }
	);
	Ok(out)
}

fn decode_all<T: serde::de::DeserializeOwned>(
	records: &[Value],
	kind: &'static str,
	rejected: &mut Vec<Error>,
) -> Vec<T> {
	records
		.iter()
		.filter_map(|r| match decode(r, kind) {
			Ok(item) => Some(item),
			Err(err) => {
				warn!("{SHAPE}: {err}");
				rejected.push(err);
				None
			}
		})
		.collect()
}

/// Stages the phone node of a hot number and one edge per owner.
fn hot_number(item: &HotNumber, out: &mut Adapted) -> Result<()> {
	let id = IdentityCodec::phone_id(&item.number)?;
	let number = item.number.trim();
	let label = item
		.name
		.as_deref()
		.map(str::trim)
		.filter(|n| !n.is_empty())
		.unwrap_or(number);

	out.delta.nodes.push(
		Node::new(&id, label, NodeCategory::Phone)
			.with_size(item.size())
			.with_detail("number", number)
			.with_detail("owner_count", item.owner_count())
			.with_detail("owners", item.owners.clone()),
	);
	for owner in &item.owners {
		let Ok(person) = IdentityCodec::person_id(owner) else {
			continue;
		};
		out.delta.edges.push(
			Edge::new(person, &id, RelationType::HasContact)
				.with_label("HAS_CONTACT")
				.with_detail("owner", owner.trim()),
		);
	}
	Ok(())
}

fn inferred_edge(item: &PersonRelation) -> Result<Edge> {
	let a = IdentityCodec::person_id(&item.person1)?;
	let b = IdentityCodec::person_id(&item.person2)?;
	let tier = StrengthTier::from_label(&item.relation_strength).unwrap_or(StrengthTier::Weak);
	let color = ColorAssigner::fixed(ColorKey::Strength(tier));
	let edge = Edge::new(a, b, RelationType::Inferred)
		.with_label(format!("{} 个共同联系人", item.shared_contacts))
		.with_weight(item.shared_contacts as f64)
		.with_detail("shared_contacts", item.shared_contacts)
		.with_detail("relation_strength", item.relation_strength.as_str());
	Ok(match color {
		Some(color) => edge.with_style(color, tier.width(), true),
		None => edge,
	})
}
