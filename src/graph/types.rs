//! Domain types shared by the store, the adapters and the highlight engine.

use std::collections::BTreeMap;

use serde_json::Value;

use super::color::{Color, ColorAssigner, ColorKey};
use super::ident::IdentityCodec;

/// Free-form inspection fields attached to a node or edge.
pub type Detail = BTreeMap<String, Value>;

/// Closed set of node categories. Wire tags are a contract with the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	Phone,
	WeChat,
	Person,
	Target,
	#[default]
	Unknown,
}

impl NodeCategory {
	/// Parses a backend type tag. Unrecognized tags become [`NodeCategory::Unknown`].
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"Phone" => Self::Phone,
			"WeChat" => Self::WeChat,
			"Person" => Self::Person,
			"Target" => Self::Target,
			_ => Self::Unknown,
		}
	}

	pub fn default_size(self) -> f64 {
		match self {
			Self::Target => 40.0,
			Self::Person => 30.0,
			Self::Phone | Self::WeChat => 20.0,
			Self::Unknown => 25.0,
		}
	}

	/// Prefix used when an id has to be synthesized from a display name.
	pub fn id_prefix(self) -> &'static str {
		match self {
			Self::Phone => "phone",
			Self::WeChat => "wechat",
			Self::Person => "person",
			Self::Target => "target",
			Self::Unknown => "node",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationType {
	Contact,
	Knows,
	Common,
	HasContact,
	Inferred,
}

impl RelationType {
	/// Parses a relationship tag from any of the backend result shapes.
	///
	/// Call and friendship records from network expansion have no dedicated
	/// variant and read as [`RelationType::Contact`].
	pub fn from_tag(tag: &str) -> Self {
		match tag.to_ascii_lowercase().replace('_', "-").as_str() {
			"knows" => Self::Knows,
			"common" => Self::Common,
			"has-contact" => Self::HasContact,
			"inferred" => Self::Inferred,
			_ => Self::Contact,
		}
	}
}

/// Three-tier relation strength, tagged `强`/`中`/`弱` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrengthTier {
	Strong,
	Medium,
	Weak,
}

impl StrengthTier {
	/// Shared-contact count from which a common edge reads as strong.
	pub const COMMON_STRONG_THRESHOLD: f64 = 3.0;

	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim() {
			"强" => Some(Self::Strong),
			"中" => Some(Self::Medium),
			"弱" => Some(Self::Weak),
			_ => None,
		}
	}

	pub fn for_common_strength(strength: f64) -> Self {
		if strength >= Self::COMMON_STRONG_THRESHOLD {
			Self::Strong
		} else {
			Self::Medium
		}
	}

	pub fn width(self) -> f64 {
		match self {
			Self::Strong => 4.0,
			Self::Medium => 2.5,
			Self::Weak => 1.5,
		}
	}
}

/// A node of the relationship graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique within a store and never reassigned.
	pub id: String,
	pub label: String,
	pub category: NodeCategory,
	pub size: f64,
	/// Domain color. Highlighting overrides it at style time only.
	pub color: Color,
	pub detail: Detail,
}

impl Node {
	/// A node with the category's default size and fixed color.
	pub fn new(id: impl Into<String>, label: impl Into<String>, category: NodeCategory) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			category,
			size: category.default_size(),
			color: ColorAssigner::fixed(ColorKey::Category(category))
				.unwrap_or(Color::hex(0x64ffda)),
			detail: Detail::new(),
		}
	}

	pub fn with_size(mut self, size: f64) -> Self {
		if size > 0.0 && size.is_finite() {
			self.size = size;
		}
		self
	}

	pub fn with_color(mut self, color: Color) -> Self {
		self.color = color;
		self
	}

	pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.detail.insert(key.into(), value.into());
		self
	}
}

/// A relationship between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: String,
	pub from: String,
	pub to: String,
	pub relation: RelationType,
	pub weight: f64,
	pub label: String,
	pub color: Color,
	pub width: f64,
	pub dashed: bool,
	pub detail: Detail,
}

impl Edge {
	/// An edge colored and sized for its relation type, keyed by the
	/// canonical unordered id of its endpoints.
	pub fn new(from: impl Into<String>, to: impl Into<String>, relation: RelationType) -> Self {
		let (from, to) = (from.into(), to.into());
		Self::parallel(IdentityCodec::edge_id(&from, &to), from, to, relation)
	}

	/// Like [`Edge::new`] with a caller-issued id, for one of several edges
	/// between the same pair. The id should come from
	/// [`IdentityCodec::parallel_edge_id`].
	pub fn parallel(
		id: impl Into<String>,
		from: impl Into<String>,
		to: impl Into<String>,
		relation: RelationType,
	) -> Self {
		let (width, dashed) = match relation {
			RelationType::Contact => (2.0, false),
			RelationType::Common => (2.0, true),
			RelationType::Inferred => (StrengthTier::Weak.width(), true),
			RelationType::Knows | RelationType::HasContact => (1.5, false),
		};
		Self {
			id: id.into(),
			from: from.into(),
			to: to.into(),
			relation,
			weight: 1.0,
			label: String::new(),
			color: ColorAssigner::fixed(ColorKey::Relation(relation))
				.unwrap_or(Color::hex(0x64748b)),
			width,
			dashed,
			detail: Detail::new(),
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = weight;
		self
	}

	pub fn with_style(mut self, color: Color, width: f64, dashed: bool) -> Self {
		self.color = color;
		self.width = width;
		self.dashed = dashed;
		self
	}

	pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.detail.insert(key.into(), value.into());
		self
	}

	/// True when `id` is one of the two endpoints.
	pub fn touches(&self, id: &str) -> bool {
		self.from == id || self.to == id
	}
}

/// Canonical adapter output: nodes precede the edges that reference them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delta {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Delta {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// Read-only copy of a store's contents, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
}

impl Snapshot {
	pub(crate) fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self { nodes, edges }
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
