//! Highlight mode state machine.
//!
//! Exactly one mode is active at a time and entering a mode replaces the
//! previous one outright. Styles are derived from the current mode and an
//! element's id only; stored domain colors are never written.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;

use super::color::{Color, Palette};
use super::port::{DomainStyle, EdgeStyle, NodeStyle, Styler};
use super::store::GraphStore;
use super::types::{Edge, Node};

/// The active visual override.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HighlightState {
	#[default]
	None,
	Path(Vec<String>),
	Community(Vec<BTreeSet<String>>),
	Search {
		query: String,
		matches: BTreeSet<String>,
	},
}

/// Lookup tables derived from the state on each transition.
#[derive(Clone, Debug, Default)]
struct Lookup {
	members: HashSet<String>,
	/// Unordered consecutive pairs of a path, smaller id first.
	steps: HashSet<(String, String)>,
	/// Every community listing a node, in ascending order.
	community_of: HashMap<String, Vec<usize>>,
}

fn ordered(a: &str, b: &str) -> (String, String) {
	if a <= b {
		(a.to_string(), b.to_string())
	} else {
		(b.to_string(), a.to_string())
	}
}

/// Computes per-node and per-edge overrides for the active highlight mode.
#[derive(Clone, Debug)]
pub struct HighlightEngine {
	state: HighlightState,
	lookup: Lookup,
	path_accent: Color,
	search_accent: Color,
	communities: Palette,
}

impl HighlightEngine {
	pub fn new(path_accent: Color, search_accent: Color, communities: Palette) -> Self {
		Self {
			state: HighlightState::None,
			lookup: Lookup::default(),
			path_accent,
			search_accent,
			communities,
		}
	}

	pub fn state(&self) -> &HighlightState {
		&self.state
	}

	/// Highlights an ordered path of node ids.
	pub fn enter_path(&mut self, node_ids: Vec<String>) {
		let mut lookup = Lookup {
			members: node_ids.iter().cloned().collect(),
			..Lookup::default()
		};
		lookup.steps = node_ids
			.windows(2)
			.map(|pair| ordered(&pair[0], &pair[1]))
			.collect();
		debug!("highlight: path of {} nodes", node_ids.len());
		self.transition(HighlightState::Path(node_ids), lookup);
	}

	/// Colors each set with its own palette entry.
	///
	/// A node listed in several sets takes the color of the last one. An edge
	/// takes the color of the last set holding both of its endpoints.
	pub fn enter_community(&mut self, sets: Vec<BTreeSet<String>>) {
		let mut lookup = Lookup::default();
		for (index, set) in sets.iter().enumerate() {
			for id in set {
				lookup.community_of.entry(id.clone()).or_default().push(index);
			}
		}
		debug!("highlight: {} communities", sets.len());
		self.transition(HighlightState::Community(sets), lookup);
	}

	/// Marks nodes whose id or label contains `query`, ignoring case.
	///
	/// Returns the match count. A blank query resets to no highlight.
	pub fn enter_search(&mut self, query: &str, store: &GraphStore) -> usize {
		let query = query.trim();
		if query.is_empty() {
			self.reset();
			return 0;
		}
		let needle = query.to_lowercase();
		let matches: BTreeSet<String> = store
			.find(|n| {
				n.id.to_lowercase().contains(&needle) || n.label.to_lowercase().contains(&needle)
			})
			.into_iter()
			.collect();
		let count = matches.len();
		let lookup = Lookup {
			members: matches.iter().cloned().collect(),
			..Lookup::default()
		};
		debug!("highlight: search {query:?} matched {count}");
		self.transition(
			HighlightState::Search {
				query: query.to_string(),
				matches,
			},
			lookup,
		);
		count
	}

	pub fn reset(&mut self) {
		self.transition(HighlightState::None, Lookup::default());
	}

	fn transition(&mut self, state: HighlightState, lookup: Lookup) {
		self.state = state;
		self.lookup = lookup;
	}

	/// Override color for `node_id`, if the active mode sets one.
	pub fn override_for(&self, node_id: &str) -> Option<Color> {
		match &self.state {
			HighlightState::None => None,
			HighlightState::Path(_) => {
				self.lookup.members.contains(node_id).then_some(self.path_accent)
			}
			HighlightState::Search { .. } => {
				self.lookup.members.contains(node_id).then_some(self.search_accent)
			}
			HighlightState::Community(_) => self
				.lookup
				.community_of
				.get(node_id)
				.and_then(|indices| indices.last())
				.map(|&i| self.communities.get(i)),
		}
	}

	fn edge_override(&self, edge: &Edge) -> Option<Color> {
		match &self.state {
			HighlightState::Path(_) => self
				.lookup
				.steps
				.contains(&ordered(&edge.from, &edge.to))
				.then_some(self.path_accent),
			HighlightState::Community(_) => {
				let from = self.lookup.community_of.get(&edge.from)?;
				let to = self.lookup.community_of.get(&edge.to)?;
				let shared = from.iter().rev().find(|i| to.contains(i))?;
				Some(self.communities.get(*shared))
			}
			HighlightState::None | HighlightState::Search { .. } => None,
		}
	}

	pub fn style_for(&self, node: &Node) -> NodeStyle {
		match self.override_for(&node.id) {
			Some(color) => NodeStyle {
				color,
				highlighted: true,
			},
			None => DomainStyle.node_style(node),
		}
	}
}

impl Default for HighlightEngine {
	fn default() -> Self {
		Self::new(Color::hex(0x64ffda), Color::hex(0xf15bb5), Palette::communities())
	}
}

impl Styler for HighlightEngine {
	fn node_style(&self, node: &Node) -> NodeStyle {
		self.style_for(node)
	}

	fn edge_style(&self, edge: &Edge) -> EdgeStyle {
		let base = DomainStyle.edge_style(edge);
		match self.edge_override(edge) {
			Some(color) => EdgeStyle {
				color,
				width: base.width.max(2.5),
				highlighted: true,
				..base
			},
			None => base,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::{NodeCategory, RelationType};

	fn store() -> GraphStore {
		let mut store = GraphStore::new();
		store.add(Node::new("13800000001", "张三", NodeCategory::Phone));
		store.add(Node::new("13800000002", "Li Si", NodeCategory::Phone));
		store.add(Node::new("wx_abc", "老王", NodeCategory::WeChat));
		store
	}

	fn ids(list: &[&str]) -> BTreeSet<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn path_marks_members_and_steps() {
		let store = store();
		let mut engine = HighlightEngine::default();
		engine.enter_path(vec!["13800000001".into(), "wx_abc".into()]);

		let styled = engine.style_for(store.node("wx_abc").unwrap());
		assert!(styled.highlighted);
		assert_eq!(styled.color, Color::hex(0x64ffda));
		let plain = engine.style_for(store.node("13800000002").unwrap());
		assert_eq!(plain.color, store.node("13800000002").unwrap().color);

		let step = Edge::new("wx_abc", "13800000001", RelationType::Contact);
		assert!(engine.edge_style(&step).highlighted);
	}

	#[test]
	fn communities_cycle_palette_and_last_set_wins() {
		let palette = Palette::new(vec![Color::hex(0x000001), Color::hex(0x000002)]).unwrap();
		let mut engine = HighlightEngine::new(Color::hex(0xffffff), Color::hex(0xeeeeee), palette);
		engine.enter_community(vec![
			ids(&["a", "b"]),
			ids(&["b", "c"]),
			ids(&["d"]),
		]);
		assert_eq!(engine.override_for("a"), Some(Color::hex(0x000001)));
		assert_eq!(engine.override_for("b"), Some(Color::hex(0x000002)));
		assert_eq!(engine.override_for("d"), Some(Color::hex(0x000001)));
		assert_eq!(engine.override_for("z"), None);
	}

	#[test]
	fn overlapping_communities_light_shared_edges() {
		let palette = Palette::new(vec![Color::hex(0x000001), Color::hex(0x000002)]).unwrap();
		let mut engine = HighlightEngine::new(Color::hex(0xffffff), Color::hex(0xeeeeee), palette);
		engine.enter_community(vec![ids(&["a", "b"]), ids(&["b", "c"])]);

		let ab = engine.edge_style(&Edge::new("a", "b", RelationType::Contact));
		assert!(ab.highlighted);
		assert_eq!(ab.color, Color::hex(0x000001));
		let bc = engine.edge_style(&Edge::new("c", "b", RelationType::Contact));
		assert!(bc.highlighted);
		assert_eq!(bc.color, Color::hex(0x000002));
		assert!(!engine.edge_style(&Edge::new("a", "c", RelationType::Contact)).highlighted);
	}

	#[test]
	fn search_is_case_insensitive_on_id_and_label() {
		let store = store();
		let mut engine = HighlightEngine::default();
		assert_eq!(engine.enter_search("li", &store), 1);
		assert_eq!(engine.enter_search("WX_", &store), 1);
		assert_eq!(engine.enter_search("138", &store), 2);
		assert_eq!(engine.enter_search("张", &store), 1);
	}

	#[test]
	fn search_accents_every_match() {
		let store = store();
		let mut engine = HighlightEngine::default();
		assert_eq!(engine.enter_search("1380000000", &store), 2);
		for node in store.nodes() {
			let style = engine.style_for(node);
			assert_eq!(style.highlighted, node.id != "wx_abc", "{}", node.id);
		}
	}

	#[test]
	fn search_without_matches_keeps_defaults() {
		let store = store();
		let mut engine = HighlightEngine::default();
		assert_eq!(engine.enter_search("xyz", &store), 0);
		for node in store.nodes() {
			assert_eq!(engine.style_for(node).color, node.color);
			assert!(!engine.style_for(node).highlighted);
		}
	}

	#[test]
	fn search_replaces_community() {
		let store = store();
		let mut engine = HighlightEngine::default();
		engine.enter_community(vec![ids(&["13800000001", "13800000002", "wx_abc"])]);
		engine.enter_search("wx", &store);

		for node in store.nodes() {
			let style = engine.style_for(node);
			if node.id == "wx_abc" {
				assert_eq!(style.color, Color::hex(0xf15bb5));
			} else {
				assert_eq!(style.color, node.color);
			}
		}
	}

	#[test]
	fn blank_search_resets() {
		let store = store();
		let mut engine = HighlightEngine::default();
		engine.enter_path(vec!["wx_abc".into()]);
		assert_eq!(engine.enter_search("   ", &store), 0);
		assert_eq!(engine.state(), &HighlightState::None);
	}
}
