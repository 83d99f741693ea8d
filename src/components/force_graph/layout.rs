//! Physics layout behind the graph canvas.
//!
//! [`ForceLayout`] is the [`RenderPort`] a browser session draws through. It
//! mirrors each snapshot into a `force_graph` simulation, keeps node positions
//! across re-renders by id, and owns the pan/zoom transform the canvas uses.
//! Nothing in here touches the DOM, so it runs natively as well.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::debug;

use crate::config::LayoutConfig;
use crate::graph::color::Color;
use crate::graph::port::{RenderPort, Styler};
use crate::graph::types::Snapshot;

/// Zoom limits shared by wheel zoom and focus fitting.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Focusing never zooms in past this, so a lone node is not blown up.
const MAX_FOCUS_ZOOM: f64 = 2.0;

/// Per-node display data carried through the simulation.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: Color,
	/// Domain size; the drawn radius is `size * node_scale`.
	pub size: f64,
	pub highlighted: bool,
}

/// A drawn edge between two simulation nodes.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub from: DefaultNodeIdx,
	pub to: DefaultNodeIdx,
	pub label: String,
	pub color: Color,
	pub width: f64,
	pub dashed: bool,
	pub highlighted: bool,
	/// Position among parallel edges of the same pair, 0 for the first.
	pub lane: usize,
}

/// Pan and zoom transform applied to the whole graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`.
	pub k: f64,
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug)]
struct Placement {
	x: f32,
	y: f32,
	anchored: bool,
}

pub struct ForceLayout {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	/// Node under the pointer, if any.
	pub hovered: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	config: LayoutConfig,
	edges: Vec<EdgeInfo>,
	index: HashMap<String, DefaultNodeIdx>,
	placements: HashMap<String, Placement>,
	focused: Vec<String>,
}

impl ForceLayout {
	pub fn new(config: &LayoutConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(config.simulation()),
			transform: centered(width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			width,
			height,
			animation_running: true,
			config: config.clone(),
			edges: Vec::new(),
			index: HashMap::new(),
			placements: HashMap::new(),
			focused: Vec::new(),
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	/// Current world position of a node.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// World positions of every node, keyed by simulation index.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Drawn radius of a node in world units.
	pub fn radius(&self, info: &NodeInfo) -> f64 {
		info.size * self.config.node_scale
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// The topmost node whose disc contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = self.config.node_scale;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.size * scale {
				found = Some(node.index());
			}
		});
		found
	}

	/// Id of the node at a simulation index.
	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// True when `idx` is the hovered node or one edge away from it.
	pub fn is_hover_neighborhood(&self, idx: DefaultNodeIdx) -> bool {
		let Some(hovered) = self.hovered else {
			return false;
		};
		hovered == idx
			|| self.edges.iter().any(|e| {
				(e.from == hovered && e.to == idx) || (e.to == hovered && e.from == idx)
			})
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
	}

	/// Applies a new viewport size and refits the last focus.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if self.focused.is_empty() {
			self.transform = centered(width, height);
		} else {
			let ids = std::mem::take(&mut self.focused);
			self.focus_on(&ids);
		}
	}

	/// Multiplies the zoom around a screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = k;
	}

	fn remember_placements(&mut self) {
		let placements = &mut self.placements;
		self.graph.visit_nodes(|node| {
			placements.insert(
				node.data.user_data.id.clone(),
				Placement {
					x: node.x(),
					y: node.y(),
					anchored: node.data.is_anchor,
				},
			);
		});
	}

	/// Seed for a node never placed before: evenly on a ring around the origin.
	fn seed(&self, slot: usize, of: usize) -> Placement {
		if of <= 1 {
			return Placement {
				x: 0.0,
				y: 0.0,
				anchored: false,
			};
		}
		let angle = slot as f64 * 2.0 * PI / of as f64;
		Placement {
			x: (self.config.seed_radius * angle.cos()) as f32,
			y: (self.config.seed_radius * angle.sin()) as f32,
			anchored: false,
		}
	}
}

fn centered(width: f64, height: f64) -> ViewTransform {
	ViewTransform {
		x: width / 2.0,
		y: height / 2.0,
		k: 1.0,
	}
}

impl RenderPort for ForceLayout {
	fn render(&mut self, snapshot: &Snapshot, styler: &dyn Styler) {
		self.remember_placements();

		let mut graph = ForceGraph::new(self.config.simulation());
		let mut index = HashMap::with_capacity(snapshot.nodes().len());
		let fresh = snapshot
			.nodes()
			.iter()
			.filter(|n| !self.placements.contains_key(&n.id))
			.count();
		let mut slot = 0;

		for node in snapshot.nodes() {
			let place = match self.placements.get(&node.id) {
				Some(p) => *p,
				None => {
					slot += 1;
					self.seed(slot - 1, fresh)
				}
			};
			let style = styler.node_style(node);
			let idx = graph.add_node(NodeData {
				x: place.x,
				y: place.y,
				mass: 10.0,
				is_anchor: place.anchored,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: style.color,
					size: node.size,
					highlighted: style.highlighted,
				},
			});
			index.insert(node.id.clone(), idx);
		}

		let mut lanes: HashMap<(DefaultNodeIdx, DefaultNodeIdx), usize> = HashMap::new();
		let mut edges = Vec::with_capacity(snapshot.edges().len());
		for edge in snapshot.edges() {
			let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
				continue;
			};
			graph.add_edge(from, to, EdgeData::default());
			let key = if from <= to { (from, to) } else { (to, from) };
			let lane = lanes.entry(key).or_insert(0);
			let style = styler.edge_style(edge);
			edges.push(EdgeInfo {
				from,
				to,
				label: edge.label.clone(),
				color: style.color,
				width: style.width,
				dashed: style.dashed,
				highlighted: style.highlighted,
				lane: *lane,
			});
			*lane += 1;
		}

		// Placements of nodes that left the snapshot are dropped.
		self.placements.retain(|id, _| index.contains_key(id));
		debug!(
			"layout: {} nodes ({fresh} new), {} edges",
			index.len(),
			edges.len()
		);
		self.graph = graph;
		self.index = index;
		self.edges = edges;
		self.hovered = None;
		self.drag = DragState::default();
	}

	/// Fits the view to the bounding box of the listed nodes.
	fn focus_on(&mut self, node_ids: &[String]) {
		let wanted: std::collections::HashSet<&str> = node_ids.iter().map(String::as_str).collect();
		let scale = self.config.node_scale;
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			if !wanted.contains(node.data.user_data.id.as_str()) {
				return;
			}
			let r = node.data.user_data.size * scale;
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x - r, y - r, x + r, y + r),
				Some((x0, y0, x1, y1)) => (x0.min(x - r), y0.min(y - r), x1.max(x + r), y1.max(y + r)),
			});
		});
		let Some((x0, y0, x1, y1)) = bounds else {
			return;
		};

		let pad = self.config.fit_padding;
		let (avail_w, avail_h) = ((self.width - 2.0 * pad).max(1.0), (self.height - 2.0 * pad).max(1.0));
		let (box_w, box_h) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = (avail_w / box_w)
			.min(avail_h / box_h)
			.clamp(MIN_ZOOM, MAX_FOCUS_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
		self.focused = node_ids.to_vec();
	}

	fn clear(&mut self) {
		self.graph = ForceGraph::new(self.config.simulation());
		self.edges.clear();
		self.index.clear();
		self.placements.clear();
		self.focused.clear();
		self.hovered = None;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.transform = centered(self.width, self.height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::port::DomainStyle;
	use crate::graph::store::GraphStore;
	use crate::graph::types::{Edge, Node, NodeCategory, RelationType};

	fn store() -> GraphStore {
		let mut store = GraphStore::new();
		store.add(Node::new("a", "A", NodeCategory::Phone));
		store.add(Node::new("b", "B", NodeCategory::Phone));
		store.add(Node::new("c", "C", NodeCategory::Person));
		store
			.add_edge(Edge::new("a", "b", RelationType::Contact))
			.unwrap();
		store
			.add_edge(Edge::parallel("1:a~b/common#1", "b", "a", RelationType::Common))
			.unwrap();
		store
	}

	fn layout() -> ForceLayout {
		ForceLayout::new(&LayoutConfig::default(), 800.0, 600.0)
	}

	#[test]
	fn rerender_keeps_positions() {
		let store = store();
		let mut layout = layout();
		layout.render(&store.snapshot(), &DomainStyle);
		for _ in 0..10 {
			layout.tick(0.016);
		}
		let before = layout.position("a").unwrap();

		layout.render(&store.snapshot(), &DomainStyle);
		assert_eq!(layout.position("a").unwrap(), before);
		assert_eq!(layout.node_count(), 3);
	}

	#[test]
	fn parallel_edges_get_lanes() {
		let mut layout = layout();
		layout.render(&store().snapshot(), &DomainStyle);
		let lanes: Vec<usize> = layout.edges().iter().map(|e| e.lane).collect();
		assert_eq!(lanes, vec![0, 1]);
		assert!(layout.edges()[1].dashed);
	}

	#[test]
	fn focus_fits_requested_nodes() {
		let mut layout = layout();
		layout.render(&store().snapshot(), &DomainStyle);
		layout.focus_on(&["a".to_string(), "b".to_string()]);

		let pad = layout.config().fit_padding;
		for id in ["a", "b"] {
			let (gx, gy) = layout.position(id).unwrap();
			let (sx, sy) = layout.graph_to_screen(gx, gy);
			assert!(sx >= pad - 1e-6 && sx <= 800.0 - pad + 1e-6, "{id} x {sx}");
			assert!(sy >= pad - 1e-6 && sy <= 600.0 - pad + 1e-6, "{id} y {sy}");
		}
	}

	#[test]
	fn focus_on_unknown_ids_keeps_view() {
		let mut layout = layout();
		layout.render(&store().snapshot(), &DomainStyle);
		let before = layout.transform.clone();
		layout.focus_on(&["nope".to_string()]);
		assert_eq!(layout.transform, before);
	}

	#[test]
	fn hit_test_finds_node_under_pointer() {
		let mut layout = layout();
		layout.render(&store().snapshot(), &DomainStyle);
		let (gx, gy) = layout.position("c").unwrap();
		let (sx, sy) = layout.graph_to_screen(gx, gy);
		let idx = layout.node_at_position(sx, sy).unwrap();
		assert_eq!(layout.node_id(idx).as_deref(), Some("c"));
		assert!(layout.node_at_position(sx + 500.0, sy + 500.0).is_none());
	}

	#[test]
	fn clear_drops_everything() {
		let mut layout = layout();
		layout.render(&store().snapshot(), &DomainStyle);
		layout.focus_on(&["a".to_string()]);
		layout.clear();
		assert_eq!(layout.node_count(), 0);
		assert!(layout.edges().is_empty());
		assert_eq!(layout.transform, centered(800.0, 600.0));
	}
}
