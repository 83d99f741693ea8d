//! The narrow interface between the view-model and whatever draws it.

use super::color::Color;
use super::types::{Edge, Node, Snapshot};

/// Resolved look of a node for the current highlight mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: Color,
	/// Set when a highlight mode overrides the node's domain color.
	pub highlighted: bool,
}

/// Resolved look of an edge for the current highlight mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: Color,
	pub width: f64,
	pub dashed: bool,
	pub highlighted: bool,
}

/// Maps stored elements to their on-screen style.
pub trait Styler {
	fn node_style(&self, node: &Node) -> NodeStyle;
	fn edge_style(&self, edge: &Edge) -> EdgeStyle;
}

/// Styles every element with its own domain attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomainStyle;

impl Styler for DomainStyle {
	fn node_style(&self, node: &Node) -> NodeStyle {
		NodeStyle {
			color: node.color,
			highlighted: false,
		}
	}

	fn edge_style(&self, edge: &Edge) -> EdgeStyle {
		EdgeStyle {
			color: edge.color,
			width: edge.width,
			dashed: edge.dashed,
			highlighted: false,
		}
	}
}

/// Rendering engine consumed by a session.
///
/// Calls are fire-and-forget: the session never waits for layout and never
/// reads domain data back from the port.
pub trait RenderPort {
	/// Replaces what is drawn with `snapshot`, styled through `styler`.
	fn render(&mut self, snapshot: &Snapshot, styler: &dyn Styler);
	/// Brings the given nodes into view.
	fn focus_on(&mut self, node_ids: &[String]);
	/// Drops everything drawn.
	fn clear(&mut self);
}
