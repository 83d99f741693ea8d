//! Canvas drawing for the relationship graph.
//!
//! Passes, back to front:
//! 1. Background (screen space)
//! 2. Plain edges, then highlighted edges (world space)
//! 3. Plain nodes, then highlighted nodes, then labels

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::{EdgeInfo, ForceLayout, NodeInfo};
use crate::config::VizConfig;

/// Label size in screen pixels.
const LABEL_PX: f64 = 12.0;
/// Below this zoom labels stop shrinking.
const LABEL_MIN_K: f64 = 0.5;
/// Spacing between parallel edges of one pair, in world units.
const LANE_SPACING: f64 = 14.0;
/// Alpha of elements outside the hovered neighborhood.
const DIM_ALPHA: f64 = 0.25;

/// Renders the complete graph to the canvas.
pub fn render(layout: &ForceLayout, ctx: &CanvasRenderingContext2d, config: &VizConfig) {
	ctx.set_fill_style_str(&config.background.to_css());
	ctx.fill_rect(0.0, 0.0, layout.width, layout.height);

	ctx.save();
	let _ = ctx.translate(layout.transform.x, layout.transform.y);
	let _ = ctx.scale(layout.transform.k, layout.transform.k);

	let positions = layout.positions();
	let dimming = layout.hovered.is_some();

	for pass in [false, true] {
		for edge in layout.edges().iter().filter(|e| e.highlighted == pass) {
			let lit = layout.is_hover_neighborhood(edge.from) && layout.is_hover_neighborhood(edge.to);
			let alpha = if dimming && !lit { DIM_ALPHA } else { 1.0 };
			draw_edge(ctx, layout, &positions, edge, alpha);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for pass in [false, true] {
		layout.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			if info.highlighted != pass {
				return;
			}
			let idx = node.index();
			let alpha = if dimming && !layout.is_hover_neighborhood(idx) {
				DIM_ALPHA
			} else {
				1.0
			};
			draw_node(ctx, layout, info, node.x() as f64, node.y() as f64, alpha, layout.hovered == Some(idx));
		});
	}

	let font = format!("{}px sans-serif", LABEL_PX / layout.transform.k.max(LABEL_MIN_K));
	ctx.set_font(&font);
	layout.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let alpha = if dimming && !layout.is_hover_neighborhood(node.index()) {
			DIM_ALPHA
		} else {
			0.9
		};
		draw_label(ctx, layout, info, node.x() as f64, node.y() as f64, alpha, config);
	});

	ctx.restore();
}

fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	layout: &ForceLayout,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	edge: &EdgeInfo,
	alpha: f64,
) {
	let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&edge.from), positions.get(&edge.to))
	else {
		return;
	};
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}

	ctx.set_stroke_style_str(&edge.color.with_alpha(edge.color.a * alpha).to_css());
	ctx.set_line_width(edge.width / layout.transform.k.max(LABEL_MIN_K));
	if edge.dashed {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(4.0),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	ctx.begin_path();
	ctx.move_to(x1, y1);
	if edge.lane == 0 {
		ctx.line_to(x2, y2);
	} else {
		// Alternate sides: lanes 1, 2, 3, 4 bend +1, -1, +2, -2 spacings.
		let side = if edge.lane % 2 == 1 { 1.0 } else { -1.0 };
		let offset = side * LANE_SPACING * edge.lane.div_ceil(2) as f64;
		let (px, py) = (-dy / dist * offset, dx / dist * offset);
		let _ = ctx.quadratic_curve_to((x1 + x2) / 2.0 + px, (y1 + y2) / 2.0 + py, x2, y2);
	}
	ctx.stroke();
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	layout: &ForceLayout,
	info: &NodeInfo,
	x: f64,
	y: f64,
	alpha: f64,
	hovered: bool,
) {
	let radius = layout.radius(info);
	ctx.set_global_alpha(alpha);

	let gradient = ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius);
	match gradient {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &info.color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &info.color.to_css());
			let _ = gradient.add_color_stop(1.0, &info.color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&info.color.to_css()),
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.fill();

	if info.highlighted || hovered {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 3.0 / layout.transform.k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
		ctx.set_line_width(1.5 / layout.transform.k);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	layout: &ForceLayout,
	info: &NodeInfo,
	x: f64,
	y: f64,
	alpha: f64,
	config: &VizConfig,
) {
	if info.label.is_empty() {
		return;
	}
	let radius = layout.radius(info);
	ctx.set_fill_style_str(&config.label_color.with_alpha(alpha).to_css());
	let _ = ctx.fill_text(&info.label, x + radius + 4.0, y + 4.0);
}
