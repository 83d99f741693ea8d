//! Leptos component drawing a session's graph on a canvas.
//!
//! The component shares the session with the rest of the page. Each animation
//! frame it advances the layout the session renders into and redraws; mouse and
//! wheel handlers drive dragging, panning, zooming and node selection.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::layout::ForceLayout;
use super::render;
use crate::config::VizConfig;
use crate::graph::session::GraphSession;

/// A session drawing through a [`ForceLayout`], shared by the page's widgets.
pub type SharedSession = Rc<RefCell<GraphSession<ForceLayout>>>;

/// Pointer travel, in pixels, below which a press and release count as a click.
const CLICK_SLOP: f64 = 3.0;

fn pointer(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

/// Renders a session's graph on a canvas.
///
/// The canvas sizes itself to its parent by default; `fullscreen = true` fills
/// the viewport and follows window resizes. Clicking a node writes its id to
/// `selected`, clicking the background writes `None`.
#[component]
pub fn RelationGraphCanvas(
	session: SharedSession,
	config: VizConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(optional)] selected: Option<WriteSignal<Option<String>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (session_init, animate_init, resize_cb_init) =
		(session.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		session_init.borrow_mut().port_mut().resize(w, h);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		if fullscreen {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				session_resize.borrow_mut().port_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (session_anim, animate_inner, config) =
			(session_init.clone(), animate_init.clone(), config.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Ok(mut s) = session_anim.try_borrow_mut() {
				let layout = s.port_mut();
				layout.tick(0.016);
				render::render(layout, &ctx, &config);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let session_md = session.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, ev.client_x(), ev.client_y());
		let mut s = session_md.borrow_mut();
		let layout = s.port_mut();

		if let Some(idx) = layout.node_at_position(x, y) {
			let (mut nx, mut ny) = (0.0, 0.0);
			layout.graph.visit_nodes(|node| {
				if node.index() == idx {
					(nx, ny) = (node.x(), node.y());
				}
			});
			layout.drag.active = true;
			layout.drag.node_idx = Some(idx);
			layout.drag.start_x = x;
			layout.drag.start_y = y;
			layout.drag.node_start_x = nx;
			layout.drag.node_start_y = ny;
		} else {
			layout.pan.active = true;
			layout.pan.start_x = x;
			layout.pan.start_y = y;
			layout.pan.transform_start_x = layout.transform.x;
			layout.pan.transform_start_y = layout.transform.y;
		}
	};

	let session_mm = session.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, ev.client_x(), ev.client_y());
		let mut s = session_mm.borrow_mut();
		let layout = s.port_mut();

		if layout.drag.active {
			if let Some(idx) = layout.drag.node_idx {
				let (dx, dy) = (
					(x - layout.drag.start_x) / layout.transform.k,
					(y - layout.drag.start_y) / layout.transform.k,
				);
				let (nx, ny) = (
					layout.drag.node_start_x + dx as f32,
					layout.drag.node_start_y + dy as f32,
				);
				layout.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if layout.pan.active {
			layout.transform.x = layout.pan.transform_start_x + (x - layout.pan.start_x);
			layout.transform.y = layout.pan.transform_start_y + (y - layout.pan.start_y);
		} else {
			layout.hovered = layout.node_at_position(x, y);
		}
	};

	let session_mu = session.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, ev.client_x(), ev.client_y());
		let pick = {
			let mut s = session_mu.borrow_mut();
			let layout = s.port_mut();
			let (sx, sy, idx) = if layout.drag.active {
				(layout.drag.start_x, layout.drag.start_y, layout.drag.node_idx)
			} else {
				(layout.pan.start_x, layout.pan.start_y, None)
			};
			let pressed = layout.drag.active || layout.pan.active;
			layout.drag.active = false;
			layout.drag.node_idx = None;
			layout.pan.active = false;
			(pressed && (x - sx).hypot(y - sy) < CLICK_SLOP).then(|| idx.and_then(|i| layout.node_id(i)))
		};
		// Session borrow is released before subscribers run.
		if let (Some(pick), Some(selected)) = (pick, selected) {
			selected.set(pick);
		}
	};

	let session_ml = session.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = session_ml.borrow_mut();
		let layout = s.port_mut();
		layout.drag.active = false;
		layout.drag.node_idx = None;
		layout.pan.active = false;
		layout.hovered = None;
	};

	let session_wh = session.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, ev.client_x(), ev.client_y());
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		session_wh.borrow_mut().port_mut().zoom_at(x, y, factor);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
