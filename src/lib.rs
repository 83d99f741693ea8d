//! relgraph: relationship-graph view-model for investigative analysis results.
//!
//! Backend analyses (target analysis, number collision, network expansion,
//! shortest path, community detection) arrive as JSON. Adapters turn them into
//! canonical node/edge deltas, a [`GraphStore`] keeps the deduplicated graph,
//! and a [`HighlightEngine`] layers path, community or search highlighting on
//! top. A [`GraphSession`] ties these to a [`RenderPort`].
//!
//! With the `web` feature the crate also ships a WASM front end: a leptos
//! [`App`] that draws the embedded result on a force-directed canvas.

pub mod adapters;
pub mod components;
pub mod config;
pub mod error;
pub mod graph;

pub use adapters::{Adapted, AnalysisResult};
pub use components::force_graph::ForceLayout;
pub use config::{LayoutConfig, VizConfig};
pub use error::{Error, Result};
pub use graph::{
	Color, Delta, Edge, GraphSession, GraphStore, HighlightEngine, HighlightState, IdentityCodec,
	Node, NodeCategory, RelationType, RenderPort, Snapshot, Styler,
};

#[cfg(feature = "web")]
pub use app::{App, init_logging};

#[cfg(feature = "web")]
mod app {
	use std::cell::RefCell;
	use std::rc::Rc;

	use leptos::prelude::*;
	use leptos_meta::*;
	use log::{Level, info, warn};
	use wasm_bindgen::JsCast;
	use web_sys::{HtmlScriptElement, Window};

	use crate::components::force_graph::{RelationGraphCanvas, SharedSession};
	use crate::{AnalysisResult, ForceLayout, GraphSession, VizConfig};

	/// Initialize logging and panic hooks for the WASM target.
	pub fn init_logging() {
		let _ = console_log::init_with_level(Level::Debug);
		console_error_panic_hook::set_once();
		info!("relgraph: logging initialized");
	}

	fn script_text(id: &str) -> Option<String> {
		let window: Window = web_sys::window()?;
		let element = window.document()?.get_element_by_id(id)?;
		let script: HtmlScriptElement = element.dyn_into().ok()?;
		script.text().ok()
	}

	/// Load the analysis result from a script element with id="graph-data".
	/// Expected format: `{"kind": "target" | "collision" | "expansion", "result": {...}}`
	fn load_graph_data() -> Option<AnalysisResult> {
		let json_text = script_text("graph-data")?;
		match serde_json::from_str::<AnalysisResult>(&json_text) {
			Ok(result) => Some(result),
			Err(e) => {
				warn!("relgraph: failed to parse graph data: {}", e);
				None
			}
		}
	}

	/// Optional configuration from a script element with id="graph-config".
	fn load_config() -> VizConfig {
		let Some(json_text) = script_text("graph-config") else {
			return VizConfig::default();
		};
		VizConfig::from_json(&json_text).unwrap_or_else(|e| {
			warn!("relgraph: ignoring graph config: {}", e);
			VizConfig::default()
		})
	}

	/// Main application component.
	/// Loads the analysis result from the DOM, shows it, and offers node search.
	#[component]
	pub fn App() -> impl IntoView {
		provide_meta_context();

		let config = load_config();
		let layout = ForceLayout::new(&config.layout, 800.0, 600.0);
		let session: SharedSession = Rc::new(RefCell::new(GraphSession::new(layout, &config)));

		let status = match load_graph_data() {
			Some(result) => match session.borrow_mut().show(&result) {
				Ok(shown) if shown.empty => "No relationships found".to_string(),
				Ok(shown) => format!(
					"{} nodes, {} relationships",
					shown.applied.nodes_added, shown.applied.edges_added
				),
				Err(e) => {
					warn!("relgraph: {}", e);
					format!("Could not display result: {e}")
				}
			},
			None => "No analysis result embedded".to_string(),
		};
		let (status, set_status) = signal(status);
		let (selected, set_selected) = signal(None::<String>);

		let session_search = session.clone();
		let on_search = move |ev: web_sys::Event| {
			let query = event_target_value(&ev);
			let count = session_search.borrow_mut().search(&query);
			if !query.trim().is_empty() {
				set_status.set(format!("{count} matches for \"{}\"", query.trim()));
			}
		};

		// Label and detail rows of the clicked node.
		let (inspected, set_inspected) = signal(None::<(String, Vec<(String, String)>)>);
		let session_detail = session.clone();
		Effect::new(move |_| {
			let picked = selected.get().and_then(|id| {
				let session = session_detail.borrow();
				let node = session.store().node(&id)?;
				let rows = node
					.detail
					.iter()
					.map(|(k, v)| (k.clone(), v.to_string()))
					.collect();
				Some((node.label.clone(), rows))
			});
			set_inspected.set(picked);
		});
		let detail = move || {
			inspected.get().map(|(label, rows)| {
				let rows = rows
					.into_iter()
					.map(|(k, v)| view! { <li><b>{k}</b>": "{v}</li> })
					.collect_view();
				view! {
					<div class="node-detail">
						<h2>{label}</h2>
						<ul>{rows}</ul>
					</div>
				}
			})
		};

		view! {
			<Html attr:lang="zh-CN" attr:dir="ltr" attr:data-theme="dark" />
			<Title text="Relationship Graph" />
			<Meta charset="UTF-8" />
			<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

			<div class="fullscreen-graph">
				<RelationGraphCanvas session=session config=config fullscreen=true selected=set_selected />
				<div class="graph-overlay">
					<h1>"Relationship Graph"</h1>
					<input type="search" placeholder="Search number, WeChat or name" on:input=on_search />
					<p class="subtitle">{status}</p>
					{detail}
				</div>
			</div>
		}
	}
}
