//! One visualization session: a store, its highlight mode, its color slots and
//! the port that draws it.
//!
//! Full analysis results replace the graph (`clear` then load). Nothing here
//! is shared between sessions, so several graphs can live side by side.

use std::collections::BTreeSet;

use log::{debug, info};
use serde_json::Value;

use super::color::ColorAssigner;
use super::highlight::{HighlightEngine, HighlightState};
use super::ident::IdentityCodec;
use super::port::RenderPort;
use super::store::{ApplyReport, GraphStore};
use super::types::Delta;
use crate::adapters::{self, AdapterContext, AnalysisResult};
use crate::config::VizConfig;
use crate::error::{Error, Result};

/// Outcome of [`GraphSession::show`].
#[derive(Debug, Default)]
pub struct Shown {
	pub applied: ApplyReport,
	/// Source records the adapter skipped.
	pub skipped: Vec<Error>,
	/// The result was valid but held nothing worth drawing.
	pub empty: bool,
}

pub struct GraphSession<P> {
	store: GraphStore,
	highlight: HighlightEngine,
	colors: ColorAssigner,
	codec: IdentityCodec,
	port: P,
}

impl<P: RenderPort> GraphSession<P> {
	pub fn new(port: P, config: &VizConfig) -> Self {
		Self {
			store: GraphStore::new(),
			highlight: HighlightEngine::new(
				config.path_accent,
				config.search_accent,
				config.community_palette.clone(),
			),
			colors: ColorAssigner::new(config.person_palette.clone()),
			codec: IdentityCodec::new(),
			port,
		}
	}

	/// Merges `delta` into the store and redraws.
	pub fn load_delta(&mut self, delta: Delta) -> ApplyReport {
		let report = self.store.apply(delta);
		info!(
			"session: +{} nodes, +{} edges, {} rejected ({} nodes total)",
			report.nodes_added,
			report.edges_added,
			report.rejected.len(),
			self.store.node_count()
		);
		self.render();
		report
	}

	/// Replaces the graph with an analysis result and frames all of it.
	///
	/// A malformed result leaves the session cleared.
	pub fn show(&mut self, result: &AnalysisResult) -> Result<Shown> {
		self.clear();
		let adapted = result.adapt(&mut AdapterContext {
			colors: &mut self.colors,
			codec: &mut self.codec,
		})?;
		let applied = self.load_delta(adapted.delta);
		if !adapted.empty {
			let all: Vec<String> = self.store.nodes().iter().map(|n| n.id.clone()).collect();
			self.port.focus_on(&all);
		}
		Ok(Shown {
			applied,
			skipped: adapted.rejected,
			empty: adapted.empty,
		})
	}

	/// Highlights nodes matching `query` and frames them. Returns the match count.
	pub fn search(&mut self, query: &str) -> usize {
		let count = self.highlight.enter_search(query, &self.store);
		self.render();
		if let HighlightState::Search { matches, .. } = self.highlight.state() {
			if !matches.is_empty() {
				let ids: Vec<String> = matches.iter().cloned().collect();
				self.port.focus_on(&ids);
			}
		}
		count
	}

	/// Highlights an ordered path and frames the part of it that is on screen.
	///
	/// Returns how many of the path's nodes are present in the store.
	pub fn highlight_path(&mut self, node_ids: Vec<String>) -> usize {
		let present: Vec<String> = node_ids
			.iter()
			.filter(|id| self.store.contains(id))
			.cloned()
			.collect();
		debug!("session: path {}/{} nodes present", present.len(), node_ids.len());
		self.highlight.enter_path(node_ids);
		self.render();
		if !present.is_empty() {
			self.port.focus_on(&present);
		}
		present.len()
	}

	/// [`Self::highlight_path`] over a shortest-path result.
	pub fn show_path(&mut self, payload: &Value) -> Result<usize> {
		let nodes = adapters::highlight::path_nodes(payload)?;
		Ok(self.highlight_path(nodes))
	}

	pub fn highlight_communities(&mut self, sets: Vec<BTreeSet<String>>) {
		self.highlight.enter_community(sets);
		self.render();
	}

	/// [`Self::highlight_communities`] over a community-detection result.
	/// Returns the number of communities.
	pub fn show_communities(&mut self, payload: &Value) -> Result<usize> {
		let sets = adapters::highlight::communities(payload)?;
		let count = sets.len();
		self.highlight_communities(sets);
		Ok(count)
	}

	pub fn reset_highlight(&mut self) {
		self.highlight.reset();
		self.render();
	}

	/// Empties the store, drops the highlight and the dynamic color slots,
	/// and clears the port.
	///
	/// Parallel-edge discriminators keep counting so ids are never reused.
	pub fn clear(&mut self) {
		self.store.clear();
		self.highlight.reset();
		self.colors.reset();
		self.port.clear();
		debug!("session: cleared");
	}

	fn render(&mut self) {
		let snapshot = self.store.snapshot();
		self.port.render(&snapshot, &self.highlight);
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn highlight(&self) -> &HighlightEngine {
		&self.highlight
	}

	pub fn port(&self) -> &P {
		&self.port
	}

	pub fn port_mut(&mut self) -> &mut P {
		&mut self.port
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::color::Color;
	use crate::graph::port::Styler;
	use crate::graph::types::Snapshot;

	#[derive(Default)]
	struct Recorder {
		frames: Vec<Vec<(String, Color)>>,
		focus: Vec<Vec<String>>,
		clears: usize,
	}

	impl RenderPort for Recorder {
		fn render(&mut self, snapshot: &Snapshot, styler: &dyn Styler) {
			self.frames.push(
				snapshot
					.nodes()
					.iter()
					.map(|n| (n.id.clone(), styler.node_style(n).color))
					.collect(),
			);
		}

		fn focus_on(&mut self, node_ids: &[String]) {
			self.focus.push(node_ids.to_vec());
		}

		fn clear(&mut self) {
			self.clears += 1;
		}
	}

	fn session() -> GraphSession<Recorder> {
		GraphSession::new(Recorder::default(), &VizConfig::default())
	}

	fn target_result() -> AnalysisResult {
		AnalysisResult::Target(json!({
			"nodes": [{"id": "T", "type": "Target"}, {"id": "P1", "type": "Person"}],
			"edges": [{"from": "T", "to": "P1", "type": "knows"}]
		}))
	}

	#[test]
	fn show_clears_loads_and_frames() {
		let mut session = session();
		let shown = session.show(&target_result()).unwrap();
		assert_eq!(shown.applied.nodes_added, 2);
		assert_eq!(shown.applied.edges_added, 1);
		assert!(!shown.empty);

		let port = session.port();
		assert_eq!(port.clears, 1);
		assert_eq!(port.frames.last().unwrap().len(), 2);
		assert_eq!(port.focus, vec![vec!["T".to_string(), "P1".to_string()]]);
	}

	#[test]
	fn showing_again_replaces_previous_graph() {
		let mut session = session();
		session.show(&target_result()).unwrap();
		session.search("P1");
		session
			.show(&AnalysisResult::Expansion(json!({
				"nodes": [{"number": "1"}, {"number": "2"}],
				"relationships": [{"source": "1", "target": "2", "type": "CALL"}]
			})))
			.unwrap();

		assert_eq!(session.store().node_count(), 2);
		assert!(session.store().contains("1"));
		assert_eq!(session.highlight().state(), &HighlightState::None);
	}

	#[test]
	fn person_colors_restart_after_clear() {
		let collision = AnalysisResult::Collision(json!({
			"common_contacts": [],
			"hot_numbers": [{"number": "123", "owners": ["A", "B"]}],
			"person_relations": []
		}));
		let mut session = session();
		session.show(&collision).unwrap();
		let first = session.store().node("person_A").unwrap().color;
		session.show(&collision).unwrap();
		assert_eq!(session.store().node("person_A").unwrap().color, first);
	}

	#[test]
	fn search_focuses_matches_only() {
		let mut session = session();
		session.show(&target_result()).unwrap();
		assert_eq!(session.search("p1"), 1);
		assert_eq!(session.port().focus.last().unwrap(), &vec!["P1".to_string()]);

		let focused = session.port().focus.len();
		assert_eq!(session.search("nothing"), 0);
		assert_eq!(session.port().focus.len(), focused);
	}

	#[test]
	fn path_counts_present_nodes() {
		let mut session = session();
		session.show(&target_result()).unwrap();
		let present = session
			.show_path(&json!({"path_nodes": ["T", "P1", "P9"]}))
			.unwrap();
		assert_eq!(present, 2);
		let frame = session.port().frames.last().unwrap();
		assert!(frame.iter().all(|(_, color)| *color == Color::hex(0x64ffda)));
	}

	#[test]
	fn communities_then_reset_restores_domain_colors() {
		let mut session = session();
		session.show(&target_result()).unwrap();
		let plain = session.port().frames.last().unwrap().clone();

		let count = session
			.show_communities(&json!({"communities": [{"members": ["T", "P1"]}]}))
			.unwrap();
		assert_eq!(count, 1);
		assert_ne!(session.port().frames.last().unwrap(), &plain);

		session.reset_highlight();
		assert_eq!(session.port().frames.last().unwrap(), &plain);
	}

	#[test]
	fn malformed_result_is_an_error() {
		let mut session = session();
		let err = session
			.show(&AnalysisResult::Target(json!({"nodes": []})))
			.unwrap_err();
		assert!(matches!(err, Error::MalformedResult { .. }));
		assert!(session.store().is_empty());
	}
}
