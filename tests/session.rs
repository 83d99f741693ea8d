//! End-to-end behavior of a session: analysis JSON in, styled frames out.

// Integration tests only touch the public API, silence noisy lint.
#![allow(unused_crate_dependencies)]

use relgraph::graph::{NodeStyle, Shown};
use relgraph::{
	AnalysisResult, Color, Delta, Edge, Error, ForceLayout, GraphSession, GraphStore, Node, NodeCategory,
	RelationType, RenderPort, Snapshot, Styler, VizConfig,
};
use serde_json::{Value, json};

/// One rendered frame: every node's style and every edge id.
#[derive(Debug, Default, Clone)]
struct Frame {
	nodes: Vec<(String, NodeStyle)>,
	edges: Vec<String>,
}

#[derive(Debug, Default)]
struct Recorder {
	frames: Vec<Frame>,
	focus: Vec<Vec<String>>,
	clears: usize,
}

impl Recorder {
	fn last(&self) -> &Frame {
		self.frames.last().expect("at least one frame")
	}
}

impl RenderPort for Recorder {
	fn render(&mut self, snapshot: &Snapshot, styler: &dyn Styler) {
		self.frames.push(Frame {
			nodes: snapshot
				.nodes()
				.iter()
				.map(|n| (n.id.clone(), styler.node_style(n)))
				.collect(),
			edges: snapshot.edges().iter().map(|e| e.id.clone()).collect(),
		});
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

fn show(session: &mut GraphSession<Recorder>, kind: &str, result: Value) -> Shown {
	let envelope: AnalysisResult =
		serde_json::from_value(json!({"kind": kind, "result": result})).unwrap();
	session.show(&envelope).unwrap()
}

#[test]
fn target_analysis_scenario() {
	let mut session = session();
	let shown = show(
		&mut session,
		"target",
		json!({
			"nodes": [{"id": "T", "type": "Target"}, {"id": "P1", "type": "Person"}],
			"edges": [{"from": "T", "to": "P1", "type": "knows"}]
		}),
	);

	assert_eq!(shown.applied.nodes_added, 2);
	assert_eq!(shown.applied.edges_added, 1);
	let target = session.store().node("T").unwrap();
	assert_eq!(target.category, NodeCategory::Target);
	assert_eq!(target.color, Color::hex(0xef4444));
	assert_eq!(session.port().last().edges.len(), 1);
	assert_eq!(session.port().clears, 1);
}

#[test]
fn collision_hot_number_scenario() {
	let mut session = session();
	show(
		&mut session,
		"collision",
		json!({
			"common_contacts": [],
			"hot_numbers": [{"number": "123", "owner_count": 2, "owners": ["A", "B"]}],
			"person_relations": []
		}),
	);

	let store = session.store();
	let mut ids: Vec<&str> = store.nodes().iter().map(|n| n.id.as_str()).collect();
	ids.sort_unstable();
	assert_eq!(ids, vec!["person_A", "person_B", "phone_123"]);
	assert_eq!(store.edge_count(), 2);
	assert!(store.edges().iter().all(|e| e.relation == RelationType::HasContact));
	assert_eq!(store.node("phone_123").unwrap().size, 25.0);
}

#[test]
fn expansion_then_search_then_path() {
	let mut session = session();
	show(
		&mut session,
		"expansion",
		json!({
			"nodes": [
				{"number": "13800000001"},
				{"number": "13800000002"},
				{"wxid": "wx_laowang", "type": "WeChat"}
			],
			"relationships": [
				{"source": "13800000001", "target": "13800000002", "type": "CALL", "count": 7},
				{"from": "13800000002", "to": "wx_laowang", "type": "FRIEND"},
				{"from": "13800000002", "to": "13800000001", "type": "CALL"}
			]
		}),
	);
	assert_eq!(session.store().edge_count(), 2);

	assert_eq!(session.search("LAOWANG"), 1);
	let frame = session.port().last().clone();
	for (id, style) in &frame.nodes {
		assert_eq!(style.highlighted, id == "wx_laowang", "{id}");
	}

	let present = session.highlight_path(vec![
		"13800000001".into(),
		"13800000002".into(),
		"wx_laowang".into(),
	]);
	assert_eq!(present, 3);
	assert!(session.port().last().nodes.iter().all(|(_, s)| s.highlighted));
	assert_eq!(session.port().focus.last().unwrap().len(), 3);
}

#[test]
fn search_without_matches_leaves_colors() {
	let mut session = session();
	show(
		&mut session,
		"target",
		json!({
			"nodes": [{"id": "T", "type": "Target"}, {"id": "P1", "type": "Person"}],
			"edges": []
		}),
	);
	assert_eq!(session.search("xyz"), 0);
	let store = session.store();
	for (id, style) in &session.port().last().nodes {
		assert_eq!(style.color, store.node(id).unwrap().color);
		assert!(!style.highlighted);
	}
}

#[test]
fn community_then_search_is_exclusive() {
	let mut session = session();
	show(
		&mut session,
		"target",
		json!({
			"nodes": [
				{"id": "A", "type": "Phone"},
				{"id": "B", "type": "Phone"},
				{"id": "C", "type": "WeChat"}
			],
			"edges": [{"from": "A", "to": "B", "type": "contact"}]
		}),
	);
	session.highlight_communities(vec![["A", "B", "C"].iter().map(|s| s.to_string()).collect()]);
	session.search("c");

	let store = session.store();
	for (id, style) in &session.port().last().nodes {
		if id == "C" {
			assert_eq!(style.color, Color::hex(0xf15bb5));
		} else {
			assert_eq!(style.color, store.node(id).unwrap().color);
		}
	}
}

#[test]
fn malformed_result_reports_missing_array() {
	let mut session = session();
	let envelope: AnalysisResult = serde_json::from_value(json!({
		"kind": "collision",
		"result": {"hot_numbers": [], "person_relations": []}
	}))
	.unwrap();
	let err = session.show(&envelope).unwrap_err();
	assert!(matches!(
		err,
		Error::MalformedResult {
			field: "common_contacts",
			..
		}
	));
}

#[test]
fn store_properties_hold_under_mixed_operations() {
	let mut store = GraphStore::new();
	assert!(store.add(Node::new("a", "first", NodeCategory::Phone)));
	assert!(!store.add(Node::new("a", "second", NodeCategory::Person)));
	assert_eq!(store.node("a").unwrap().label, "first");

	let dangling = store.add_edge(Edge::new("a", "z", RelationType::Contact));
	assert!(matches!(dangling, Err(Error::DanglingEndpoint { .. })));
	assert_eq!(store.edge_count(), 0);

	store.add(Node::new("b", "b", NodeCategory::Phone));
	assert!(store.add_edge(Edge::new("a", "b", RelationType::Contact)).unwrap());
	assert!(!store.add_edge(Edge::new("b", "a", RelationType::Contact)).unwrap());
	assert_eq!(store.edge_count(), 1);

	store.remove("b");
	let snapshot = store.snapshot();
	for edge in snapshot.edges() {
		assert!(snapshot.node(&edge.from).is_some() && snapshot.node(&edge.to).is_some());
	}
}

#[test]
fn reversed_edges_load_once() {
	let mut session = session();
	let report = session.load_delta(Delta {
		nodes: vec![
			Node::new("A", "A", NodeCategory::Phone),
			Node::new("B", "B", NodeCategory::Phone),
		],
		edges: vec![
			Edge::new("A", "B", RelationType::Knows),
			Edge::new("B", "A", RelationType::Knows),
		],
	});
	assert_eq!(report.edges_added, 1);
	assert_eq!(session.store().edge_count(), 1);
	assert_eq!(session.port().last().edges.len(), 1);
}

#[test]
fn communities_from_payload() {
	let mut session = session();
	show(
		&mut session,
		"target",
		json!({"nodes": [{"id": "A"}, {"id": "B"}], "edges": []}),
	);
	let count = session
		.show_communities(&json!({"communities": [{"members": ["A"]}, {"members": ["B"]}]}))
		.unwrap();
	assert_eq!(count, 2);

	let colors: Vec<Color> = session.port().last().nodes.iter().map(|(_, s)| s.color).collect();
	assert_ne!(colors[0], colors[1]);
}

#[test]
fn force_layout_session_frames_result() {
	let config = VizConfig::default();
	let mut session = GraphSession::new(ForceLayout::new(&config.layout, 1024.0, 768.0), &config);
	let envelope: AnalysisResult = serde_json::from_value(json!({
		"kind": "collision",
		"result": {
			"common_contacts": [{"person1": "A", "person2": "B", "common_phones": ["1", "2"]}],
			"hot_numbers": [{"number": "1", "owners": ["A", "B"]}],
			"person_relations": [{"person1": "A", "person2": "B", "shared_contacts": 2, "relation_strength": "中"}]
		}
	}))
	.unwrap();
	session.show(&envelope).unwrap();

	let layout = session.port();
	assert_eq!(layout.node_count(), 3);
	assert_eq!(layout.edges().len(), session.store().edge_count());
	assert!(layout.transform.k > 0.0);
	for node in session.store().nodes() {
		let (gx, gy) = layout.position(&node.id).unwrap();
		let (sx, sy) = layout.graph_to_screen(gx, gy);
		assert!((0.0..=1024.0).contains(&sx) && (0.0..=768.0).contains(&sy));
	}
}
