//! Authoritative node/edge collection.
//!
//! Invariants held after every operation:
//! - no two nodes share an id, and the first insert of an id wins;
//! - no two edges share an id;
//! - every edge's endpoints are present.

use std::collections::HashMap;

use log::{debug, warn};

use super::types::{Delta, Edge, Node, Snapshot};
use crate::error::{Error, Result};

/// Outcome of applying a [`Delta`].
#[derive(Debug, Default)]
pub struct ApplyReport {
	pub nodes_added: usize,
	pub edges_added: usize,
	/// Edges refused because an endpoint was missing.
	pub rejected: Vec<Error>,
}

/// Insertion-ordered node and edge store with id indexes.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	node_index: HashMap<String, usize>,
	edges: Vec<Edge>,
	edge_index: HashMap<String, usize>,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `node` unless its id is taken. Returns whether it was inserted.
	pub fn add(&mut self, node: Node) -> bool {
		if self.node_index.contains_key(&node.id) {
			debug!("store: node {} already present, keeping first", node.id);
			return false;
		}
		self.node_index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		true
	}

	/// Adds each node in order. Returns how many were new.
	pub fn add_many(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
		nodes.into_iter().map(|n| self.add(n)).filter(|&added| added).count()
	}

	/// Inserts `edge` if both endpoints exist and its id is not taken.
	///
	/// Returns `Ok(false)` for a duplicate id and [`Error::DanglingEndpoint`]
	/// when an endpoint is missing; the store is unchanged in both cases.
	pub fn add_edge(&mut self, edge: Edge) -> Result<bool> {
		for endpoint in [&edge.from, &edge.to] {
			if !self.node_index.contains_key(endpoint) {
				return Err(Error::DanglingEndpoint {
					edge: edge.id.clone(),
					endpoint: endpoint.clone(),
				});
			}
		}
		if self.edge_index.contains_key(&edge.id) {
			debug!("store: edge {} already present", edge.id);
			return Ok(false);
		}
		self.edge_index.insert(edge.id.clone(), self.edges.len());
		self.edges.push(edge);
		Ok(true)
	}

	/// Applies nodes first, then edges, skipping edges that cannot be placed.
	pub fn apply(&mut self, delta: Delta) -> ApplyReport {
		let mut report = ApplyReport {
			nodes_added: self.add_many(delta.nodes),
			..ApplyReport::default()
		};
		for edge in delta.edges {
			match self.add_edge(edge) {
				Ok(true) => report.edges_added += 1,
				Ok(false) => {}
				Err(err) => {
					warn!("store: {err}");
					report.rejected.push(err);
				}
			}
		}
		report
	}

	/// Removes a node and every edge touching it.
	pub fn remove(&mut self, id: &str) -> Option<Node> {
		let idx = self.node_index.remove(id)?;
		let node = self.nodes.remove(idx);
		for (i, n) in self.nodes.iter().enumerate().skip(idx) {
			self.node_index.insert(n.id.clone(), i);
		}

		let before = self.edges.len();
		self.edges.retain(|e| !e.touches(id));
		if self.edges.len() != before {
			self.edge_index = self
				.edges
				.iter()
				.enumerate()
				.map(|(i, e)| (e.id.clone(), i))
				.collect();
		}
		Some(node)
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.node_index.clear();
		self.edges.clear();
		self.edge_index.clear();
	}

	/// Owned copy of the current contents.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot::new(self.nodes.clone(), self.edges.clone())
	}

	/// Ids of matching nodes, in insertion order.
	pub fn find(&self, mut predicate: impl FnMut(&Node) -> bool) -> Vec<String> {
		self.nodes
			.iter()
			.filter(|n| predicate(n))
			.map(|n| n.id.clone())
			.collect()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edge_index.get(id).map(|&i| &self.edges[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.node_index.contains_key(id)
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
