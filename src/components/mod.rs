//! Drawing components.

pub mod force_graph;
