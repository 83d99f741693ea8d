//! Adapters from backend analysis results to a canonical [`Delta`].
//!
//! Each adapter reads one result shape and never touches a store. Records it
//! cannot use are skipped and reported in [`Adapted::rejected`]; only a payload
//! missing one of its required arrays fails the whole call.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::graph::color::ColorAssigner;
use crate::graph::ident::IdentityCodec;
use crate::graph::types::{Delta, NodeCategory};

pub mod collision;
pub mod expansion;
pub mod highlight;
pub mod target;

/// Session state an adapter may draw on: dynamic colors and edge discriminators.
pub struct AdapterContext<'a> {
	pub colors: &'a mut ColorAssigner,
	pub codec: &'a mut IdentityCodec,
}

/// Adapter output.
#[derive(Debug, Default)]
pub struct Adapted {
	pub delta: Delta,
	/// Records skipped as unusable.
	pub rejected: Vec<Error>,
	/// Set for a valid result that holds no relationships to show.
	pub empty: bool,
}

/// An analysis result tagged with its shape, as embedded in a page or cached.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum AnalysisResult {
	Target(Value),
	Collision(Value),
	Expansion(Value),
}

impl AnalysisResult {
	/// Runs the adapter matching this result's shape.
	pub fn adapt(&self, ctx: &mut AdapterContext<'_>) -> Result<Adapted> {
		match self {
			Self::Target(payload) => target::adapt(payload, ctx),
			Self::Collision(payload) => collision::adapt(payload, ctx),
			Self::Expansion(payload) => expansion::adapt(payload, NodeCategory::Phone, ctx),
		}
	}
}

/// The named top-level array, or [`Error::MalformedResult`] if absent.
///
/// `null` counts as absent; an empty array is valid.
pub(crate) fn required_array<'v>(
	payload: &'v Value,
	shape: &'static str,
	field: &'static str,
) -> Result<&'v [Value]> {
	payload
		.get(field)
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.ok_or(Error::MalformedResult { shape, field })
}

/// A record as an object, or an `InvalidRecord` naming `kind`.
pub(crate) fn object<'v>(record: &'v Value, kind: &'static str) -> Result<&'v Map<String, Value>> {
	record
		.as_object()
		.ok_or_else(|| Error::invalid(kind, "record is not an object"))
}

/// First non-empty string or number among `fields`.
pub(crate) fn first_key(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
	fields
		.iter()
		.find_map(|f| crate::graph::ident::scalar(record.get(*f)))
}

/// Reads a record into `T`, reporting a decode failure as an invalid record.
pub(crate) fn decode<T: DeserializeOwned>(record: &Value, kind: &'static str) -> Result<T> {
	T::deserialize(record).map_err(|e| Error::invalid(kind, e.to_string()))
}
