//! Error types for relgraph.
//!
//! Only [`Error::MalformedResult`], [`Error::Config`] and [`Error::Json`] abort
//! an operation. [`Error::InvalidRecord`] and [`Error::DanglingEndpoint`] are
//! reported per unit while the surrounding batch keeps going.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	/// A source record resolved to no usable identifier.
	#[error("invalid {kind} record: {reason}")]
	InvalidRecord { kind: &'static str, reason: String },

	/// An edge referenced a node that is not in the store.
	#[error("edge {edge} references missing node {endpoint}")]
	DanglingEndpoint { edge: String, endpoint: String },

	/// A payload lacked one of the arrays its shape requires.
	#[error("malformed {shape} result: missing `{field}` array")]
	MalformedResult {
		shape: &'static str,
		field: &'static str,
	},

	#[error("configuration error: {0}")]
	Config(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub(crate) fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidRecord {
			kind,
			reason: reason.into(),
		}
	}

	/// True for errors that describe one skipped unit rather than a failed call.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::InvalidRecord { .. } | Self::DanglingEndpoint { .. })
	}
}
