use serde::{Deserialize, Serialize};
use strand_component::ComponentError;
use thiserror::Error;

/// Errors raised by graph construction and stepping.
#[derive(Debug, Error)]
pub enum GraphError {
  /// The ready queue is empty while vertices are still not done, or it was
  /// never seeded with `prepare`.
  #[error("graph is not prepared: ready queue is empty with {pending} vertices not done")]
  NotPrepared { pending: usize },

  /// Every vertex is done; there is nothing left to step.
  #[error("graph has no vertices left to run")]
  Drained,

  #[error("vertex not found: {vertex_id}")]
  UnknownVertex { vertex_id: String },

  #[error("duplicate vertex id: {vertex_id}")]
  DuplicateVertex { vertex_id: String },

  /// An edge cannot be wired.
  #[error("invalid edge from '{source_id}' to '{target_id}': {message}")]
  Configuration {
    source_id: String,
    target_id: String,
    message: String,
  },

  #[error("cycle detected in graph at vertex '{vertex_id}'")]
  Cycle { vertex_id: String },

  #[error(transparent)]
  Component(#[from] ComponentError),
}

/// A failed vertex build, carried on the vertex's progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("vertex '{vertex_id}' failed: {message}")]
pub struct BuildFailure {
  pub vertex_id: String,
  pub message: String,
}
