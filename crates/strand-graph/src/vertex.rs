use serde::{Deserialize, Serialize};
use strand_component::Component;

use crate::error::BuildFailure;

/// Build state of a vertex.
///
/// `Pending -> Ready -> Running -> Done`, or `Running -> Failed`. A failed
/// vertex is terminal and its dependents stay pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexState {
  Pending,
  Ready,
  Running,
  Done,
  Failed,
}

/// A graph-owned component.
#[derive(Debug, Clone)]
pub struct Vertex {
  pub(crate) id: String,
  pub(crate) component: Component,
  pub(crate) predecessors: Vec<String>,
  pub(crate) successors: Vec<String>,
  pub(crate) state: VertexState,
  pub(crate) failure: Option<BuildFailure>,
}

impl Vertex {
  pub(crate) fn new(id: String, component: Component) -> Self {
    Self {
      id,
      component,
      predecessors: Vec::new(),
      successors: Vec::new(),
      state: VertexState::Pending,
      failure: None,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn component(&self) -> &Component {
    &self.component
  }

  /// Ids of the vertices this one depends on.
  pub fn predecessors(&self) -> &[String] {
    &self.predecessors
  }

  /// Ids of the vertices depending on this one.
  pub fn successors(&self) -> &[String] {
    &self.successors
  }

  pub fn state(&self) -> VertexState {
    self.state
  }

  /// The failure of the last build, if it failed.
  pub fn failure(&self) -> Option<&BuildFailure> {
    self.failure.as_ref()
  }

  pub(crate) fn link(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
      list.push(id.to_string());
    }
  }
}
