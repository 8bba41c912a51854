use serde::Serialize;

use crate::error::BuildFailure;

/// How far a run got.
///
/// A run always ends with the finish event; this tells a clean completion
/// apart from a partial one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
  /// Vertices that were built, in build order.
  pub completed: Vec<String>,
  pub failed: Vec<BuildFailure>,
  /// Vertices that never became ready.
  pub unreached: Vec<String>,
}

impl RunOutcome {
  pub fn is_complete(&self) -> bool {
    self.failed.is_empty() && self.unreached.is_empty()
  }
}
