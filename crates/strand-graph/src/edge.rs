use serde::{Deserialize, Serialize};

/// A directed dependency from a source output to a target input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub source_id: String,
  pub source_output: String,
  /// Types declared by the source output.
  pub output_types: Vec<String>,
  pub target_id: String,
  pub target_input: String,
  /// Types accepted by the target input.
  pub input_types: Vec<String>,
}

impl Edge {
  /// Whether this edge connects the same output to the same input.
  pub fn same_endpoints(&self, other: &Edge) -> bool {
    self.source_id == other.source_id
      && self.source_output == other.source_output
      && self.target_id == other.target_id
      && self.target_input == other.target_input
  }
}
