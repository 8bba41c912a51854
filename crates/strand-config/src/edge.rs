use serde::{Deserialize, Serialize};

/// Wires `source`'s output into `target`'s input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDef {
  pub source: String,
  pub source_output: String,
  pub target: String,
  pub target_input: String,
}
