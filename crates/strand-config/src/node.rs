use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  /// Vertex id, unique within the flow.
  pub id: String,
  /// Registered component name, e.g. "ChatInput".
  pub component: String,
  /// Construction parameters. Keys starting with `_` are configuration,
  /// everything else sets an input.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub params: BTreeMap<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
}
