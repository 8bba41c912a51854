use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDef {
  pub flow_id: String,
  #[serde(default)]
  pub name: String,
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

impl FlowDef {
  /// Parse a flow definition from JSON.
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_minimal_flow() {
    let flow = FlowDef::from_json(
      r#"{
        "flow_id": "f",
        "nodes": [{ "id": "a", "component": "TextInput" }]
      }"#,
    )
    .unwrap();

    assert_eq!(flow.flow_id, "f");
    assert_eq!(flow.name, "");
    assert!(flow.edges.is_empty());
    assert!(flow.nodes[0].params.is_empty());
    assert_eq!(flow.nodes[0].display_name, None);
  }

  #[test]
  fn test_parse_params_and_edges() {
    let flow: FlowDef = serde_json::from_value(json!({
      "flow_id": "f",
      "name": "Greeting",
      "nodes": [
        { "id": "in", "component": "ChatInput", "params": { "input_value": "hi", "_user_id": "u" } },
        { "id": "out", "component": "ChatOutput" }
      ],
      "edges": [
        { "source": "in", "source_output": "message", "target": "out", "target_input": "input_value" }
      ]
    }))
    .unwrap();

    assert_eq!(flow.nodes[0].params["input_value"], json!("hi"));
    assert_eq!(flow.nodes[0].params["_user_id"], json!("u"));
    assert_eq!(
      flow.edges[0],
      EdgeDef {
        source: "in".to_string(),
        source_output: "message".to_string(),
        target: "out".to_string(),
        target_input: "input_value".to_string(),
      }
    );
  }

  #[test]
  fn test_missing_nodes_rejected() {
    assert!(FlowDef::from_json(r#"{ "flow_id": "f" }"#).is_err());
  }

  #[test]
  fn test_serialize_skips_empty_fields() {
    let flow = FlowDef {
      flow_id: "f".to_string(),
      name: String::new(),
      nodes: vec![NodeDef {
        id: "a".to_string(),
        component: "TextInput".to_string(),
        params: Default::default(),
        display_name: None,
      }],
      edges: Vec::new(),
    };
    let value = serde_json::to_value(&flow).unwrap();
    assert_eq!(value["nodes"][0], json!({ "id": "a", "component": "TextInput" }));
  }
}
