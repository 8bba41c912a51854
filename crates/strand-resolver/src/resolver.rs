use std::collections::HashSet;

use async_trait::async_trait;
use strand_component::{Component, Param, Payload};
use strand_component_registry::ComponentRegistry;
use strand_config::{EdgeDef, FlowDef, NodeDef};
use strand_graph::{Graph, GraphNotifier, NoopNotifier};
use tracing::debug;

use crate::error::ResolveError;

/// Resolver turns a FlowDef into a prepared Graph.
#[async_trait]
pub trait Resolver: Send + Sync {
  /// Resolve a flow definition into a graph ready to run.
  ///
  /// This process:
  /// 1. Validates node ids and edge references
  /// 2. Instantiates every node from its registered component
  /// 3. Wires the edges and prepares the ready queue (rejecting cycles)
  async fn resolve(&self, def: FlowDef) -> Result<Graph, ResolveError>;
}

/// Standard resolver implementation that uses a component registry.
pub struct StandardResolver<R: ComponentRegistry> {
  registry: R,
}

impl<R: ComponentRegistry> StandardResolver<R> {
  pub fn new(registry: R) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &R {
    &self.registry
  }

  /// Resolve a flow into a graph that pushes its events to `notifier`.
  pub async fn resolve_with_notifier<N: GraphNotifier>(
    &self,
    def: FlowDef,
    notifier: N,
  ) -> Result<Graph<N>, ResolveError> {
    let node_ids = self.validate_nodes(&def.nodes)?;
    self.validate_edges(&node_ids, &def.edges)?;

    let mut graph = Graph::with_notifier(notifier).with_flow_id(def.flow_id.clone());
    for node in def.nodes {
      let node_id = node.id.clone();
      let component = self.instantiate(node).await?;
      graph.add_component(node_id, component)?;
    }
    for edge in &def.edges {
      graph.add_component_edge(
        &edge.source,
        (&edge.source_output, &edge.target_input),
        &edge.target,
      )?;
    }
    graph.prepare()?;

    debug!(
      flow_id = %def.flow_id,
      vertices = graph.vertices().len(),
      edges = graph.edges().len(),
      "flow_resolved"
    );
    Ok(graph)
  }

  /// Ensure node ids are unique.
  fn validate_nodes(&self, nodes: &[NodeDef]) -> Result<HashSet<String>, ResolveError> {
    let mut node_ids = HashSet::new();
    for node in nodes {
      if !node_ids.insert(node.id.clone()) {
        return Err(ResolveError::DuplicateNodeId {
          node_id: node.id.clone(),
        });
      }
    }
    Ok(node_ids)
  }

  /// Validate that all edges reference existing nodes.
  fn validate_edges(&self, node_ids: &HashSet<String>, edges: &[EdgeDef]) -> Result<(), ResolveError> {
    for edge in edges {
      for node_id in [&edge.source, &edge.target] {
        if !node_ids.contains(node_id) {
          return Err(ResolveError::InvalidEdge {
            node_id: node_id.clone(),
          });
        }
      }
    }
    Ok(())
  }

  async fn instantiate(&self, node: NodeDef) -> Result<Component, ResolveError> {
    let definition = self
      .registry
      .get(&node.component)
      .await?
      .ok_or_else(|| ResolveError::ComponentNotFound {
        name: node.component.clone(),
      })?;

    let mut params: Vec<(String, Param)> = vec![("_id".to_string(), Param::from(node.id.as_str()))];
    if let Some(display_name) = node.display_name {
      params.push(("_display_name".to_string(), Param::from(display_name)));
    }
    params.extend(
      node
        .params
        .into_iter()
        .map(|(key, value)| (key, Param::Value(Payload::from(value)))),
    );

    Component::with_config(&definition, params).map_err(|source| ResolveError::Component {
      node_id: node.id,
      source,
    })
  }
}

#[async_trait]
impl<R: ComponentRegistry> Resolver for StandardResolver<R> {
  async fn resolve(&self, def: FlowDef) -> Result<Graph, ResolveError> {
    self.resolve_with_notifier(def, NoopNotifier).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use strand_component_registry::InMemoryRegistry;
  use strand_graph::{GraphError, GraphEvent};

  fn resolver() -> StandardResolver<InMemoryRegistry> {
    StandardResolver::new(InMemoryRegistry::with_builtins().unwrap())
  }

  fn flow(value: serde_json::Value) -> FlowDef {
    serde_json::from_value(value).unwrap()
  }

  fn chat_flow() -> FlowDef {
    flow(json!({
      "flow_id": "flow-1",
      "nodes": [
        { "id": "chat_input", "component": "ChatInput", "params": { "input_value": "hello" } },
        { "id": "chat_output", "component": "ChatOutput" }
      ],
      "edges": [
        { "source": "chat_input", "source_output": "message",
          "target": "chat_output", "target_input": "input_value" }
      ]
    }))
  }

  #[tokio::test]
  async fn test_resolve_prepares_queue() {
    let mut graph = resolver().resolve(chat_flow()).await.unwrap();

    assert_eq!(graph.run_queue(), &["chat_input"]);
    graph.step().await.unwrap();
    assert_eq!(graph.run_queue(), &["chat_output"]);
  }

  #[tokio::test]
  async fn test_resolved_flow_runs_to_finish() {
    let mut graph = resolver().resolve(chat_flow()).await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = graph.next_event().await.unwrap() {
      events.push(event);
    }

    assert_eq!(events.len(), 3);
    assert_eq!(events[2], GraphEvent::Finish);
    let output = graph.component("chat_output").unwrap();
    match &output.results()["message"] {
      strand_component::Payload::Message(message) => {
        assert_eq!(message.text, "hello");
        assert_eq!(message.flow_id.as_deref(), Some("flow-1"));
      }
      other => panic!("expected message, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_resolve_fails_on_missing_component() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [{ "id": "a", "component": "DoesNotExist" }]
    }));

    let result = resolver().resolve(def).await;
    assert!(matches!(result, Err(ResolveError::ComponentNotFound { name }) if name == "DoesNotExist"));
  }

  #[tokio::test]
  async fn test_resolve_fails_on_invalid_edge() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [{ "id": "a", "component": "TextInput" }],
      "edges": [{ "source": "a", "source_output": "text", "target": "ghost", "target_input": "input_value" }]
    }));

    let result = resolver().resolve(def).await;
    assert!(matches!(result, Err(ResolveError::InvalidEdge { node_id }) if node_id == "ghost"));
  }

  #[tokio::test]
  async fn test_resolve_fails_on_duplicate_node_id() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [
        { "id": "a", "component": "TextInput" },
        { "id": "a", "component": "TextOutput" }
      ]
    }));

    let result = resolver().resolve(def).await;
    assert!(matches!(result, Err(ResolveError::DuplicateNodeId { .. })));
  }

  #[tokio::test]
  async fn test_resolve_fails_on_cycle() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [
        { "id": "a", "component": "TextOutput" },
        { "id": "b", "component": "TextOutput" }
      ],
      "edges": [
        { "source": "a", "source_output": "text", "target": "b", "target_input": "input_value" },
        { "source": "b", "source_output": "text", "target": "a", "target_input": "input_value" }
      ]
    }));

    let result = resolver().resolve(def).await;
    assert!(matches!(result, Err(ResolveError::Graph(GraphError::Cycle { .. }))));
  }

  #[tokio::test]
  async fn test_resolve_fails_on_unknown_output() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [
        { "id": "a", "component": "TextInput" },
        { "id": "b", "component": "TextOutput" }
      ],
      "edges": [
        { "source": "a", "source_output": "nope", "target": "b", "target_input": "input_value" }
      ]
    }));

    let result = resolver().resolve(def).await;
    assert!(matches!(result, Err(ResolveError::Graph(GraphError::Component(_)))));
  }

  #[tokio::test]
  async fn test_display_name_and_config_params() {
    let def = flow(json!({
      "flow_id": "f",
      "nodes": [{
        "id": "a",
        "component": "TextInput",
        "display_name": "Prompt",
        "params": { "input_value": "x", "_user_id": "user-1" }
      }]
    }));

    let graph = resolver().resolve(def).await.unwrap();
    let component = graph.component("a").unwrap();
    assert_eq!(component.display_name(), "Prompt");
    assert_eq!(component.user_id(), Some("user-1"));
    assert_eq!(component.id(), "a");
  }
}
