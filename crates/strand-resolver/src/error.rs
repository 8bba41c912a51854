use strand_component::ComponentError;
use strand_component_registry::RegistryError;
use strand_graph::GraphError;
use thiserror::Error;

/// Errors that can occur while resolving a flow into a graph.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// Component not found in the registry.
  #[error("component not found: {name}")]
  ComponentNotFound { name: String },

  /// Invalid edge reference (node doesn't exist).
  #[error("invalid edge: node '{node_id}' does not exist")]
  InvalidEdge { node_id: String },

  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  /// A node's parameters were rejected by its component.
  #[error("failed to configure node '{node_id}': {source}")]
  Component {
    node_id: String,
    #[source]
    source: ComponentError,
  },

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("registry error: {0}")]
  Registry(#[from] RegistryError),
}
