use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use strand_component::Definition;

use crate::error::RegistryError;

/// Listing entry for a registered component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
  pub name: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub description: String,
  pub inputs: Vec<String>,
  pub outputs: Vec<String>,
}

impl ComponentSummary {
  pub fn of(definition: &Definition) -> Self {
    Self {
      name: definition.name().to_string(),
      description: definition.description().to_string(),
      inputs: definition.inputs().iter().map(|i| i.name.clone()).collect(),
      outputs: definition.outputs().iter().map(|o| o.name.clone()).collect(),
    }
  }
}

/// Maps component names to their definitions.
#[async_trait]
pub trait ComponentRegistry: Send + Sync {
  /// Get a component definition by name.
  async fn get(&self, name: &str) -> Result<Option<Arc<Definition>>, RegistryError>;

  /// List all registered components, sorted by name.
  async fn list(&self) -> Result<Vec<ComponentSummary>, RegistryError>;
}
