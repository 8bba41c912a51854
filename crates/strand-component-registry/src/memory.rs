use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use strand_component::Definition;
use tracing::debug;

use crate::builtin::builtins;
use crate::error::RegistryError;
use crate::registry::{ComponentRegistry, ComponentSummary};

/// In-memory component registry.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
  definitions: RwLock<BTreeMap<String, Arc<Definition>>>,
}

impl InMemoryRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a registry holding the built-in components.
  pub fn with_builtins() -> Result<Self, RegistryError> {
    let registry = Self::new();
    for definition in builtins()? {
      registry.register(definition)?;
    }
    Ok(registry)
  }

  /// Register a definition under its name.
  pub fn register(&self, definition: Arc<Definition>) -> Result<(), RegistryError> {
    let mut definitions = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
    let name = definition.name().to_string();
    if definitions.contains_key(&name) {
      return Err(RegistryError::Duplicate { name });
    }
    debug!(component = %name, "component_registered");
    definitions.insert(name, definition);
    Ok(())
  }
}

#[async_trait]
impl ComponentRegistry for InMemoryRegistry {
  async fn get(&self, name: &str) -> Result<Option<Arc<Definition>>, RegistryError> {
    let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
    Ok(definitions.get(name).cloned())
  }

  async fn list(&self) -> Result<Vec<ComponentSummary>, RegistryError> {
    let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
    Ok(definitions.values().map(|d| ComponentSummary::of(d)).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use strand_component::Output;

  fn definition(name: &str) -> Arc<Definition> {
    Definition::builder(name)
      .output(Output::new("out", "run"))
      .operation("run", &["Text"], |_| Ok("x".into()))
      .build()
      .unwrap()
  }

  #[tokio::test]
  async fn test_register_and_get() {
    let registry = InMemoryRegistry::new();
    registry.register(definition("A")).unwrap();

    let found = registry.get("A").await.unwrap().unwrap();
    assert_eq!(found.name(), "A");
    assert!(registry.get("B").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_duplicate_rejected() {
    let registry = InMemoryRegistry::new();
    registry.register(definition("A")).unwrap();
    let result = registry.register(definition("A"));
    assert!(matches!(result, Err(RegistryError::Duplicate { name }) if name == "A"));
  }

  #[tokio::test]
  async fn test_list_sorted_by_name() {
    let registry = InMemoryRegistry::new();
    registry.register(definition("B")).unwrap();
    registry.register(definition("A")).unwrap();

    let names: Vec<String> = registry.list().await.unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "B"]);
  }

  #[tokio::test]
  async fn test_with_builtins() {
    let registry = InMemoryRegistry::with_builtins().unwrap();
    for name in ["ChatInput", "ChatOutput", "CombineText", "TextInput", "TextOutput"] {
      assert!(registry.get(name).await.unwrap().is_some(), "missing {}", name);
    }
  }
}
