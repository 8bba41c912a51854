//! Wiring between components.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::ComponentError;
use crate::output::Output;
use crate::payload::Payload;

/// Latest published state of a component, shared with the references taken
/// from it. Empty until the component is first referenced.
pub(crate) type LiveCell = Arc<RwLock<Option<Component>>>;

pub(crate) fn publish(cell: &LiveCell, state: Component) {
  *cell.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
}

/// A reference to the operation behind another component's output.
///
/// Created with [`Component::reference`]. The reference follows the producing
/// component: wiring or literals set on the producer after the reference was
/// taken are visible through it. A standalone run resolves a connected input
/// by running the producer's current state, and a graph discovers the
/// producer's own upstream from it.
#[derive(Clone)]
pub struct OutputReference {
  owner_id: String,
  owner_name: String,
  method: String,
  output: Option<Output>,
  producer: LiveCell,
}

impl OutputReference {
  pub(crate) fn new(producer: &Component, method: &str) -> Self {
    let output = producer
      .list_outputs()
      .iter()
      .find(|o| o.method.as_deref() == Some(method))
      .cloned();

    Self {
      owner_id: producer.id().to_string(),
      owner_name: producer.display_name().to_string(),
      method: method.to_string(),
      output,
      producer: producer.live().clone(),
    }
  }

  /// Id of the component owning the referenced operation.
  pub fn owner_id(&self) -> &str {
    &self.owner_id
  }

  pub fn owner_name(&self) -> &str {
    &self.owner_name
  }

  pub fn method(&self) -> &str {
    &self.method
  }

  /// The declared output backed by the referenced operation, if any.
  pub fn output(&self) -> Option<&Output> {
    self.output.as_ref()
  }

  /// A copy of the producer as it is now.
  pub fn producer(&self) -> Option<Component> {
    self
      .producer
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Run the producer standalone and return the referenced output's value.
  pub fn resolve(&self) -> BoxFuture<'_, Result<Payload, ComponentError>> {
    Box::pin(async move {
      let output = self.output.as_ref().ok_or_else(|| {
        ComponentError::configuration(
          &self.owner_name,
          format!("method {} is not a valid output", self.method),
        )
      })?;
      let mut producer = self
        .producer()
        .ok_or_else(|| ComponentError::output_not_found(&self.owner_name, &output.name))?;
      let (mut results, _) = producer.run().await?;
      results
        .remove(&output.name)
        .ok_or_else(|| ComponentError::output_not_found(&self.owner_name, &output.name))
    })
  }
}

impl fmt::Debug for OutputReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OutputReference")
      .field("owner_id", &self.owner_id)
      .field("method", &self.method)
      .field("output", &self.output.as_ref().map(|o| &o.name))
      .finish()
  }
}

/// A dependency recorded by wiring, not yet attached to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
  pub source_id: String,
  pub source_output: String,
  pub output_types: Vec<String>,
  pub target_id: String,
  pub target_input: String,
  pub input_types: Vec<String>,
  pub field_type: String,
}
