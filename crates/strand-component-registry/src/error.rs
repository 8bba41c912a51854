use strand_component::ComponentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("component already registered: {name}")]
  Duplicate { name: String },

  #[error("invalid component definition: {0}")]
  Definition(#[from] ComponentError),
}
