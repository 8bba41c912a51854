//! Component error types.

use std::fmt;

use thiserror::Error;

/// Error type returned by component operations.
///
/// Operations may fail with any error; the component wraps it into
/// [`ComponentError::Operation`] together with the output being built.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What kind of slot a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
  Input,
  Output,
}

impl fmt::Display for LookupKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LookupKind::Input => f.write_str("input"),
      LookupKind::Output => f.write_str("output"),
    }
  }
}

/// Errors raised by the component contract.
#[derive(Debug, Error)]
pub enum ComponentError {
  /// Bad wiring or bad declarations (connecting to a non-output operation,
  /// duplicate or empty names, incompatible types, reserved keys).
  #[error("invalid configuration for {component}: {message}")]
  Configuration { component: String, message: String },

  /// Unknown input or output name.
  #[error("{kind} '{name}' not found in {component}")]
  NotFound {
    kind: LookupKind,
    name: String,
    component: String,
  },

  /// An output declares no producing operation.
  #[error("output '{output}' of {component} does not have a method defined")]
  OutputMethodMissing { component: String, output: String },

  /// An output names an operation the definition does not provide.
  #[error("method '{method}' is not defined on {component}")]
  MethodNotFound { component: String, method: String },

  /// Attribute lookup exhausted every fallback.
  #[error("attribute '{name}' not found in {component}")]
  AttributeNotFound { component: String, name: String },

  /// An output operation failed while executing.
  #[error("operation '{method}' of {component} failed: {source}")]
  Operation {
    component: String,
    method: String,
    #[source]
    source: BoxError,
  },
}

impl ComponentError {
  /// Create a configuration error.
  pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Configuration {
      component: component.into(),
      message: message.into(),
    }
  }

  pub(crate) fn input_not_found(component: &str, name: &str) -> Self {
    Self::NotFound {
      kind: LookupKind::Input,
      name: name.to_string(),
      component: component.to_string(),
    }
  }

  pub(crate) fn output_not_found(component: &str, name: &str) -> Self {
    Self::NotFound {
      kind: LookupKind::Output,
      name: name.to_string(),
      component: component.to_string(),
    }
  }
}
