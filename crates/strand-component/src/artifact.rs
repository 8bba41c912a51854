//! Artifact derivation.
//!
//! An artifact is the UI and trace friendly view of an output's raw result:
//! a string representation, a normalized JSON value and a coarse kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::Payload;

/// Coarse shape of an artifact's underlying value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  Text,
  Object,
  Array,
  Message,
  Unknown,
}

impl ArtifactKind {
  /// Infer the kind from a payload's shape.
  pub fn of(payload: &Payload) -> Self {
    match payload {
      Payload::Data(_) => ArtifactKind::Object,
      Payload::Message(_) => ArtifactKind::Message,
      Payload::Json(Value::String(_)) => ArtifactKind::Text,
      Payload::Json(Value::Object(_)) => ArtifactKind::Object,
      Payload::Json(Value::Array(_)) => ArtifactKind::Array,
      Payload::Json(_) => ArtifactKind::Unknown,
    }
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ArtifactKind::Text => "text",
      ArtifactKind::Object => "object",
      ArtifactKind::Array => "array",
      ArtifactKind::Message => "message",
      ArtifactKind::Unknown => "unknown",
    };
    f.write_str(s)
  }
}

/// Derived representation of an output result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
  pub repr: String,
  pub raw: Value,
  #[serde(rename = "type")]
  pub kind: ArtifactKind,
}

impl Artifact {
  /// Derive an artifact from a result.
  ///
  /// The representation prefers the explicit custom representation, then the
  /// component status, then the result itself. The raw value and the kind
  /// come from the status when one is set, otherwise from the result.
  pub fn derive(result: &Payload, status: Option<&Payload>, custom_repr: Option<&Payload>) -> Self {
    let explicit = custom_repr.filter(|repr| repr.as_str() != Some(""));
    let repr = render(explicit.or(status).unwrap_or(result));

    let artifact_value = status.unwrap_or(result);
    let kind = ArtifactKind::of(artifact_value);
    let raw = match artifact_value {
      Payload::Json(Value::Null) => Value::String(repr.clone()),
      other => other.to_json(),
    };
    let raw = match (kind, raw) {
      (ArtifactKind::Unknown, Value::String(s)) => Value::String(s),
      (ArtifactKind::Unknown, value) => Value::String(value.to_string()),
      (_, value) => value,
    };

    Self { repr, raw, kind }
  }
}

/// Stringify a payload for display. Records render as pretty JSON.
fn render(payload: &Payload) -> String {
  match payload {
    Payload::Json(Value::String(s)) => s.clone(),
    Payload::Json(value @ (Value::Object(_) | Value::Array(_))) => {
      serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
    Payload::Json(value) => value.to_string(),
    Payload::Data(data) => serde_json::to_string_pretty(&Value::Object(data.data.clone()))
      .unwrap_or_else(|_| payload.text()),
    Payload::Message(message) => message.text.clone(),
  }
}
