//! Per-component log buffer.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;
use crate::payload::Payload;

/// A log entry written by an operation while an output was being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
  pub name: String,
  pub message: Payload,
  #[serde(rename = "type")]
  pub kind: ArtifactKind,
}

impl Log {
  pub fn new(name: impl Into<String>, message: impl Into<Payload>) -> Self {
    let message = message.into();
    Self {
      name: name.into(),
      kind: ArtifactKind::of(&message),
      message,
    }
  }
}

/// Transient state an operation may write while it runs.
///
/// Seeded from the component before each output is built and written back
/// afterwards; the log entries are flushed into the output's log slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scratch {
  pub(crate) logs: Vec<Log>,
  pub(crate) status: Option<Payload>,
  pub(crate) repr: Option<Payload>,
}
