//! Progress events and notifiers.
//!
//! Every step of a run produces a [`GraphEvent::Vertex`]; a run ends with
//! exactly one [`GraphEvent::Finish`]. Notifiers receive the same events the
//! pull API returns, for consumers that want them pushed (UI streams,
//! persistence, logs).

use serde::{Deserialize, Serialize};
use strand_component::{ArtifactMap, ResultMap};
use tokio::sync::mpsc;

use crate::error::BuildFailure;
use crate::vertex::VertexState;

/// Progress of one vertex build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexEvent {
  pub vertex_id: String,
  pub state: VertexState,
  #[serde(default)]
  pub results: ResultMap,
  #[serde(default)]
  pub artifacts: ArtifactMap,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<BuildFailure>,
}

impl VertexEvent {
  pub fn is_failure(&self) -> bool {
    self.error.is_some()
  }
}

/// An event produced by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
  /// A vertex finished building, successfully or not.
  Vertex(VertexEvent),
  /// The ready queue drained. Emitted once per run.
  Finish,
}

impl GraphEvent {
  pub fn is_finish(&self) -> bool {
    matches!(self, GraphEvent::Finish)
  }

  /// Id of the vertex this event reports on.
  pub fn vertex_id(&self) -> Option<&str> {
    match self {
      GraphEvent::Vertex(event) => Some(&event.vertex_id),
      GraphEvent::Finish => None,
    }
  }
}

/// Receives graph events as they are produced.
pub trait GraphNotifier: Send + Sync {
  fn notify(&self, event: GraphEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl GraphNotifier for NoopNotifier {
  fn notify(&self, _event: GraphEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<GraphEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<GraphEvent>) -> Self {
    Self { sender }
  }
}

impl GraphNotifier for ChannelNotifier {
  fn notify(&self, event: GraphEvent) {
    // The receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_finish_serializes_as_tag() {
    let value = serde_json::to_value(GraphEvent::Finish).unwrap();
    assert_eq!(value, json!({ "event": "finish" }));
  }

  #[test]
  fn test_vertex_event_serializes_flat() {
    let event = GraphEvent::Vertex(VertexEvent {
      vertex_id: "a".to_string(),
      state: VertexState::Failed,
      results: ResultMap::new(),
      artifacts: ArtifactMap::new(),
      error: Some(BuildFailure {
        vertex_id: "a".to_string(),
        message: "boom".to_string(),
      }),
    });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "vertex");
    assert_eq!(value["vertex_id"], "a");
    assert_eq!(value["state"], "failed");
    assert_eq!(value["error"]["message"], "boom");
  }

  #[test]
  fn test_channel_notifier_ignores_closed_receiver() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    ChannelNotifier::new(tx).notify(GraphEvent::Finish);
  }
}
