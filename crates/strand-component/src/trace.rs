//! Tracing collaborator.
//!
//! Components report their builds to an optional [`Tracer`]. Without one the
//! build runs unwrapped; with one it is bracketed by `begin_trace` and the
//! returned [`TraceScope`], and its results are recorded.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{Span, info, info_span, warn};

use crate::component::ResultMap;
use crate::error::ComponentError;

/// Receives component builds.
pub trait Tracer: Send + Sync {
  /// Open a trace around one build.
  fn begin_trace(
    &self,
    vertex_name: &str,
    trace_type: &str,
    inputs: &BTreeMap<String, Value>,
    metadata: &BTreeMap<String, Value>,
  ) -> Box<dyn TraceScope>;

  /// Record the results of a build.
  fn record_outputs(&self, vertex_name: &str, results: &ResultMap);
}

/// Scoped handle returned by [`Tracer::begin_trace`].
pub trait TraceScope: Send {
  /// Close the trace, with the error if the build failed.
  fn end(self: Box<Self>, error: Option<&ComponentError>);
}

/// A [`Tracer`] that emits `tracing` spans and events.
#[derive(Debug, Clone, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
  fn begin_trace(
    &self,
    vertex_name: &str,
    trace_type: &str,
    inputs: &BTreeMap<String, Value>,
    metadata: &BTreeMap<String, Value>,
  ) -> Box<dyn TraceScope> {
    let span = info_span!("component_trace", vertex = %vertex_name, trace_type = %trace_type);
    let inputs = Value::Object(inputs.clone().into_iter().collect());
    let metadata = Value::Object(metadata.clone().into_iter().collect());
    span.in_scope(|| info!(inputs = %inputs, metadata = %metadata, "trace_started"));
    Box::new(LogTraceScope { span })
  }

  fn record_outputs(&self, vertex_name: &str, results: &ResultMap) {
    let outputs: serde_json::Map<String, Value> = results
      .iter()
      .map(|(name, payload)| (name.clone(), payload.to_json()))
      .collect();
    let outputs = Value::Object(outputs);
    info!(vertex = %vertex_name, outputs = %outputs, "trace_outputs");
  }
}

struct LogTraceScope {
  span: Span,
}

impl TraceScope for LogTraceScope {
  fn end(self: Box<Self>, error: Option<&ComponentError>) {
    self.span.in_scope(|| match error {
      Some(e) => warn!(error = %e, "trace_failed"),
      None => info!("trace_finished"),
    });
  }
}
