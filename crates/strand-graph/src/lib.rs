//! Graph execution engine for strand.
//!
//! A [`Graph`] wraps wired components in vertices and runs them in
//! dependency order over a FIFO ready queue, one vertex at a time. Progress
//! is observable step by step through [`Graph::step`], as a synchronous
//! iterator through [`Graph::run`] or as a stream through
//! [`Graph::run_async`]; every run ends with a single [`GraphEvent::Finish`].

mod edge;
mod error;
mod event;
mod graph;
mod outcome;
mod vertex;

pub use edge::Edge;
pub use error::{BuildFailure, GraphError};
pub use event::{ChannelNotifier, GraphEvent, GraphNotifier, NoopNotifier, VertexEvent};
pub use graph::{Graph, Run};
pub use outcome::RunOutcome;
pub use vertex::{Vertex, VertexState};
