//! Component contract for strand.
//!
//! Components declare typed inputs and operation-backed outputs. Wiring a
//! component's input to another component's output records a [`Connection`]
//! that a graph later turns into an edge; outside a graph a component resolves
//! its connections itself and builds every output.

mod artifact;
mod component;
mod definition;
mod error;
mod input;
mod log;
mod output;
mod payload;
mod reference;
mod trace;

pub use artifact::{Artifact, ArtifactKind};
pub use component::{Attribute, ArtifactMap, BuildScope, CONFIG_PREFIX, Component, Param, ResultMap};
pub use definition::{Definition, DefinitionBuilder, Operation, OperationContext, OperationResult};
pub use error::{BoxError, ComponentError, LookupKind};
pub use input::{Input, InputValue};
pub use log::Log;
pub use output::Output;
pub use payload::{Data, Message, Payload};
pub use reference::{Connection, OutputReference};
pub use trace::{LogTracer, TraceScope, Tracer};
