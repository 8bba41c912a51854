//! Strand Config
//!
//! This crate contains the serializable flow configuration types for strand.
//! A flow definition names the components to instantiate, the parameters to
//! construct them with, and the edges wiring their outputs to inputs. The
//! resolver turns a definition into a prepared graph.
//!
//! ```json
//! {
//!   "flow_id": "greeting",
//!   "nodes": [
//!     { "id": "chat_input", "component": "ChatInput", "params": { "input_value": "hi" } },
//!     { "id": "chat_output", "component": "ChatOutput" }
//!   ],
//!   "edges": [
//!     { "source": "chat_input", "source_output": "message",
//!       "target": "chat_output", "target_input": "input_value" }
//!   ]
//! }
//! ```

mod edge;
mod flow;
mod node;

pub use edge::EdgeDef;
pub use flow::FlowDef;
pub use node::NodeDef;
