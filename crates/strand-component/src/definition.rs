//! Component definitions.
//!
//! A [`Definition`] is the shared, immutable description of a component
//! type: its declared inputs and outputs and the operations backing those
//! outputs. [`Component`](crate::Component) instances are created from it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;

use crate::error::{BoxError, ComponentError};
use crate::input::Input;
use crate::log::{Log, Scratch};
use crate::output::Output;
use crate::payload::Payload;

/// Result of an output operation.
pub type OperationResult = Result<Payload, BoxError>;

type SyncFn = dyn Fn(&OperationContext) -> OperationResult + Send + Sync;
type AsyncFn = dyn Fn(OperationContext) -> BoxFuture<'static, OperationResult> + Send + Sync;

/// The callable behind an output.
#[derive(Clone)]
pub enum Operation {
  Sync(Arc<SyncFn>),
  Async(Arc<AsyncFn>),
}

impl Operation {
  /// Invoke the operation, awaiting it when it is asynchronous.
  pub async fn invoke(&self, ctx: &OperationContext) -> OperationResult {
    match self {
      Operation::Sync(f) => f(ctx),
      Operation::Async(f) => f(ctx.clone()).await,
    }
  }

  pub fn is_async(&self) -> bool {
    matches!(self, Operation::Async(_))
  }
}

impl fmt::Debug for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operation::Sync(_) => f.write_str("Operation::Sync"),
      Operation::Async(_) => f.write_str("Operation::Async"),
    }
  }
}

#[derive(Debug, Clone)]
struct OperationEntry {
  operation: Operation,
  returns: Vec<String>,
}

/// Shared description of a component type.
#[derive(Debug)]
pub struct Definition {
  name: String,
  description: String,
  trace_type: String,
  inputs: Vec<Input>,
  outputs: Vec<Output>,
  operations: HashMap<String, OperationEntry>,
}

impl Definition {
  pub fn builder(name: impl Into<String>) -> DefinitionBuilder {
    DefinitionBuilder {
      name: name.into(),
      description: String::new(),
      trace_type: "chain".to_string(),
      inputs: Vec::new(),
      outputs: Vec::new(),
      operations: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  /// Category reported to tracers.
  pub fn trace_type(&self) -> &str {
    &self.trace_type
  }

  pub fn inputs(&self) -> &[Input] {
    &self.inputs
  }

  pub fn outputs(&self) -> &[Output] {
    &self.outputs
  }

  /// Look up an operation by method name.
  pub fn operation(&self, method: &str) -> Option<&Operation> {
    self.operations.get(method).map(|e| &e.operation)
  }

  /// Declared return types of an operation.
  pub fn return_types(&self, method: &str) -> &[String] {
    self
      .operations
      .get(method)
      .map(|e| e.returns.as_slice())
      .unwrap_or(&[])
  }
}

/// Builder for [`Definition`].
pub struct DefinitionBuilder {
  name: String,
  description: String,
  trace_type: String,
  inputs: Vec<Input>,
  outputs: Vec<Output>,
  operations: HashMap<String, OperationEntry>,
}

impl DefinitionBuilder {
  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn trace_type(mut self, trace_type: impl Into<String>) -> Self {
    self.trace_type = trace_type.into();
    self
  }

  pub fn input(mut self, input: Input) -> Self {
    self.inputs.push(input);
    self
  }

  pub fn output(mut self, output: Output) -> Self {
    self.outputs.push(output);
    self
  }

  /// Register a synchronous operation.
  pub fn operation<F>(mut self, method: impl Into<String>, returns: &[&str], f: F) -> Self
  where
    F: Fn(&OperationContext) -> OperationResult + Send + Sync + 'static,
  {
    self.operations.insert(
      method.into(),
      OperationEntry {
        operation: Operation::Sync(Arc::new(f)),
        returns: returns.iter().map(|s| s.to_string()).collect(),
      },
    );
    self
  }

  /// Register an asynchronous operation.
  pub fn async_operation<F, Fut>(mut self, method: impl Into<String>, returns: &[&str], f: F) -> Self
  where
    F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OperationResult> + Send + 'static,
  {
    let f = Arc::new(f);
    self.operations.insert(
      method.into(),
      OperationEntry {
        operation: Operation::Async(Arc::new(move |ctx: OperationContext| -> BoxFuture<'static, OperationResult> {
          let f = f.clone();
          Box::pin(async move { f(ctx).await })
        })),
        returns: returns.iter().map(|s| s.to_string()).collect(),
      },
    );
    self
  }

  /// Validate the declarations and build the definition.
  ///
  /// Input and output names must be non-empty and unique.
  pub fn build(self) -> Result<Arc<Definition>, ComponentError> {
    check_names(&self.name, "input", self.inputs.iter().map(|i| i.name.as_str()))?;
    check_names(&self.name, "output", self.outputs.iter().map(|o| o.name.as_str()))?;

    Ok(Arc::new(Definition {
      name: self.name,
      description: self.description,
      trace_type: self.trace_type,
      inputs: self.inputs,
      outputs: self.outputs,
      operations: self.operations,
    }))
  }
}

fn check_names<'a>(
  component: &str,
  kind: &str,
  names: impl Iterator<Item = &'a str>,
) -> Result<(), ComponentError> {
  let mut seen = HashSet::new();
  for name in names {
    if name.is_empty() {
      return Err(ComponentError::configuration(
        component,
        format!("{} name cannot be empty", kind),
      ));
    }
    if !seen.insert(name) {
      return Err(ComponentError::configuration(
        component,
        format!("duplicate {} name '{}'", kind, name),
      ));
    }
  }
  Ok(())
}

/// What an operation sees while it runs.
///
/// Holds a snapshot of the component's attributes and a handle to the
/// component's transient state (logs, status, custom representation).
#[derive(Clone)]
pub struct OperationContext {
  component_id: String,
  component_name: String,
  output: String,
  attributes: Arc<BTreeMap<String, Payload>>,
  scratch: Arc<Mutex<Scratch>>,
}

impl OperationContext {
  pub(crate) fn new(
    component_id: &str,
    component_name: &str,
    output: &str,
    attributes: BTreeMap<String, Payload>,
    scratch: Scratch,
  ) -> Self {
    Self {
      component_id: component_id.to_string(),
      component_name: component_name.to_string(),
      output: output.to_string(),
      attributes: Arc::new(attributes),
      scratch: Arc::new(Mutex::new(scratch)),
    }
  }

  pub fn component_id(&self) -> &str {
    &self.component_id
  }

  /// Name of the output being built.
  pub fn output_name(&self) -> &str {
    &self.output
  }

  /// Get an attribute value.
  pub fn get(&self, name: &str) -> Result<&Payload, ComponentError> {
    self
      .attributes
      .get(name)
      .ok_or_else(|| ComponentError::AttributeNotFound {
        component: self.component_name.clone(),
        name: name.to_string(),
      })
  }

  /// Get an attribute rendered as text; missing attributes render empty.
  pub fn text(&self, name: &str) -> String {
    self.attributes.get(name).map(Payload::text).unwrap_or_default()
  }

  /// Append an entry to the component's log buffer.
  pub fn log(&self, message: impl Into<Payload>) {
    let entry = Log::new(self.output.clone(), message);
    self.with_scratch(|s| s.logs.push(entry));
  }

  /// Set the component status shown in artifacts.
  pub fn set_status(&self, status: impl Into<Payload>) {
    let status = status.into();
    self.with_scratch(|s| s.status = Some(status));
  }

  /// Set a custom representation for the artifact being derived.
  pub fn set_repr(&self, repr: impl Into<Payload>) {
    let repr = repr.into();
    self.with_scratch(|s| s.repr = Some(repr));
  }

  pub(crate) fn take_scratch(&self) -> Scratch {
    self.with_scratch(std::mem::take)
  }

  fn with_scratch<T>(&self, f: impl FnOnce(&mut Scratch) -> T) -> T {
    let mut guard = self.scratch.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_duplicate_input_names_rejected() {
    let result = Definition::builder("Dup")
      .input(Input::new("a"))
      .input(Input::new("a"))
      .build();
    assert!(matches!(result, Err(ComponentError::Configuration { .. })));
  }

  #[test]
  fn test_empty_output_name_rejected() {
    let result = Definition::builder("Empty")
      .output(Output::new("", "run"))
      .build();
    assert!(matches!(result, Err(ComponentError::Configuration { .. })));
  }

  #[test]
  fn test_return_types_registered() {
    let definition = Definition::builder("Echo")
      .output(Output::new("text", "echo"))
      .operation("echo", &["Text"], |ctx| Ok(ctx.text("value").into()))
      .build()
      .unwrap();
    assert_eq!(definition.return_types("echo"), ["Text".to_string()]);
    assert!(definition.operation("missing").is_none());
  }

  #[test]
  fn test_context_scratch_roundtrip() {
    let ctx = OperationContext::new("c-1", "C", "out", BTreeMap::new(), Scratch::default());
    ctx.log("hello");
    ctx.set_status("ok");
    let scratch = ctx.take_scratch();
    assert_eq!(scratch.logs.len(), 1);
    assert_eq!(scratch.logs[0].name, "out");
    assert_eq!(scratch.status, Some(Payload::from("ok")));
  }
}
