//! The component contract.
//!
//! A [`Component`] is an instance of a [`Definition`]: it owns its inputs and
//! outputs, records connections to other components when it is wired, and
//! builds its outputs by invoking the definition's operations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::artifact::Artifact;
use crate::definition::{Definition, OperationContext};
use crate::error::ComponentError;
use crate::input::{Input, InputValue};
use crate::log::{Log, Scratch};
use crate::output::Output;
use crate::payload::{Data, Message, Payload};
use crate::reference::{self, Connection, LiveCell, OutputReference};
use crate::trace::Tracer;

/// Output values keyed by output name.
pub type ResultMap = BTreeMap<String, Payload>;

/// Artifacts keyed by output name.
pub type ArtifactMap = BTreeMap<String, Artifact>;

/// Prefix marking construction keys that are not inputs.
pub const CONFIG_PREFIX: char = '_';

/// A value passed to [`Component::set`].
#[derive(Debug, Clone)]
pub enum Param {
  /// A literal stored on the input.
  Value(Payload),
  /// A connection to another component's output.
  Connection(OutputReference),
}

impl From<OutputReference> for Param {
  fn from(reference: OutputReference) -> Self {
    Param::Connection(reference)
  }
}

impl From<Payload> for Param {
  fn from(payload: Payload) -> Self {
    Param::Value(payload)
  }
}

impl From<Value> for Param {
  fn from(value: Value) -> Self {
    Param::Value(value.into())
  }
}

impl From<&str> for Param {
  fn from(value: &str) -> Self {
    Param::Value(value.into())
  }
}

impl From<String> for Param {
  fn from(value: String) -> Self {
    Param::Value(value.into())
  }
}

impl From<bool> for Param {
  fn from(value: bool) -> Self {
    Param::Value(value.into())
  }
}

impl From<i64> for Param {
  fn from(value: i64) -> Self {
    Param::Value(value.into())
  }
}

impl From<Data> for Param {
  fn from(value: Data) -> Self {
    Param::Value(value.into())
  }
}

impl From<Message> for Param {
  fn from(value: Message) -> Self {
    Param::Value(value.into())
  }
}

/// Result of [`Component::attr`].
#[derive(Clone)]
pub enum Attribute<'a> {
  /// A configured parameter or a resolved input value.
  Value(&'a Payload),
  /// Id of the owning vertex.
  Vertex(Option<&'a str>),
  /// Identity of the current user.
  UserId(Option<&'a str>),
  /// The configured tracing collaborator.
  Tracer(Option<&'a Arc<dyn Tracer>>),
}

impl fmt::Debug for Attribute<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Attribute::Value(value) => f.debug_tuple("Value").field(value).finish(),
      Attribute::Vertex(vertex) => f.debug_tuple("Vertex").field(vertex).finish(),
      Attribute::UserId(user_id) => f.debug_tuple("UserId").field(user_id).finish(),
      Attribute::Tracer(tracer) => f.debug_tuple("Tracer").field(&tracer.is_some()).finish(),
    }
  }
}

/// Which outputs a build computes.
#[derive(Debug, Clone, Default)]
pub struct BuildScope {
  requested: Option<BTreeSet<String>>,
  flow_id: Option<String>,
}

impl BuildScope {
  /// Build every output.
  pub fn all() -> Self {
    Self::default()
  }

  /// Build only the named outputs.
  pub fn outputs<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      requested: Some(names.into_iter().map(Into::into).collect()),
      flow_id: None,
    }
  }

  /// Stamp this flow id on produced messages that carry none.
  pub fn with_flow_id(mut self, flow_id: impl Into<String>) -> Self {
    self.flow_id = Some(flow_id.into());
    self
  }

  pub fn wants(&self, output: &str) -> bool {
    self
      .requested
      .as_ref()
      .is_none_or(|requested| requested.contains(output))
  }

  pub fn flow_id(&self) -> Option<&str> {
    self.flow_id.as_deref()
  }
}

/// An instance of a component definition.
///
/// Every change is published to a cell shared with the references taken from
/// this component, so consumers wired to it see its current state. A clone
/// is a separate instance with a cell of its own.
pub struct Component {
  id: String,
  definition: Arc<Definition>,
  display_name: String,
  inputs: Vec<Input>,
  outputs: Vec<Output>,
  parameters: BTreeMap<String, Payload>,
  attributes: BTreeMap<String, Payload>,
  connections: Vec<Connection>,
  producers: BTreeMap<String, OutputReference>,
  config: BTreeMap<String, Value>,
  vertex: Option<String>,
  user_id: Option<String>,
  tracer: Option<Arc<dyn Tracer>>,
  status: Option<Payload>,
  repr_value: Option<Payload>,
  output_logs: BTreeMap<String, Vec<Log>>,
  results: ResultMap,
  artifacts: ArtifactMap,
  live: LiveCell,
}

impl Clone for Component {
  fn clone(&self) -> Self {
    Self {
      id: self.id.clone(),
      definition: self.definition.clone(),
      display_name: self.display_name.clone(),
      inputs: self.inputs.clone(),
      outputs: self.outputs.clone(),
      parameters: self.parameters.clone(),
      attributes: self.attributes.clone(),
      connections: self.connections.clone(),
      producers: self.producers.clone(),
      config: self.config.clone(),
      vertex: self.vertex.clone(),
      user_id: self.user_id.clone(),
      tracer: self.tracer.clone(),
      status: self.status.clone(),
      repr_value: self.repr_value.clone(),
      output_logs: self.output_logs.clone(),
      results: self.results.clone(),
      artifacts: self.artifacts.clone(),
      live: LiveCell::default(),
    }
  }
}

impl Component {
  /// Create a component with a generated id.
  pub fn new(definition: &Arc<Definition>) -> Self {
    let mut outputs = definition.outputs().to_vec();
    for output in &mut outputs {
      if output.types.is_empty()
        && let Some(method) = &output.method
      {
        output.add_types(definition.return_types(method));
      }
      output.set_selected();
    }

    let short = Uuid::new_v4().simple().to_string();
    Self {
      id: format!("{}-{}", definition.name(), &short[..5]),
      definition: definition.clone(),
      display_name: definition.name().to_string(),
      inputs: definition.inputs().to_vec(),
      outputs,
      parameters: BTreeMap::new(),
      attributes: BTreeMap::new(),
      connections: Vec::new(),
      producers: BTreeMap::new(),
      config: BTreeMap::new(),
      vertex: None,
      user_id: None,
      tracer: None,
      status: None,
      repr_value: None,
      output_logs: BTreeMap::new(),
      results: ResultMap::new(),
      artifacts: ArtifactMap::new(),
      live: LiveCell::default(),
    }
  }

  /// Create a component from a construction map.
  ///
  /// Keys starting with `_` are configuration: `_id`, `_vertex`, `_user_id`
  /// and `_display_name` are recognized, anything else is kept in
  /// [`Component::config`]. Every other key is passed to [`Component::set`].
  pub fn with_config<I, K, P>(definition: &Arc<Definition>, params: I) -> Result<Self, ComponentError>
  where
    I: IntoIterator<Item = (K, P)>,
    K: Into<String>,
    P: Into<Param>,
  {
    let mut component = Self::new(definition);
    let mut rest = Vec::new();

    for (key, param) in params {
      let key = key.into();
      let param = param.into();
      let Some(name) = key.strip_prefix(CONFIG_PREFIX) else {
        rest.push((key, param));
        continue;
      };
      let Param::Value(value) = param else {
        return Err(ComponentError::configuration(
          definition.name(),
          format!("configuration key '{}' cannot hold a connection", key),
        ));
      };
      match name {
        "id" => component.set_id(value.text()),
        "vertex" => component.vertex = Some(value.text()),
        "user_id" => component.user_id = Some(value.text()),
        "display_name" => component.display_name = value.text(),
        _ => {
          component.config.insert(name.to_string(), value.to_json());
        }
      }
    }

    component.configure(rest)?;
    component.publish();
    Ok(component)
  }

  /// Set a parameter or a connection.
  ///
  /// A connection records a dependency on the referenced component and
  /// replaces any earlier connection on the same input. A literal is stored
  /// on the input; setting a literal on a connected input is an error. Keys
  /// naming no declared input get an input created on the fly.
  pub fn set(&mut self, key: &str, param: impl Into<Param>) -> Result<&mut Self, ComponentError> {
    match param.into() {
      Param::Connection(reference) => self.connect(key, reference)?,
      Param::Value(value) => self.set_literal(key, value)?,
    }
    self.publish();
    Ok(self)
  }

  /// Apply [`Component::set`] for every entry.
  pub fn configure<I, K, P>(&mut self, params: I) -> Result<&mut Self, ComponentError>
  where
    I: IntoIterator<Item = (K, P)>,
    K: AsRef<str>,
    P: Into<Param>,
  {
    for (key, param) in params {
      self.set(key.as_ref(), param)?;
    }
    Ok(self)
  }

  fn connect(&mut self, key: &str, reference: OutputReference) -> Result<(), ComponentError> {
    let output = reference.output().cloned().ok_or_else(|| {
      ComponentError::configuration(
        &self.display_name,
        format!(
          "method {} is not a valid output of {}",
          reference.method(),
          reference.owner_name()
        ),
      )
    })?;

    let index = self.input_index_or_create(key);
    let input = &self.inputs[index];
    if !input.accepts(&output.types) {
      return Err(ComponentError::configuration(
        &self.display_name,
        format!(
          "output '{}' of {} ({}) is not compatible with input '{}' ({})",
          output.name,
          reference.owner_name(),
          output.types.join(", "),
          key,
          input.input_types.join(", ")
        ),
      ));
    }

    let connection = Connection {
      source_id: reference.owner_id().to_string(),
      source_output: output.name.clone(),
      output_types: output.types.clone(),
      target_id: self.id.clone(),
      target_input: key.to_string(),
      input_types: input.input_types.clone(),
      field_type: input.field_type.clone(),
    };

    self.connections.retain(|c| c.target_input != key);
    self.connections.push(connection);
    self.producers.insert(key.to_string(), reference.clone());
    self.parameters.remove(key);
    self.attributes.remove(key);

    let input = &mut self.inputs[index];
    input.value = InputValue::Connected(reference);
    input.load_from_db = false;
    Ok(())
  }

  fn set_literal(&mut self, key: &str, value: Payload) -> Result<(), ComponentError> {
    if let Some(reference) = self.inputs.iter().find(|i| i.name == key).and_then(Input::connection) {
      return Err(ComponentError::configuration(
        &self.display_name,
        format!(
          "input '{}' is connected to {}.{}",
          key,
          reference.owner_name(),
          reference.method()
        ),
      ));
    }
    self.store_literal(key, value);
    Ok(())
  }

  /// Write a resolved value into an input, replacing a pending connection.
  ///
  /// Used when a producer's output is propagated; unlike [`Component::set`]
  /// this never refuses a connected input.
  pub fn resolve_input(&mut self, name: &str, value: Payload) {
    self.store_literal(name, value);
    self.publish();
  }

  fn store_literal(&mut self, key: &str, value: Payload) {
    let index = self.input_index_or_create(key);
    let input = &mut self.inputs[index];
    input.value = InputValue::Literal(value.clone());
    input.load_from_db = false;
    self.parameters.insert(key.to_string(), value.clone());
    self.attributes.insert(key.to_string(), value);
  }

  fn input_index_or_create(&mut self, name: &str) -> usize {
    match self.inputs.iter().position(|i| i.name == name) {
      Some(index) => index,
      None => {
        self.inputs.push(Input::fallback(name));
        self.inputs.len() - 1
      }
    }
  }

  /// Reference to the output computed by `method`, for wiring.
  ///
  /// The reference is valid even if `method` backs no declared output;
  /// connecting it then fails with a configuration error.
  pub fn reference(&self, method: &str) -> OutputReference {
    self.publish();
    OutputReference::new(self, method)
  }

  /// Reference to the output named `name`.
  pub fn output_reference(&self, name: &str) -> Result<OutputReference, ComponentError> {
    let output = self.get_output(name)?;
    let method = output
      .method
      .as_deref()
      .ok_or_else(|| ComponentError::OutputMethodMissing {
        component: self.display_name.clone(),
        output: name.to_string(),
      })?;
    self.publish();
    Ok(OutputReference::new(self, method))
  }

  pub fn get_input(&self, name: &str) -> Result<&Input, ComponentError> {
    self
      .inputs
      .iter()
      .find(|i| i.name == name)
      .ok_or_else(|| ComponentError::input_not_found(&self.display_name, name))
  }

  pub fn get_output(&self, name: &str) -> Result<&Output, ComponentError> {
    self
      .outputs
      .iter()
      .find(|o| o.name == name)
      .ok_or_else(|| ComponentError::output_not_found(&self.display_name, name))
  }

  pub fn list_inputs(&self) -> &[Input] {
    &self.inputs
  }

  pub fn list_outputs(&self) -> &[Output] {
    &self.outputs
  }

  /// Store a value on an output as if it had been computed.
  pub fn set_output_value(&mut self, name: &str, value: Payload) -> Result<(), ComponentError> {
    let component = &self.display_name;
    let output = self
      .outputs
      .iter_mut()
      .find(|o| o.name == name)
      .ok_or_else(|| ComponentError::output_not_found(component, name))?;
    output.value = Some(value);
    self.publish();
    Ok(())
  }

  /// Look up an attribute.
  ///
  /// Checks configured attributes, then input values, then the `vertex`,
  /// `user_id` and `tracing_service` aliases.
  pub fn attr(&self, name: &str) -> Result<Attribute<'_>, ComponentError> {
    if let Some(value) = self.attributes.get(name) {
      return Ok(Attribute::Value(value));
    }
    if let Some(value) = self.inputs.iter().find(|i| i.name == name).and_then(Input::literal) {
      return Ok(Attribute::Value(value));
    }
    match name {
      "vertex" => Ok(Attribute::Vertex(self.vertex.as_deref())),
      "user_id" => Ok(Attribute::UserId(self.user_id.as_deref())),
      "tracing_service" => Ok(Attribute::Tracer(self.tracer.as_ref())),
      _ => Err(ComponentError::AttributeNotFound {
        component: self.display_name.clone(),
        name: name.to_string(),
      }),
    }
  }

  /// Inputs reported to a tracer as inputs.
  pub fn trace_inputs(&self) -> BTreeMap<String, Value> {
    self.trace_values(|input| input.trace_as_input)
  }

  /// Inputs reported to a tracer as metadata.
  pub fn trace_metadata(&self) -> BTreeMap<String, Value> {
    self.trace_values(|input| input.trace_as_metadata)
  }

  fn trace_values(&self, include: impl Fn(&Input) -> bool) -> BTreeMap<String, Value> {
    self
      .inputs
      .iter()
      .filter(|input| include(input))
      .filter_map(|input| {
        let value = self.attributes.get(&input.name).or_else(|| input.literal())?;
        Some((input.name.clone(), value.to_json()))
      })
      .collect()
  }

  /// Forget the computed value of one output.
  pub fn invalidate_output(&mut self, name: &str) -> Result<(), ComponentError> {
    let component = &self.display_name;
    let output = self
      .outputs
      .iter_mut()
      .find(|o| o.name == name)
      .ok_or_else(|| ComponentError::output_not_found(component, name))?;
    output.value = None;
    self.results.remove(name);
    self.artifacts.remove(name);
    self.publish();
    Ok(())
  }

  /// Forget every computed output value.
  pub fn invalidate_all(&mut self) {
    for output in &mut self.outputs {
      output.value = None;
    }
    self.results.clear();
    self.artifacts.clear();
    self.publish();
  }

  /// Replace the id. Recorded connections follow the new id.
  pub fn set_id(&mut self, id: impl Into<String>) {
    self.id = id.into();
    for connection in &mut self.connections {
      connection.target_id = self.id.clone();
    }
    self.publish();
  }

  pub fn set_vertex(&mut self, vertex: Option<String>) {
    self.vertex = vertex;
    self.publish();
  }

  pub fn set_user_id(&mut self, user_id: Option<String>) {
    self.user_id = user_id;
    self.publish();
  }

  pub fn set_tracer(&mut self, tracer: Option<Arc<dyn Tracer>>) {
    self.tracer = tracer;
    self.publish();
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Name of the definition this component instantiates.
  pub fn name(&self) -> &str {
    self.definition.name()
  }

  pub fn display_name(&self) -> &str {
    &self.display_name
  }

  pub fn definition(&self) -> &Arc<Definition> {
    &self.definition
  }

  pub fn parameters(&self) -> &BTreeMap<String, Payload> {
    &self.parameters
  }

  /// Connections recorded by wiring, in wiring order.
  pub fn connections(&self) -> &[Connection] {
    &self.connections
  }

  /// Producers referenced by connected inputs, keyed by input name.
  pub fn producers(&self) -> &BTreeMap<String, OutputReference> {
    &self.producers
  }

  /// Non-input configuration passed at construction.
  pub fn config(&self) -> &BTreeMap<String, Value> {
    &self.config
  }

  pub fn vertex(&self) -> Option<&str> {
    self.vertex.as_deref()
  }

  pub fn user_id(&self) -> Option<&str> {
    self.user_id.as_deref()
  }

  pub fn tracer(&self) -> Option<&Arc<dyn Tracer>> {
    self.tracer.as_ref()
  }

  pub fn status(&self) -> Option<&Payload> {
    self.status.as_ref()
  }

  /// Log entries written while building `output`.
  pub fn logs(&self, output: &str) -> &[Log] {
    self.output_logs.get(output).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn output_logs(&self) -> &BTreeMap<String, Vec<Log>> {
    &self.output_logs
  }

  /// Results of the builds so far.
  pub fn results(&self) -> &ResultMap {
    &self.results
  }

  pub fn artifacts(&self) -> &ArtifactMap {
    &self.artifacts
  }

  pub(crate) fn live(&self) -> &LiveCell {
    &self.live
  }

  fn publish(&self) {
    reference::publish(&self.live, self.clone());
  }

  /// Resolve connected inputs by running their producers, then build every
  /// output. This is how a component runs outside a graph.
  pub async fn run(&mut self) -> Result<(ResultMap, ArtifactMap), ComponentError> {
    self.resolve_connections().await?;
    self.build_results(&BuildScope::all()).await
  }

  /// Configure, then [`Component::run`].
  pub async fn call<I, K, P>(&mut self, params: I) -> Result<(ResultMap, ArtifactMap), ComponentError>
  where
    I: IntoIterator<Item = (K, P)>,
    K: AsRef<str>,
    P: Into<Param>,
  {
    self.configure(params)?;
    self.run().await
  }

  /// Blocking variant of [`Component::call`].
  pub fn call_blocking<I, K, P>(&mut self, params: I) -> Result<(ResultMap, ArtifactMap), ComponentError>
  where
    I: IntoIterator<Item = (K, P)>,
    K: AsRef<str>,
    P: Into<Param>,
  {
    futures::executor::block_on(self.call(params))
  }

  async fn resolve_connections(&mut self) -> Result<(), ComponentError> {
    let pending: Vec<(String, OutputReference)> = self
      .inputs
      .iter()
      .filter_map(|input| Some((input.name.clone(), input.connection()?.clone())))
      .collect();

    for (name, reference) in pending {
      debug!(component = %self.id, input = %name, producer = %reference.owner_id(), "resolving_input");
      let value = reference.resolve().await?;
      self.resolve_input(&name, value);
    }
    Ok(())
  }

  /// Build the outputs selected by `scope`, bracketed by the tracer when one
  /// is configured.
  pub async fn build_results(&mut self, scope: &BuildScope) -> Result<(ResultMap, ArtifactMap), ComponentError> {
    let Some(tracer) = self.tracer.clone() else {
      let result = self.build_outputs(scope).await;
      self.publish();
      return result;
    };

    let trace_name = format!("{} ({})", self.display_name, self.id);
    let handle = tracer.begin_trace(
      &trace_name,
      self.definition.trace_type(),
      &self.trace_inputs(),
      &self.trace_metadata(),
    );
    let result = self.build_outputs(scope).await;
    self.publish();
    match &result {
      Ok((results, _)) => {
        tracer.record_outputs(&trace_name, results);
        handle.end(None);
      }
      Err(e) => handle.end(Some(e)),
    }
    result
  }

  async fn build_outputs(&mut self, scope: &BuildScope) -> Result<(ResultMap, ArtifactMap), ComponentError> {
    let mut results = ResultMap::new();
    let mut artifacts = ArtifactMap::new();

    for index in 0..self.outputs.len() {
      let output = &self.outputs[index];
      if !scope.wants(&output.name) {
        continue;
      }
      let name = output.name.clone();
      let method = output
        .method
        .clone()
        .ok_or_else(|| ComponentError::OutputMethodMissing {
          component: self.display_name.clone(),
          output: name.clone(),
        })?;

      let value = match output.cached_value().cloned() {
        Some(cached) => {
          debug!(component = %self.id, output = %name, "output_cached");
          cached
        }
        None => self.invoke(&name, &method, scope).await?,
      };

      let artifact = Artifact::derive(&value, self.status.as_ref(), self.repr_value.as_ref());
      self.outputs[index].value = Some(value.clone());
      self.results.insert(name.clone(), value.clone());
      self.artifacts.insert(name.clone(), artifact.clone());
      results.insert(name.clone(), value);
      artifacts.insert(name, artifact);
    }

    Ok((results, artifacts))
  }

  async fn invoke(&mut self, output: &str, method: &str, scope: &BuildScope) -> Result<Payload, ComponentError> {
    let operation = self
      .definition
      .operation(method)
      .cloned()
      .ok_or_else(|| ComponentError::MethodNotFound {
        component: self.display_name.clone(),
        method: method.to_string(),
      })?;

    let ctx = OperationContext::new(
      &self.id,
      &self.display_name,
      output,
      self.attribute_snapshot(),
      Scratch {
        logs: Vec::new(),
        status: self.status.clone(),
        repr: self.repr_value.clone(),
      },
    );

    let result = operation.invoke(&ctx).await;

    let scratch = ctx.take_scratch();
    self.status = scratch.status;
    self.repr_value = scratch.repr;
    self.output_logs.insert(output.to_string(), scratch.logs);

    let value = result.map_err(|source| ComponentError::Operation {
      component: self.display_name.clone(),
      method: method.to_string(),
      source,
    })?;

    debug!(component = %self.id, output = %output, "output_built");
    Ok(stamp_flow_id(value, scope.flow_id()))
  }

  /// Input values overlaid with configured attributes.
  fn attribute_snapshot(&self) -> BTreeMap<String, Payload> {
    let mut snapshot: BTreeMap<String, Payload> = self
      .inputs
      .iter()
      .filter_map(|input| Some((input.name.clone(), input.literal()?.clone())))
      .collect();
    snapshot.extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
    snapshot
  }
}

fn stamp_flow_id(value: Payload, flow_id: Option<&str>) -> Payload {
  match (value, flow_id) {
    (Payload::Message(mut message), Some(flow_id)) if message.flow_id.is_none() => {
      message.flow_id = Some(flow_id.to_string());
      Payload::Message(message)
    }
    (value, _) => value,
  }
}

impl fmt::Debug for Component {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Component")
      .field("id", &self.id)
      .field("name", &self.definition.name())
      .field("inputs", &self.inputs.iter().map(|i| &i.name).collect::<Vec<_>>())
      .field("outputs", &self.outputs.iter().map(|o| &o.name).collect::<Vec<_>>())
      .field("connections", &self.connections.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn echo() -> Arc<Definition> {
    Definition::builder("Echo")
      .input(Input::new("value").with_types(["Text"]))
      .output(Output::new("text", "echo"))
      .operation("echo", &["Text"], |ctx| Ok(ctx.text("value").into()))
      .build()
      .unwrap()
  }

  #[test]
  fn test_generated_id_uses_definition_name() {
    let component = Component::new(&echo());
    let (prefix, suffix) = component.id().split_once('-').unwrap();
    assert_eq!(prefix, "Echo");
    assert_eq!(suffix.len(), 5);
  }

  #[test]
  fn test_output_types_inferred_from_operation() {
    let component = Component::new(&echo());
    let output = component.get_output("text").unwrap();
    assert_eq!(output.types, vec!["Text".to_string()]);
    assert_eq!(output.selected.as_deref(), Some("Text"));
  }

  #[test]
  fn test_with_config_reserved_keys() {
    let component = Component::with_config(
      &echo(),
      [
        ("_id", Param::from("echo-1")),
        ("_user_id", Param::from("user")),
        ("_retries", Param::from(3i64)),
        ("value", Param::from("hi")),
      ],
    )
    .unwrap();

    assert_eq!(component.id(), "echo-1");
    assert_eq!(component.user_id(), Some("user"));
    assert_eq!(component.config().get("retries"), Some(&json!(3)));
    assert!(component.get_input("_id").is_err());
    assert_eq!(component.get_input("value").unwrap().literal(), Some(&Payload::from("hi")));
  }

  #[test]
  fn test_set_unknown_key_creates_fallback_input() {
    let mut component = Component::new(&echo());
    component.set("extra", 7i64).unwrap();
    let input = component.get_input("extra").unwrap();
    assert_eq!(input.field_type, "other");
    assert!(matches!(component.attr("extra"), Ok(Attribute::Value(v)) if *v == Payload::from(7i64)));
  }

  #[test]
  fn test_set_clears_load_from_db() {
    let definition = Definition::builder("Stored")
      .input(Input::new("api_key").from_store())
      .build()
      .unwrap();
    let mut component = Component::new(&definition);
    assert!(component.get_input("api_key").unwrap().load_from_db);
    component.set("api_key", "secret").unwrap();
    assert!(!component.get_input("api_key").unwrap().load_from_db);
  }

  #[test]
  fn test_scope_filters_outputs() {
    let scope = BuildScope::outputs(["a"]);
    assert!(scope.wants("a"));
    assert!(!scope.wants("b"));
    assert!(BuildScope::all().wants("b"));
  }

  #[test]
  fn test_flow_id_stamped_only_when_missing() {
    let stamped = stamp_flow_id(Message::new("hi").into(), Some("flow"));
    assert!(matches!(stamped, Payload::Message(m) if m.flow_id.as_deref() == Some("flow")));

    let mut message = Message::new("hi");
    message.flow_id = Some("other".to_string());
    let kept = stamp_flow_id(message.into(), Some("flow"));
    assert!(matches!(kept, Payload::Message(m) if m.flow_id.as_deref() == Some("other")));
  }
}
