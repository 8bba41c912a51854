//! Component inputs.

use crate::payload::Payload;
use crate::reference::OutputReference;

/// What an input currently holds.
#[derive(Debug, Clone)]
pub enum InputValue {
  /// A concrete value.
  Literal(Payload),
  /// A reference to another component's output that has not been resolved yet.
  Connected(OutputReference),
}

impl Default for InputValue {
  fn default() -> Self {
    InputValue::Literal(Payload::null())
  }
}

/// A named slot on a component.
#[derive(Debug, Clone)]
pub struct Input {
  pub name: String,
  pub display_name: String,
  /// Field type used by external renderers.
  pub field_type: String,
  /// Types this input accepts. Empty means any type.
  pub input_types: Vec<String>,
  pub value: InputValue,
  /// The value must be fetched from a persisted store before use.
  pub load_from_db: bool,
  pub trace_as_input: bool,
  pub trace_as_metadata: bool,
  pub required: bool,
}

impl Input {
  /// Create a text input.
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      display_name: name.clone(),
      name,
      field_type: "str".to_string(),
      input_types: Vec::new(),
      value: InputValue::default(),
      load_from_db: false,
      trace_as_input: true,
      trace_as_metadata: false,
      required: false,
    }
  }

  /// Create an input on the fly for a key the definition does not declare.
  pub fn fallback(name: impl Into<String>) -> Self {
    let mut input = Self::new(name);
    input.field_type = "other".to_string();
    input
  }

  pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = display_name.into();
    self
  }

  pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
    self.field_type = field_type.into();
    self
  }

  /// Set the accepted input types.
  pub fn with_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.input_types = types.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_value(mut self, value: impl Into<Payload>) -> Self {
    self.value = InputValue::Literal(value.into());
    self
  }

  /// Mark the value as living in a persisted store.
  pub fn from_store(mut self) -> Self {
    self.load_from_db = true;
    self
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  /// Report the value to tracers as metadata instead of as an input.
  pub fn trace_as_metadata(mut self) -> Self {
    self.trace_as_input = false;
    self.trace_as_metadata = true;
    self
  }

  /// The literal value, or `None` while the input is still connected.
  pub fn literal(&self) -> Option<&Payload> {
    match &self.value {
      InputValue::Literal(payload) => Some(payload),
      InputValue::Connected(_) => None,
    }
  }

  pub fn is_connected(&self) -> bool {
    matches!(self.value, InputValue::Connected(_))
  }

  /// The producer this input is wired to, if any.
  pub fn connection(&self) -> Option<&OutputReference> {
    match &self.value {
      InputValue::Connected(reference) => Some(reference),
      InputValue::Literal(_) => None,
    }
  }

  /// Whether a producer declaring `output_types` may feed this input.
  ///
  /// An empty type list on either side accepts anything.
  pub fn accepts(&self, output_types: &[String]) -> bool {
    self.input_types.is_empty()
      || output_types.is_empty()
      || output_types.iter().any(|t| self.input_types.contains(t))
  }
}
