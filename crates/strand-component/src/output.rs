//! Component outputs.

use crate::payload::Payload;

/// A named, operation-backed result slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
  pub name: String,
  pub display_name: String,
  /// Name of the operation that computes this output.
  pub method: Option<String>,
  /// Declared result types, inferred from the operation when left empty.
  pub types: Vec<String>,
  /// Type used for downstream compatibility checks.
  pub selected: Option<String>,
  /// Reuse a computed value instead of invoking the operation again.
  pub cache: bool,
  /// Last computed value; `None` means unset.
  pub value: Option<Payload>,
}

impl Output {
  pub fn new(name: impl Into<String>, method: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      display_name: name.clone(),
      name,
      method: Some(method.into()),
      types: Vec::new(),
      selected: None,
      cache: true,
      value: None,
    }
  }

  /// Create an output with no producing operation.
  pub fn without_method(name: impl Into<String>) -> Self {
    let mut output = Self::new(name, "");
    output.method = None;
    output
  }

  pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = display_name.into();
    self
  }

  pub fn with_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.types = types.into_iter().map(Into::into).collect();
    self
  }

  /// Always invoke the operation, even when a value is present.
  pub fn uncached(mut self) -> Self {
    self.cache = false;
    self
  }

  /// Append types that are not declared yet.
  pub fn add_types(&mut self, types: &[String]) {
    for t in types {
      if !self.types.contains(t) {
        self.types.push(t.clone());
      }
    }
  }

  /// Select the first declared type when nothing is selected.
  pub fn set_selected(&mut self) {
    if self.selected.is_none() {
      self.selected = self.types.first().cloned();
    }
  }

  /// The cached value, if this output may reuse it.
  pub fn cached_value(&self) -> Option<&Payload> {
    if self.cache { self.value.as_ref() } else { None }
  }
}
