//! Values flowing between components.
//!
//! Every literal input value and every output result is a [`Payload`]. Plain
//! JSON covers text, numbers, records and lists; [`Data`] and [`Message`] are
//! the structured wrappers components exchange when they need more than a
//! bare value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A value held by an input or produced by an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
  /// A plain JSON value.
  Json(Value),
  /// A structured record wrapper.
  Data(Data),
  /// A chat-style message.
  Message(Message),
}

impl Default for Payload {
  fn default() -> Self {
    Payload::Json(Value::Null)
  }
}

impl Payload {
  /// The null payload.
  pub fn null() -> Self {
    Self::default()
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Payload::Json(Value::Null))
  }

  /// Borrow the payload as a string slice, if it holds text.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Payload::Json(Value::String(s)) => Some(s),
      Payload::Message(message) => Some(&message.text),
      _ => None,
    }
  }

  /// Render the payload as text.
  ///
  /// Strings render verbatim, messages render their text, records render
  /// their text field when present and everything else renders as JSON.
  pub fn text(&self) -> String {
    match self {
      Payload::Json(Value::String(s)) => s.clone(),
      Payload::Json(Value::Null) => String::new(),
      Payload::Json(value) => value.to_string(),
      Payload::Data(data) => data
        .get_text()
        .map(str::to_string)
        .unwrap_or_else(|| Value::Object(data.data.clone()).to_string()),
      Payload::Message(message) => message.text.clone(),
    }
  }

  /// Convert the payload into its JSON form.
  ///
  /// Records unwrap to their underlying map; messages dump every field.
  pub fn to_json(&self) -> Value {
    match self {
      Payload::Json(value) => value.clone(),
      Payload::Data(data) => Value::Object(data.data.clone()),
      Payload::Message(message) => serde_json::to_value(message).unwrap_or(Value::Null),
    }
  }
}

impl From<Value> for Payload {
  fn from(value: Value) -> Self {
    Payload::Json(value)
  }
}

impl From<&str> for Payload {
  fn from(value: &str) -> Self {
    Payload::Json(Value::String(value.to_string()))
  }
}

impl From<String> for Payload {
  fn from(value: String) -> Self {
    Payload::Json(Value::String(value))
  }
}

impl From<bool> for Payload {
  fn from(value: bool) -> Self {
    Payload::Json(Value::Bool(value))
  }
}

impl From<i64> for Payload {
  fn from(value: i64) -> Self {
    Payload::Json(Value::from(value))
  }
}

impl From<Data> for Payload {
  fn from(value: Data) -> Self {
    Payload::Data(value)
  }
}

impl From<Message> for Payload {
  fn from(value: Message) -> Self {
    Payload::Message(value)
  }
}

fn default_text_key() -> String {
  "text".to_string()
}

/// A structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
  /// The record fields.
  #[serde(default)]
  pub data: Map<String, Value>,
  /// Field holding the record's text form.
  #[serde(default = "default_text_key")]
  pub text_key: String,
}

impl Default for Data {
  fn default() -> Self {
    Self {
      data: Map::new(),
      text_key: default_text_key(),
    }
  }
}

impl Data {
  pub fn new(data: Map<String, Value>) -> Self {
    Self {
      data,
      text_key: default_text_key(),
    }
  }

  /// Create a record holding only a text field.
  pub fn from_text(text: impl Into<String>) -> Self {
    let mut data = Map::new();
    data.insert(default_text_key(), Value::String(text.into()));
    Self::new(data)
  }

  /// Get the text field, if it is a string.
  pub fn get_text(&self) -> Option<&str> {
    self.data.get(&self.text_key).and_then(Value::as_str)
  }
}

/// A chat-style message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub text: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sender: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sender_name: Option<String>,
  /// Flow the message was produced in; stamped by the graph when unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub flow_id: Option<String>,
}

impl Message {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      ..Self::default()
    }
  }

  pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
    self.sender = Some(sender.into());
    self
  }

  pub fn with_sender_name(mut self, sender_name: impl Into<String>) -> Self {
    self.sender_name = Some(sender_name.into());
    self
  }
}
