//! Built-in components.

use std::sync::Arc;

use strand_component::{
  ComponentError, Definition, Input, Message, OperationContext, OperationResult, Output, Payload,
};

const TEXT_TYPES: [&str; 3] = ["Message", "Text", "Data"];

/// Definitions of the components every registry may start with.
pub fn builtins() -> Result<Vec<Arc<Definition>>, ComponentError> {
  Ok(vec![
    chat_input()?,
    chat_output()?,
    combine_text()?,
    text_input()?,
    text_output()?,
  ])
}

fn as_message(payload: &Payload) -> Message {
  match payload {
    Payload::Message(message) => message.clone(),
    other => Message::new(other.text()),
  }
}

fn chat_input() -> Result<Arc<Definition>, ComponentError> {
  Definition::builder("ChatInput")
    .description("Get chat inputs.")
    .input(Input::new("input_value").with_display_name("Text"))
    .input(Input::new("sender").with_value("User").trace_as_metadata())
    .input(Input::new("sender_name").with_value("User").trace_as_metadata())
    .output(Output::new("message", "message_response").with_display_name("Message"))
    .operation("message_response", &["Message"], |ctx| {
      let message = Message::new(ctx.text("input_value"))
        .with_sender(ctx.text("sender"))
        .with_sender_name(ctx.text("sender_name"));
      ctx.set_status(message.clone());
      Ok(message.into())
    })
    .build()
}

fn chat_output() -> Result<Arc<Definition>, ComponentError> {
  Definition::builder("ChatOutput")
    .description("Display a chat message.")
    .input(Input::new("input_value").with_display_name("Text").with_types(TEXT_TYPES))
    .input(Input::new("sender").with_value("Machine").trace_as_metadata())
    .input(Input::new("sender_name").with_value("AI").trace_as_metadata())
    .output(Output::new("message", "message_response").with_display_name("Message"))
    .async_operation("message_response", &["Message"], |ctx| async move { relabel(&ctx) })
    .build()
}

fn relabel(ctx: &OperationContext) -> OperationResult {
  let input = ctx.get("input_value")?;
  if input.is_null() {
    return Err("input data cannot be None".into());
  }
  let mut message = as_message(input);
  message.sender = Some(ctx.text("sender"));
  message.sender_name = Some(ctx.text("sender_name"));
  ctx.set_status(message.clone());
  Ok(message.into())
}

fn combine_text() -> Result<Arc<Definition>, ComponentError> {
  Definition::builder("CombineText")
    .description("Concatenate two text sources into a single text chunk using a delimiter.")
    .input(Input::new("text1").with_display_name("First Text").with_types(TEXT_TYPES))
    .input(Input::new("text2").with_display_name("Second Text").with_types(TEXT_TYPES))
    .input(Input::new("delimiter").with_value(" "))
    .output(Output::new("combined_text", "combine_texts").with_display_name("Combined Text"))
    .operation("combine_texts", &["Message"], |ctx| {
      let combined = [ctx.text("text1"), ctx.text("text2")].join(ctx.text("delimiter").as_str());
      ctx.set_status(combined.as_str());
      Ok(Message::new(combined).into())
    })
    .build()
}

fn text_input() -> Result<Arc<Definition>, ComponentError> {
  Definition::builder("TextInput")
    .description("Get text inputs.")
    .input(Input::new("input_value").with_display_name("Text"))
    .output(Output::new("text", "text_response").with_display_name("Message"))
    .operation("text_response", &["Message"], |ctx| {
      Ok(Message::new(ctx.text("input_value")).into())
    })
    .build()
}

fn text_output() -> Result<Arc<Definition>, ComponentError> {
  Definition::builder("TextOutput")
    .description("Display a text output.")
    .input(Input::new("input_value").with_display_name("Text").with_types(TEXT_TYPES))
    .output(Output::new("text", "text_response").with_display_name("Message"))
    .operation("text_response", &["Message"], |ctx| {
      let message = as_message(ctx.get("input_value")?);
      ctx.set_status(message.text.as_str());
      Ok(message.into())
    })
    .build()
}

#[cfg(test)]
mod tests {
  use super::*;
  use strand_component::{ArtifactKind, Component};

  #[tokio::test]
  async fn test_chat_input_builds_message() {
    let mut component = Component::new(&chat_input().unwrap());
    let (results, artifacts) = component.call([("input_value", "hello")]).await.unwrap();

    match &results["message"] {
      Payload::Message(message) => {
        assert_eq!(message.text, "hello");
        assert_eq!(message.sender.as_deref(), Some("User"));
      }
      other => panic!("expected message, got {:?}", other),
    }
    assert_eq!(artifacts["message"].kind, ArtifactKind::Message);
    assert_eq!(artifacts["message"].repr, "hello");
  }

  #[tokio::test]
  async fn test_chat_output_relabels_sender() {
    let mut input = Component::new(&chat_input().unwrap());
    let mut output = Component::new(&chat_output().unwrap());
    input.set("input_value", "ping").unwrap();
    output.set("input_value", input.reference("message_response")).unwrap();

    let (results, _) = output.run().await.unwrap();
    match &results["message"] {
      Payload::Message(message) => {
        assert_eq!(message.text, "ping");
        assert_eq!(message.sender.as_deref(), Some("Machine"));
        assert_eq!(message.sender_name.as_deref(), Some("AI"));
      }
      other => panic!("expected message, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_chat_output_rejects_missing_input() {
    let mut output = Component::new(&chat_output().unwrap());
    let err = output.run().await.unwrap_err();
    assert!(err.to_string().contains("input data cannot be None"));
  }

  #[test]
  fn test_combine_text_uses_delimiter() {
    let mut component = Component::new(&combine_text().unwrap());
    let (results, artifacts) = component
      .call_blocking([("text1", "a"), ("text2", "b"), ("delimiter", ", ")])
      .unwrap();

    assert_eq!(results["combined_text"].as_str(), Some("a, b"));
    assert_eq!(artifacts["combined_text"].repr, "a, b");
  }

  #[test]
  fn test_text_output_accepts_plain_text() {
    let mut component = Component::new(&text_output().unwrap());
    let (results, _) = component.call_blocking([("input_value", "plain")]).unwrap();
    assert_eq!(results["text"].as_str(), Some("plain"));
  }
}
