//! End-to-end tests for the strand binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn strand(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_strand"))
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .expect("failed to run strand")
}

fn events(output: &Output) -> Vec<Value> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(|line| serde_json::from_str(line).expect("event is json"))
    .collect()
}

fn demo_flow() -> String {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("demos/basic_flow.json")
    .display()
    .to_string()
}

#[test]
fn test_run_demo_flow() {
  let output = strand(&["run", &demo_flow()]);
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let events = events(&output);
  let ids: Vec<&str> = events
    .iter()
    .map(|e| e["vertex_id"].as_str().unwrap_or("finish"))
    .collect();
  assert_eq!(ids, vec!["chat_input", "suffix", "combine", "chat_output", "finish"]);

  let reply = &events[3]["results"]["message"]["value"];
  assert_eq!(reply["text"], "hello, from strand");
  assert_eq!(reply["flow_id"], "basic-flow");
  assert_eq!(events[4]["event"], "finish");
}

#[test]
fn test_sync_run_matches_async_run() {
  let flow = demo_flow();
  let sync = events(&strand(&["run", &flow, "--sync"]));
  let streamed = events(&strand(&["run", &flow]));
  assert_eq!(sync, streamed);
}

#[test]
fn test_param_override_and_flow_id() {
  let output = strand(&[
    "run",
    &demo_flow(),
    "--param",
    "chat_input.input_value=bye",
    "--flow-id",
    "custom",
  ]);
  assert!(output.status.success());

  let events = events(&output);
  let reply = &events[3]["results"]["message"]["value"];
  assert_eq!(reply["text"], "bye, from strand");
  assert_eq!(reply["flow_id"], "custom");
}

#[test]
fn test_failed_flow_exits_with_error() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(
    file,
    r#"{{
      "flow_id": "broken",
      "nodes": [
        {{ "id": "out", "component": "ChatOutput" }},
        {{ "id": "after", "component": "TextOutput" }}
      ],
      "edges": [
        {{ "source": "out", "source_output": "message", "target": "after", "target_input": "input_value" }}
      ]
    }}"#
  )
  .unwrap();

  let output = strand(&["run", file.path().to_str().unwrap()]);
  assert!(!output.status.success());

  let events = events(&output);
  assert_eq!(events.len(), 2);
  assert_eq!(events[0]["state"], "failed");
  assert_eq!(events[1]["event"], "finish");
  assert!(String::from_utf8_lossy(&output.stderr).contains("1 failed, 1 unreached"));
}

#[test]
fn test_unknown_component_fails_to_resolve() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(file, r#"{{ "flow_id": "f", "nodes": [{{ "id": "a", "component": "Nope" }}] }}"#).unwrap();

  let output = strand(&["run", file.path().to_str().unwrap()]);
  assert!(!output.status.success());
  assert!(events(&output).is_empty());
}

#[test]
fn test_components_lists_builtins() {
  let output = strand(&["components"]);
  assert!(output.status.success());

  let names: Vec<String> = events(&output)
    .iter()
    .map(|c| c["name"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(
    names,
    vec!["ChatInput", "ChatOutput", "CombineText", "TextInput", "TextOutput"]
  );
}
