use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use strand_component_registry::{ComponentRegistry, InMemoryRegistry};
use strand_config::FlowDef;
use strand_graph::{Graph, GraphEvent, NoopNotifier};
use strand_resolver::{Resolver, StandardResolver};

/// Strand - run flows of wired components
#[derive(Parser)]
#[command(name = "strand")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log at debug level (overridden by RUST_LOG)
  #[arg(long, short, global = true)]
  verbose: bool,

  /// Log output format
  #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
  log_format: LogFormat,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
  Compact,
  Json,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a flow, printing one JSON event per line
  Run {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,

    /// Drive the run with the blocking iterator instead of the async stream
    #[arg(long)]
    sync: bool,

    /// Override the flow id stamped on produced messages
    #[arg(long)]
    flow_id: Option<String>,

    /// Set a node parameter, e.g. `chat_input.input_value=hello`
    #[arg(long = "param", value_name = "NODE.KEY=VALUE")]
    params: Vec<String>,
  },

  /// List the available components
  Components,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose, cli.log_format)?;

  match cli.command {
    Some(Commands::Run {
      flow_file,
      sync,
      flow_id,
      params,
    }) => run_flow(&flow_file, sync, flow_id, &params)?,
    Some(Commands::Components) => list_components()?,
    None => {
      println!("strand - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(verbose: bool, format: LogFormat) -> Result<()> {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let registry = tracing_subscriber::registry().with(filter);

  match format {
    LogFormat::Compact => registry
      .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
      .try_init(),
    LogFormat::Json => registry
      .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
      .try_init(),
  }
  .context("failed to initialize tracing subscriber")
}

fn run_flow(flow_file: &Path, sync: bool, flow_id: Option<String>, params: &[String]) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;

  let cancel = CancellationToken::new();
  let token = cancel.clone();
  rt.spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      token.cancel();
    }
  });

  let mut graph = rt.block_on(load_graph(flow_file, flow_id, params))?;

  if sync {
    for event in graph.run() {
      if cancel.is_cancelled() {
        break;
      }
      print_event(&event.context("flow run failed")?)?;
    }
  } else {
    rt.block_on(async {
      while !cancel.is_cancelled() {
        match graph.next_event().await.context("flow run failed")? {
          Some(event) => print_event(&event)?,
          None => break,
        }
      }
      Ok::<_, anyhow::Error>(())
    })?;
  }

  if cancel.is_cancelled() {
    warn!(pending = graph.run_queue().len(), "run_cancelled");
  }

  let outcome = graph.outcome();
  eprintln!("{}", serde_json::to_string_pretty(&outcome)?);
  if !outcome.is_complete() {
    bail!(
      "flow did not complete: {} failed, {} unreached",
      outcome.failed.len(),
      outcome.unreached.len()
    );
  }
  Ok(())
}

async fn load_graph(flow_file: &Path, flow_id: Option<String>, params: &[String]) -> Result<Graph<NoopNotifier>> {
  let content = tokio::fs::read_to_string(flow_file)
    .await
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;

  let mut flow = FlowDef::from_json(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))?;
  if let Some(flow_id) = flow_id {
    flow.flow_id = flow_id;
  }
  for param in params {
    apply_param(&mut flow, param)?;
  }

  info!(flow_id = %flow.flow_id, nodes = flow.nodes.len(), edges = flow.edges.len(), "flow_loaded");

  let registry = InMemoryRegistry::with_builtins().context("failed to load built-in components")?;
  let resolver = StandardResolver::new(registry);
  resolver.resolve(flow).await.context("failed to resolve flow")
}

/// Apply a `node.key=value` override. Values that parse as JSON are used as
/// JSON, anything else as a string.
fn apply_param(flow: &mut FlowDef, param: &str) -> Result<()> {
  let (target, raw) = param
    .split_once('=')
    .with_context(|| format!("invalid --param '{}': expected NODE.KEY=VALUE", param))?;
  let (node_id, key) = target
    .split_once('.')
    .with_context(|| format!("invalid --param '{}': expected NODE.KEY=VALUE", param))?;

  let node = flow
    .nodes
    .iter_mut()
    .find(|n| n.id == node_id)
    .with_context(|| format!("node '{}' not found in flow", node_id))?;

  let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
  node.params.insert(key.to_string(), value);
  Ok(())
}

fn print_event(event: &GraphEvent) -> Result<()> {
  println!("{}", serde_json::to_string(event)?);
  Ok(())
}

fn list_components() -> Result<()> {
  let registry = InMemoryRegistry::with_builtins().context("failed to load built-in components")?;
  let components = futures::executor::block_on(registry.list())?;
  for component in components {
    println!("{}", serde_json::to_string(&component)?);
  }
  Ok(())
}
