//! The graph scheduler.
//!
//! Vertices run one at a time in FIFO order over a ready queue. A vertex
//! becomes ready when every vertex it depends on is done; building it
//! propagates its results into the inputs of its dependents and may make
//! them ready in turn. There is no global ordering computed up front.

use std::collections::{HashMap, HashSet, VecDeque};

use futures::Stream;
use strand_component::{BuildScope, Component, ResultMap};
use tracing::{debug, info, instrument, warn};

use crate::edge::Edge;
use crate::error::{BuildFailure, GraphError};
use crate::event::{GraphEvent, GraphNotifier, NoopNotifier, VertexEvent};
use crate::outcome::RunOutcome;
use crate::vertex::{Vertex, VertexState};

/// A set of components wired into a dependency graph.
///
/// Generic over `N: GraphNotifier` to allow different notification
/// strategies. Use `Graph::new()` for a graph that only exposes the pull API,
/// or `Graph::with_notifier()` to also push every event.
pub struct Graph<N: GraphNotifier = NoopNotifier> {
  flow_id: Option<String>,
  vertices: Vec<Vertex>,
  index: HashMap<String, usize>,
  edges: Vec<Edge>,
  run_queue: VecDeque<String>,
  built: Vec<String>,
  prepared: bool,
  finished: bool,
  notifier: N,
}

impl Graph<NoopNotifier> {
  pub fn new() -> Self {
    Self::with_notifier(NoopNotifier)
  }
}

impl Default for Graph<NoopNotifier> {
  fn default() -> Self {
    Self::new()
  }
}

impl<N: GraphNotifier> Graph<N> {
  pub fn with_notifier(notifier: N) -> Self {
    Self {
      flow_id: None,
      vertices: Vec::new(),
      index: HashMap::new(),
      edges: Vec::new(),
      run_queue: VecDeque::new(),
      built: Vec::new(),
      prepared: false,
      finished: false,
      notifier,
    }
  }

  /// Stamp `flow_id` on messages produced without one.
  pub fn with_flow_id(mut self, flow_id: impl Into<String>) -> Self {
    self.flow_id = Some(flow_id.into());
    self
  }

  pub fn flow_id(&self) -> Option<&str> {
    self.flow_id.as_deref()
  }

  /// Attach wired components and prepare the graph.
  ///
  /// Each component becomes a vertex under its own id, in the order given.
  /// Producers referenced by recorded connections but not passed explicitly
  /// are discovered transitively, from their wiring as it is now, and
  /// attached after them. Edges come from the recorded connections.
  pub fn attach<I>(&mut self, components: I) -> Result<(), GraphError>
  where
    I: IntoIterator<Item = Component>,
  {
    let components = self.discover_producers(components.into_iter().collect());

    let mut connections = Vec::new();
    for component in components {
      let vertex_id = component.id().to_string();
      connections.extend(
        component
          .connections()
          .iter()
          .map(|c| (c.source_id.clone(), c.source_output.clone(), c.target_input.clone(), vertex_id.clone())),
      );
      self.add_component(vertex_id, component)?;
    }

    for (source_id, output, input, target_id) in connections {
      self.add_component_edge(&source_id, (&output, &input), &target_id)?;
    }

    self.prepare()
  }

  fn discover_producers(&self, mut components: Vec<Component>) -> Vec<Component> {
    let mut seen: HashSet<String> = self.index.keys().cloned().collect();
    seen.extend(components.iter().map(|c| c.id().to_string()));

    let mut cursor = 0;
    while cursor < components.len() {
      let found: Vec<Component> = components[cursor]
        .producers()
        .values()
        .filter_map(|reference| reference.producer())
        .filter(|producer| seen.insert(producer.id().to_string()))
        .collect();
      for producer in &found {
        debug!(vertex_id = %producer.id(), "producer_discovered");
      }
      components.extend(found);
      cursor += 1;
    }
    components
  }

  /// Add a component as a vertex with the given id.
  ///
  /// The graph is left unprepared.
  pub fn add_component(&mut self, id: impl Into<String>, mut component: Component) -> Result<(), GraphError> {
    let id = id.into();
    if self.index.contains_key(&id) {
      return Err(GraphError::DuplicateVertex { vertex_id: id });
    }
    component.set_id(id.clone());
    component.set_vertex(Some(id.clone()));

    self.index.insert(id.clone(), self.vertices.len());
    self.vertices.push(Vertex::new(id, component));
    self.prepared = false;
    Ok(())
  }

  /// Connect `source_id`'s output to `target_id`'s input.
  ///
  /// Both vertices must exist, the output and input must be declared and
  /// their types must intersect. Adding the same edge twice is a no-op. The
  /// graph is left unprepared.
  pub fn add_component_edge(
    &mut self,
    source_id: &str,
    (output, input): (&str, &str),
    target_id: &str,
  ) -> Result<(), GraphError> {
    let source = self.vertex_index(source_id)?;
    let target = self.vertex_index(target_id)?;

    let source_output = self.vertices[source].component.get_output(output)?;
    let target_input = self.vertices[target].component.get_input(input)?;
    if !target_input.accepts(&source_output.types) {
      return Err(GraphError::Configuration {
        source_id: source_id.to_string(),
        target_id: target_id.to_string(),
        message: format!(
          "output '{}' ({}) is not compatible with input '{}' ({})",
          output,
          source_output.types.join(", "),
          input,
          target_input.input_types.join(", ")
        ),
      });
    }

    let edge = Edge {
      source_id: source_id.to_string(),
      source_output: output.to_string(),
      output_types: source_output.types.clone(),
      target_id: target_id.to_string(),
      target_input: input.to_string(),
      input_types: target_input.input_types.clone(),
    };
    if self.edges.iter().any(|existing| existing.same_endpoints(&edge)) {
      return Ok(());
    }

    Vertex::link(&mut self.vertices[source].successors, target_id);
    Vertex::link(&mut self.vertices[target].predecessors, source_id);
    self.edges.push(edge);
    self.prepared = false;
    Ok(())
  }

  /// Check for cycles and seed the ready queue.
  ///
  /// Every pending vertex whose dependencies are all done is queued, in
  /// insertion order.
  pub fn prepare(&mut self) -> Result<(), GraphError> {
    self.detect_cycle()?;

    self.run_queue.clear();
    for i in 0..self.vertices.len() {
      if matches!(self.vertices[i].state, VertexState::Pending | VertexState::Ready) && self.dependencies_done(i) {
        self.vertices[i].state = VertexState::Ready;
        self.run_queue.push_back(self.vertices[i].id.clone());
      }
    }

    self.prepared = true;
    self.finished = false;
    debug!(queued = self.run_queue.len(), vertices = self.vertices.len(), "graph_prepared");
    Ok(())
  }

  /// Return every vertex to pending and prepare again.
  ///
  /// Cached output values are kept; invalidate them through
  /// [`Graph::component_mut`] to force a rebuild.
  pub fn reset(&mut self) -> Result<(), GraphError> {
    for vertex in &mut self.vertices {
      vertex.state = VertexState::Pending;
      vertex.failure = None;
    }
    self.built.clear();
    self.prepare()
  }

  /// Build the vertex at the head of the ready queue.
  #[instrument(name = "graph_step", skip(self), fields(flow_id = ?self.flow_id))]
  pub async fn step(&mut self) -> Result<VertexEvent, GraphError> {
    if !self.prepared {
      return Err(GraphError::NotPrepared { pending: self.pending_count() });
    }
    let Some(vertex_id) = self.run_queue.pop_front() else {
      return match self.pending_count() {
        0 => Err(GraphError::Drained),
        pending => Err(GraphError::NotPrepared { pending }),
      };
    };

    let index = self.vertex_index(&vertex_id)?;
    let scope = self.scope_for(&vertex_id);
    let vertex = &mut self.vertices[index];
    vertex.state = VertexState::Running;
    info!(vertex_id = %vertex_id, component = %vertex.component.name(), "vertex_started");

    let event = match vertex.component.build_results(&scope).await {
      Ok((results, artifacts)) => {
        vertex.state = VertexState::Done;
        self.built.push(vertex_id.clone());
        self.propagate(&vertex_id, &results);
        self.enqueue_successors(index);
        info!(vertex_id = %vertex_id, outputs = results.len(), "vertex_completed");
        VertexEvent {
          vertex_id,
          state: VertexState::Done,
          results,
          artifacts,
          error: None,
        }
      }
      Err(e) => {
        let failure = BuildFailure {
          vertex_id: vertex_id.clone(),
          message: e.to_string(),
        };
        vertex.state = VertexState::Failed;
        vertex.failure = Some(failure.clone());
        warn!(vertex_id = %vertex_id, error = %e, "vertex_failed");
        VertexEvent {
          vertex_id,
          state: VertexState::Failed,
          results: ResultMap::new(),
          artifacts: Default::default(),
          error: Some(failure),
        }
      }
    };

    self.notifier.notify(GraphEvent::Vertex(event.clone()));
    Ok(event)
  }

  /// Produce the next event of the run.
  ///
  /// Steps while the ready queue has work, then yields [`GraphEvent::Finish`]
  /// once and `None` after that. Call [`Graph::prepare`] or
  /// [`Graph::reset`] to run again.
  pub async fn next_event(&mut self) -> Result<Option<GraphEvent>, GraphError> {
    if self.finished {
      return Ok(None);
    }
    if !self.prepared {
      return Err(GraphError::NotPrepared { pending: self.pending_count() });
    }
    if self.run_queue.is_empty() {
      self.finished = true;
      let outcome = self.outcome();
      info!(
        completed = outcome.completed.len(),
        failed = outcome.failed.len(),
        unreached = outcome.unreached.len(),
        "graph_finished"
      );
      self.notifier.notify(GraphEvent::Finish);
      return Ok(Some(GraphEvent::Finish));
    }
    self.step().await.map(|event| Some(GraphEvent::Vertex(event)))
  }

  /// Run synchronously, yielding one event per vertex and then the finish
  /// event. Iteration stops after the first error.
  pub fn run(&mut self) -> Run<'_, N> {
    Run {
      graph: self,
      stopped: false,
    }
  }

  /// Run asynchronously; same events and ordering as [`Graph::run`].
  pub fn run_async(&mut self) -> impl Stream<Item = Result<GraphEvent, GraphError>> + '_ {
    futures::stream::unfold((self, false), |(graph, stopped)| async move {
      if stopped {
        return None;
      }
      match graph.next_event().await {
        Ok(Some(event)) => Some((Ok(event), (graph, false))),
        Ok(None) => None,
        Err(e) => Some((Err(e), (graph, true))),
      }
    })
  }

  /// Vertex states after (or during) a run.
  pub fn outcome(&self) -> RunOutcome {
    RunOutcome {
      completed: self.built.clone(),
      failed: self.vertices.iter().filter_map(|v| v.failure.clone()).collect(),
      unreached: self
        .vertices
        .iter()
        .filter(|v| matches!(v.state, VertexState::Pending | VertexState::Ready))
        .map(|v| v.id.clone())
        .collect(),
    }
  }

  /// Ids waiting in the ready queue, head first.
  pub fn run_queue(&self) -> &VecDeque<String> {
    &self.run_queue
  }

  pub fn is_prepared(&self) -> bool {
    self.prepared
  }

  /// Vertices in insertion order.
  pub fn vertices(&self) -> &[Vertex] {
    &self.vertices
  }

  pub fn vertex(&self, id: &str) -> Result<&Vertex, GraphError> {
    Ok(&self.vertices[self.vertex_index(id)?])
  }

  pub fn component(&self, id: &str) -> Result<&Component, GraphError> {
    self.vertex(id).map(Vertex::component)
  }

  pub fn component_mut(&mut self, id: &str) -> Result<&mut Component, GraphError> {
    let index = self.vertex_index(id)?;
    Ok(&mut self.vertices[index].component)
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  fn vertex_index(&self, id: &str) -> Result<usize, GraphError> {
    self
      .index
      .get(id)
      .copied()
      .ok_or_else(|| GraphError::UnknownVertex { vertex_id: id.to_string() })
  }

  fn pending_count(&self) -> usize {
    self
      .vertices
      .iter()
      .filter(|v| v.state != VertexState::Done)
      .count()
  }

  fn dependencies_done(&self, index: usize) -> bool {
    self.vertices[index].predecessors.iter().all(|id| {
      self
        .index
        .get(id)
        .is_some_and(|&i| self.vertices[i].state == VertexState::Done)
    })
  }

  /// Outputs consumed by outgoing edges, or every output when there are none.
  fn scope_for(&self, vertex_id: &str) -> BuildScope {
    let consumed: Vec<&str> = self
      .edges
      .iter()
      .filter(|e| e.source_id == vertex_id)
      .map(|e| e.source_output.as_str())
      .collect();
    let scope = if consumed.is_empty() {
      BuildScope::all()
    } else {
      BuildScope::outputs(consumed)
    };
    match &self.flow_id {
      Some(flow_id) => scope.with_flow_id(flow_id.clone()),
      None => scope,
    }
  }

  fn propagate(&mut self, source_id: &str, results: &ResultMap) {
    for edge in self.edges.iter().filter(|e| e.source_id == source_id) {
      let Some(value) = results.get(&edge.source_output) else {
        continue;
      };
      let Some(&target) = self.index.get(&edge.target_id) else {
        continue;
      };
      let vertex = &mut self.vertices[target];
      if vertex.state != VertexState::Done {
        vertex.component.resolve_input(&edge.target_input, value.clone());
      }
    }
  }

  fn enqueue_successors(&mut self, index: usize) {
    let successors = self.vertices[index].successors.clone();
    for id in successors {
      let Some(&i) = self.index.get(&id) else {
        continue;
      };
      if self.vertices[i].state == VertexState::Pending && self.dependencies_done(i) {
        self.vertices[i].state = VertexState::Ready;
        self.run_queue.push_back(id);
      }
    }
  }

  /// Depth-first search with three-color marking; a back edge is a cycle.
  fn detect_cycle(&self) -> Result<(), GraphError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
      Unvisited,
      InProgress,
      Done,
    }

    fn visit(index: usize, graph_vertices: &[Vertex], lookup: &HashMap<String, usize>, marks: &mut [Mark]) -> Option<usize> {
      marks[index] = Mark::InProgress;
      for successor in &graph_vertices[index].successors {
        let Some(&next) = lookup.get(successor) else {
          continue;
        };
        match marks[next] {
          Mark::InProgress => return Some(next),
          Mark::Unvisited => {
            if let Some(found) = visit(next, graph_vertices, lookup, marks) {
              return Some(found);
            }
          }
          Mark::Done => {}
        }
      }
      marks[index] = Mark::Done;
      None
    }

    let mut marks = vec![Mark::Unvisited; self.vertices.len()];
    for i in 0..self.vertices.len() {
      if marks[i] == Mark::Unvisited
        && let Some(found) = visit(i, &self.vertices, &self.index, &mut marks)
      {
        return Err(GraphError::Cycle {
          vertex_id: self.vertices[found].id.clone(),
        });
      }
    }
    Ok(())
  }
}

/// Synchronous run over a graph, returned by [`Graph::run`].
pub struct Run<'a, N: GraphNotifier> {
  graph: &'a mut Graph<N>,
  stopped: bool,
}

impl<N: GraphNotifier> Iterator for Run<'_, N> {
  type Item = Result<GraphEvent, GraphError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.stopped {
      return None;
    }
    match futures::executor::block_on(self.graph.next_event()) {
      Ok(Some(event)) => Some(Ok(event)),
      Ok(None) => None,
      Err(e) => {
        self.stopped = true;
        Some(Err(e))
      }
    }
  }
}
