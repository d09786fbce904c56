//! Task dependency graph.
//!
//! Nodes are tasks; an edge runs from a prerequisite to the task that needs
//! it. The graph is checked for cycles on construction.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::TaskKind;
use super::types::TaskError;

pub struct TaskGraph {
  graph: DiGraph<TaskKind, ()>,
  nodes: HashMap<TaskKind, NodeIndex>,
}

impl TaskGraph {
  /// The graph of the built-in tasks and their prerequisites.
  pub fn standard() -> Result<Self, TaskError> {
    Self::new(TaskKind::ALL.into_iter().map(|task| (task, task.prerequisites())))
  }

  /// Build a graph from `(task, prerequisites)` pairs.
  ///
  /// Prerequisites that are not themselves listed are added as nodes.
  pub fn new<'a>(tasks: impl IntoIterator<Item = (TaskKind, &'a [TaskKind])>) -> Result<Self, TaskError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    let mut node = |graph: &mut DiGraph<TaskKind, ()>, task: TaskKind| {
      *nodes.entry(task).or_insert_with(|| graph.add_node(task))
    };

    let mut edges = Vec::new();
    for (task, prerequisites) in tasks {
      let dependent = node(&mut graph, task);
      for &prerequisite in prerequisites {
        edges.push((node(&mut graph, prerequisite), dependent));
      }
    }
    for (from, to) in edges {
      graph.update_edge(from, to, ());
    }

    let dag = Self { graph, nodes };
    dag.verify_acyclic()?;
    Ok(dag)
  }

  fn verify_acyclic(&self) -> Result<(), TaskError> {
    toposort(&self.graph, None).map_err(|cycle| TaskError::CycleDetected(self.graph[cycle.node_id()]))?;
    Ok(())
  }

  /// Direct prerequisites of `task`, in declaration order of [`TaskKind`].
  pub fn prerequisites(&self, task: TaskKind) -> Vec<TaskKind> {
    let Some(&idx) = self.nodes.get(&task) else {
      return Vec::new();
    };

    let mut deps: Vec<TaskKind> = self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep| self.graph[dep])
      .collect();
    deps.sort();
    deps
  }

  /// Expand requested tasks into an execution plan.
  ///
  /// Each task's prerequisites come before it, requested tasks keep their
  /// relative order, and no task appears twice.
  pub fn plan(&self, requested: &[TaskKind]) -> Result<Vec<TaskKind>, TaskError> {
    let mut plan = Vec::new();
    let mut done = HashSet::new();
    let mut visiting = HashSet::new();

    for &task in requested {
      self.visit(task, &mut plan, &mut done, &mut visiting)?;
    }

    Ok(plan)
  }

  fn visit(
    &self,
    task: TaskKind,
    plan: &mut Vec<TaskKind>,
    done: &mut HashSet<TaskKind>,
    visiting: &mut HashSet<TaskKind>,
  ) -> Result<(), TaskError> {
    if done.contains(&task) {
      return Ok(());
    }
    if !visiting.insert(task) {
      return Err(TaskError::CycleDetected(task));
    }

    for prerequisite in self.prerequisites(task) {
      self.visit(prerequisite, plan, done, visiting)?;
    }

    visiting.remove(&task);
    done.insert(task);
    plan.push(task);
    Ok(())
  }

  pub fn task_count(&self) -> usize {
    self.nodes.len()
  }
}
