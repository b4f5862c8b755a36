//! Maps accepted steps to discrete render events.
//!
//! The mapper tracks how many nodes a renderer has on screen so each event
//! carries enough payload to act on without re-reading the challenge. Timing
//! and animation are left to the renderer.

use serde::Serialize;

use crate::domain::{StepDefinition, VisualizationKind};
use crate::engine::progression::Transition;

/// A link drawn between two adjacent nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NodeLink {
  pub from: usize,
  pub to: usize,
}

/// One "visiting index i" sub-event of a traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Visit {
  pub index: usize,
}

/// Ordered visit sequence over `0..node_count`.
///
/// Visits are produced lazily, and every call to [`Traversal::visits`]
/// restarts at index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Traversal {
  node_count: usize,
}

impl Traversal {
  pub fn new(node_count: usize) -> Self {
    Self { node_count }
  }

  pub fn len(&self) -> usize {
    self.node_count
  }

  pub fn is_empty(&self) -> bool {
    self.node_count == 0
  }

  pub fn visits(&self) -> Visits {
    Visits { next: 0, end: self.node_count }
  }
}

impl IntoIterator for &Traversal {
  type Item = Visit;
  type IntoIter = Visits;

  fn into_iter(self) -> Visits {
    self.visits()
  }
}

#[derive(Clone, Debug)]
pub struct Visits {
  next: usize,
  end: usize,
}

impl Iterator for Visits {
  type Item = Visit;

  fn next(&mut self) -> Option<Visit> {
    if self.next >= self.end {
      return None;
    }
    let v = Visit { index: self.next };
    self.next += 1;
    Some(v)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let left = self.end.saturating_sub(self.next);
    (left, Some(left))
  }
}

impl ExactSizeIterator for Visits {}

/// What the renderer should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderAction {
  /// A node was appended at `node_index`.
  NodeCreate { node_index: usize },
  /// The two most recent nodes were linked; `None` if fewer than two exist.
  NodeLink { link: Option<NodeLink> },
  NodeTraverse { traversal: Traversal },
  Complete,
  Console,
}

/// A discrete signal describing what to depict for one accepted step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisualizationEvent {
  pub step_id: u32,
  pub kind: VisualizationKind,
  /// True when the step that produced this event finished the challenge.
  pub is_terminal: bool,
  /// Nodes on screen after this event.
  pub node_count: usize,
  pub action: RenderAction,
}

#[derive(Clone, Debug)]
pub struct EventMapper {
  node_count: usize,
}

impl EventMapper {
  pub fn new(initial_nodes: usize) -> Self {
    Self { node_count: initial_nodes }
  }

  pub fn node_count(&self) -> usize {
    self.node_count
  }

  /// Builds the event for `step`. No transition means no event.
  pub fn map_event(
    &mut self,
    step: &StepDefinition,
    transition: Option<&Transition>,
  ) -> Option<VisualizationEvent> {
    let transition = transition?;

    let action = match step.visualization_kind {
      VisualizationKind::NodeCreate => {
        let node_index = self.node_count;
        self.node_count += 1;
        RenderAction::NodeCreate { node_index }
      }
      VisualizationKind::NodeLink => {
        let link = (self.node_count >= 2).then(|| NodeLink {
          from: self.node_count - 2,
          to: self.node_count - 1,
        });
        RenderAction::NodeLink { link }
      }
      VisualizationKind::NodeTraverse => RenderAction::NodeTraverse {
        traversal: Traversal::new(self.node_count),
      },
      VisualizationKind::Complete => RenderAction::Complete,
      VisualizationKind::Console => RenderAction::Console,
    };

    Some(VisualizationEvent {
      step_id: step.id,
      kind: step.visualization_kind,
      is_terminal: transition.completed,
      node_count: self.node_count,
      action,
    })
  }
}
