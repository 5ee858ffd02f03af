// SPDX-License-Identifier: MIT

//! Graph builder - registers stages and edges, validates the wiring

use std::collections::HashMap;
use std::sync::Arc;

use super::executor::WorkflowGraph;
use super::types::{Edge, Intent, Next, Router, StageId};
use crate::error::GraphError;
use crate::workflow::stage::Stage;

/// Builds a `WorkflowGraph`
pub struct GraphBuilder {
    name: String,
    entry: Option<StageId>,
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Edge>,
    max_review_passes: Option<u32>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            stages: HashMap::new(),
            edges: HashMap::new(),
            max_review_passes: None,
        }
    }

    /// Register a stage under its own id (a later stage with the same id replaces it)
    pub fn add_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.id(), stage);
        self
    }

    pub fn set_entry(mut self, entry: StageId) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Fixed edge `from -> to`
    pub fn add_edge(mut self, from: StageId, to: impl Into<Next>) -> Self {
        self.edges.insert(from, Edge::Fixed(to.into()));
        self
    }

    /// Conditional edge: `router` picks a label, `targets` maps it to a successor
    pub fn add_branch(
        mut self,
        from: StageId,
        router: Router,
        targets: impl IntoIterator<Item = (Intent, Next)>,
    ) -> Self {
        self.edges.insert(
            from,
            Edge::Branch {
                router,
                targets: targets.into_iter().collect(),
            },
        );
        self
    }

    /// Cap the number of human decisions per run; `None` leaves the loop unbounded
    pub fn max_review_passes(mut self, limit: Option<u32>) -> Self {
        self.max_review_passes = limit;
        self
    }

    pub fn build(self) -> Result<WorkflowGraph, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if !self.stages.contains_key(&entry) {
            return Err(GraphError::UnknownStage(entry));
        }

        for id in self.stages.keys() {
            if !self.edges.contains_key(id) {
                return Err(GraphError::MissingEdge(*id));
            }
        }

        for (from, edge) in &self.edges {
            if !self.stages.contains_key(from) {
                return Err(GraphError::UnknownStage(*from));
            }

            match edge {
                Edge::Fixed(next) => self.check_target(*next)?,
                Edge::Branch { targets, .. } => {
                    for label in Intent::ALL {
                        let next = targets.get(&label).ok_or(GraphError::MissingBranchTarget {
                            stage: *from,
                            label: label.as_str(),
                        })?;
                        self.check_target(*next)?;
                    }
                }
            }
        }

        Ok(WorkflowGraph::new(
            self.name,
            entry,
            self.stages,
            self.edges,
            self.max_review_passes,
        ))
    }

    fn check_target(&self, next: Next) -> Result<(), GraphError> {
        match next {
            Next::End => Ok(()),
            Next::Stage(id) if self.stages.contains_key(&id) => Ok(()),
            Next::Stage(id) => Err(GraphError::UnknownStage(id)),
        }
    }
}
