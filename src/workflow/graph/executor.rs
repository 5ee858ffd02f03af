// SPDX-License-Identifier: MIT

//! Graph workflow executor

use std::collections::HashMap;
use std::sync::Arc;

use super::types::{Edge, Intent, Next, StageId};
use crate::error::{GraphError, PipelineError};
use crate::workflow::stage::Stage;
use crate::workflow::state::WorkflowState;

/// Result of a run with the path the engine took
#[derive(Debug, Clone)]
pub struct ExecutionTrace {
    pub state: WorkflowState,
    /// Stages in the order they ran
    pub visited: Vec<StageId>,
    /// Number of times a branch edge was evaluated
    pub review_passes: u32,
}

/// Graph-based workflow executor
///
/// Runs one stage at a time starting from the entry, merging each partial
/// update into the accumulated state, until an edge resolves to `Next::End`.
pub struct WorkflowGraph {
    name: String,
    entry: StageId,
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Edge>,
    max_review_passes: Option<u32>,
}

impl WorkflowGraph {
    pub(super) fn new(
        name: String,
        entry: StageId,
        stages: HashMap<StageId, Arc<dyn Stage>>,
        edges: HashMap<StageId, Edge>,
        max_review_passes: Option<u32>,
    ) -> Self {
        Self {
            name,
            entry,
            stages,
            edges,
            max_review_passes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> StageId {
        self.entry
    }

    pub fn edge(&self, from: StageId) -> Option<&Edge> {
        self.edges.get(&from)
    }

    /// Registered stages in declaration order of `StageId`
    pub fn stage_ids(&self) -> Vec<StageId> {
        StageId::ALL
            .into_iter()
            .filter(|id| self.stages.contains_key(id))
            .collect()
    }

    /// Resolve the successor of `from` against the current state
    pub fn next_stage(&self, from: StageId, state: &WorkflowState) -> Result<Next, GraphError> {
        match self.edges.get(&from) {
            None => Err(GraphError::MissingEdge(from)),
            Some(Edge::Fixed(next)) => Ok(*next),
            Some(Edge::Branch { router, targets }) => {
                let label = router(state);
                targets
                    .get(&label)
                    .copied()
                    .ok_or(GraphError::MissingBranchTarget {
                        stage: from,
                        label: label.as_str(),
                    })
            }
        }
    }

    /// Run the workflow to completion
    pub async fn run(&self, initial: WorkflowState) -> Result<WorkflowState, PipelineError> {
        Ok(self.run_traced(initial).await?.state)
    }

    /// Run the workflow and keep the list of visited stages
    pub async fn run_traced(&self, initial: WorkflowState) -> Result<ExecutionTrace, PipelineError> {
        let mut state = initial;
        let mut visited = Vec::new();
        let mut review_passes = 0u32;
        let mut current = Next::Stage(self.entry);

        log::info!("Running workflow '{}' from {}", self.name, self.entry);

        while let Next::Stage(id) = current {
            let stage = self.stages.get(&id).ok_or(GraphError::UnknownStage(id))?;

            log::info!("Executing stage: {}", id);
            let update = stage.run(&state).await?;
            log::debug!("Stage {} updated {:?}", id, update.touched_fields());
            state.apply(update);
            visited.push(id);

            let next = self.next_stage(id, &state)?;

            if let Some(Edge::Branch { router, .. }) = self.edges.get(&id) {
                review_passes += 1;
                let label = router(&state);
                log::info!("Branch at {} resolved '{}' -> {}", id, label, next);

                if label == Intent::Improve {
                    if let Some(limit) = self.max_review_passes {
                        if review_passes >= limit {
                            log::error!("Workflow '{}' hit the review pass cap", self.name);
                            return Err(PipelineError::MaxIterations {
                                kind: "review passes".to_string(),
                                limit,
                            });
                        }
                    }
                }
            }

            current = next;
        }

        log::info!(
            "Workflow '{}' finished after {} stages",
            self.name,
            visited.len()
        );
        log::debug!("Final state: {}", state.to_json());

        Ok(ExecutionTrace {
            state,
            visited,
            review_passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::graph::{route_on_intent, GraphBuilder};
    use crate::workflow::state::StateUpdate;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // Mock stage - returns a fixed update every time
    struct FixedStage {
        id: StageId,
        update: StateUpdate,
    }

    #[async_trait]
    impl Stage for FixedStage {
        fn id(&self) -> StageId {
            self.id
        }

        async fn run(&self, _state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
            Ok(self.update.clone())
        }
    }

    // Mock gate - replays intents, captures the state it saw
    struct ScriptedGate {
        intents: Mutex<VecDeque<&'static str>>,
        seen: Arc<Mutex<Vec<WorkflowState>>>,
    }

    #[async_trait]
    impl Stage for ScriptedGate {
        fn id(&self) -> StageId {
            StageId::HumanGate
        }

        async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
            self.seen.lock().unwrap().push(state.clone());
            let intent = self.intents.lock().unwrap().pop_front().unwrap_or("stop");
            Ok(StateUpdate::new().intent(intent))
        }
    }

    struct FailingStage(StageId);

    #[async_trait]
    impl Stage for FailingStage {
        fn id(&self) -> StageId {
            self.0
        }

        async fn run(&self, _state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
            Err(PipelineError::MissingField {
                stage: self.0,
                field: "scraped_text",
            })
        }
    }

    fn fixed(id: StageId, update: StateUpdate) -> Arc<dyn Stage> {
        Arc::new(FixedStage { id, update })
    }

    fn loop_graph(
        intents: Vec<&'static str>,
        max_passes: Option<u32>,
    ) -> (WorkflowGraph, Arc<Mutex<Vec<WorkflowState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let gate = ScriptedGate {
            intents: Mutex::new(intents.into()),
            seen: seen.clone(),
        };

        let graph = GraphBuilder::new("loop")
            .add_stage(fixed(StageId::Fetch, StateUpdate::new().scraped_text("page")))
            .add_stage(fixed(
                StageId::Generate,
                StateUpdate::new().generated_text("summary"),
            ))
            .add_stage(Arc::new(gate))
            .add_stage(fixed(StageId::Finalize, StateUpdate::new()))
            .set_entry(StageId::Fetch)
            .add_edge(StageId::Fetch, StageId::Generate)
            .add_edge(StageId::Generate, StageId::HumanGate)
            .add_branch(
                StageId::HumanGate,
                route_on_intent,
                [
                    (Intent::Stop, Next::Stage(StageId::Finalize)),
                    (Intent::Improve, Next::Stage(StageId::Generate)),
                ],
            )
            .add_edge(StageId::Finalize, Next::End)
            .max_review_passes(max_passes)
            .build()
            .unwrap();

        (graph, seen)
    }

    #[tokio::test]
    async fn test_linear_run_to_end() {
        let graph = GraphBuilder::new("linear")
            .add_stage(fixed(StageId::Fetch, StateUpdate::new().scraped_text("a")))
            .add_stage(fixed(
                StageId::Generate,
                StateUpdate::new().generated_text("b"),
            ))
            .set_entry(StageId::Fetch)
            .add_edge(StageId::Fetch, StageId::Generate)
            .add_edge(StageId::Generate, Next::End)
            .build()
            .unwrap();

        let trace = graph
            .run_traced(WorkflowState::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(trace.visited, vec![StageId::Fetch, StageId::Generate]);
        assert_eq!(trace.review_passes, 0);
        assert_eq!(trace.state.scraped_text.as_deref(), Some("a"));
        assert_eq!(trace.state.generated_text.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_stop_routes_to_finalize() {
        let (graph, _) = loop_graph(vec!["stop"], None);
        let trace = graph
            .run_traced(WorkflowState::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(
            trace.visited,
            vec![
                StageId::Fetch,
                StageId::Generate,
                StageId::HumanGate,
                StageId::Finalize
            ]
        );
        assert_eq!(trace.review_passes, 1);
    }

    #[tokio::test]
    async fn test_unrecognized_intent_loops_back() {
        let (graph, seen) = loop_graph(vec!["improve", "whatever", "stop"], None);
        let trace = graph
            .run_traced(WorkflowState::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(trace.review_passes, 3);
        assert_eq!(
            trace
                .visited
                .iter()
                .filter(|id| **id == StageId::Generate)
                .count(),
            3
        );
        assert_eq!(trace.visited.last(), Some(&StageId::Finalize));

        // Loop-backs never reset fields written before the loop
        for state in seen.lock().unwrap().iter() {
            assert_eq!(state.source_url(), "https://example.com");
            assert_eq!(state.scraped_text.as_deref(), Some("page"));
        }
    }

    #[tokio::test]
    async fn test_gate_sees_previous_intent_on_loop() {
        let (graph, seen) = loop_graph(vec!["improve", "stop"], None);
        graph
            .run(WorkflowState::new("https://example.com"))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].intent.is_none());
        assert_eq!(seen[1].intent.as_deref(), Some("improve"));
    }

    #[test]
    fn test_next_stage_routing() {
        let (graph, _) = loop_graph(vec![], None);
        let mut state = WorkflowState::new("https://example.com");

        assert_eq!(
            graph.next_stage(StageId::HumanGate, &state),
            Ok(Next::Stage(StageId::Generate))
        );

        for other in ["improve", "STOP", "maybe", ""] {
            state.intent = Some(other.to_string());
            assert_eq!(
                graph.next_stage(StageId::HumanGate, &state),
                Ok(Next::Stage(StageId::Generate)),
                "intent {:?} should loop",
                other
            );
        }

        state.intent = Some("stop".to_string());
        assert_eq!(
            graph.next_stage(StageId::HumanGate, &state),
            Ok(Next::Stage(StageId::Finalize))
        );
        assert_eq!(graph.next_stage(StageId::Finalize, &state), Ok(Next::End));
    }

    #[tokio::test]
    async fn test_review_pass_cap() {
        let (graph, _) = loop_graph(vec!["improve", "improve", "improve"], Some(2));
        let err = graph
            .run(WorkflowState::new("https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::MaxIterations { limit: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_cap_does_not_block_stop() {
        let (graph, _) = loop_graph(vec!["improve", "stop"], Some(2));
        let trace = graph
            .run_traced(WorkflowState::new("https://example.com"))
            .await
            .unwrap();
        assert_eq!(trace.visited.last(), Some(&StageId::Finalize));
    }

    #[tokio::test]
    async fn test_stage_failure_aborts_run() {
        let graph = GraphBuilder::new("failing")
            .add_stage(Arc::new(FailingStage(StageId::Score)))
            .set_entry(StageId::Score)
            .add_edge(StageId::Score, Next::End)
            .build()
            .unwrap();

        let err = graph
            .run(WorkflowState::new("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingField {
                stage: StageId::Score,
                ..
            }
        ));
    }

    #[test]
    fn test_stage_ids_in_order() {
        let (graph, _) = loop_graph(vec![], None);
        assert_eq!(
            graph.stage_ids(),
            vec![
                StageId::Fetch,
                StageId::Generate,
                StageId::HumanGate,
                StageId::Finalize
            ]
        );
    }
}
