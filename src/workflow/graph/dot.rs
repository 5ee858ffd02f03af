// SPDX-License-Identifier: MIT

//! Graphviz rendering of a workflow graph

use std::fmt::Write;

use super::executor::WorkflowGraph;
use super::types::{Edge, Intent};

/// Render the graph as a DOT digraph: entry marker, fixed edges, labelled branches, END
pub fn to_dot(graph: &WorkflowGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", graph.name());
    let _ = writeln!(out, "    ENTRY [label=\"ENTRY POINT\", shape=circle];");
    for id in graph.stage_ids() {
        let _ = writeln!(out, "    {} [label=\"{}\"];", id, id);
    }
    let _ = writeln!(out, "    END [label=\"END\", shape=doublecircle];");
    let _ = writeln!(out, "    ENTRY -> {};", graph.entry());

    for id in graph.stage_ids() {
        match graph.edge(id) {
            Some(Edge::Fixed(next)) => {
                let _ = writeln!(out, "    {} -> {};", id, next);
            }
            Some(Edge::Branch { targets, .. }) => {
                for label in Intent::ALL {
                    if let Some(next) = targets.get(&label) {
                        let _ = writeln!(
                            out,
                            "    {} -> {} [label=\"intent = {}\"];",
                            id, next, label
                        );
                    }
                }
            }
            None => {}
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::workflow::graph::{route_on_intent, GraphBuilder, Next, StageId};
    use crate::workflow::stage::Stage;
    use crate::workflow::state::{StateUpdate, WorkflowState};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopStage(StageId);

    #[async_trait]
    impl Stage for NoopStage {
        fn id(&self) -> StageId {
            self.0
        }

        async fn run(&self, _state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
            Ok(StateUpdate::new())
        }
    }

    #[test]
    fn test_dot_output() {
        let graph = GraphBuilder::new("demo")
            .add_stage(Arc::new(NoopStage(StageId::Generate)))
            .add_stage(Arc::new(NoopStage(StageId::HumanGate)))
            .add_stage(Arc::new(NoopStage(StageId::Finalize)))
            .set_entry(StageId::Generate)
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
            .build()
            .unwrap();

        let dot = to_dot(&graph);
        assert!(dot.starts_with("digraph \"demo\" {"));
        assert!(dot.contains("ENTRY -> Generate;"));
        assert!(dot.contains("Generate -> HumanGate;"));
        assert!(dot.contains("HumanGate -> Finalize [label=\"intent = stop\"];"));
        assert!(dot.contains("HumanGate -> Generate [label=\"intent = improve\"];"));
        assert!(dot.contains("Finalize -> END;"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
