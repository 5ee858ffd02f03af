// SPDX-License-Identifier: MIT

//! Pipeline assembly - wires collaborators into the revision graph and runs it
//!
//! ```text
//! ENTRY -> Fetch -> Generate -> Review -> Score -> Persist -> HumanGate
//! HumanGate --stop--> Finalize -> END
//! HumanGate --improve--> Generate
//! ```

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

use crate::capability::collection::InMemoryCollection;
use crate::capability::decision::ConsoleDecisions;
use crate::capability::huggingface::{HuggingFaceEndpoint, HuggingFaceGenerator, HuggingFaceSimilarity};
use crate::capability::lexical::LexicalScorer;
use crate::capability::speech::{CommandSpeaker, ConsoleSpeaker};
use crate::capability::web::HttpPageFetcher;
use crate::capability::{
    DecisionProvider, DocumentStore, PageFetcher, SimilarityScorer, Speaker, TextGenerator,
};
use crate::config::{Config, ScorerKind};
use crate::error::{CapabilityError, PipelineError};
use crate::output::write_final_artifact;
use crate::stages::{
    parse_source_url, FetchStage, FinalizeStage, GenerateStage, HumanGateStage, PersistStage,
    ReviewStage, ScoreStage,
};
use crate::versioning::{ExportReport, VersionRecorder};
use crate::workflow::graph::{route_on_intent, GraphBuilder, Intent, Next, StageId, WorkflowGraph};
use crate::workflow::state::WorkflowState;

pub const COLLECTION_NAME: &str = "book_versions";

/// Everything the stages call out to
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn PageFetcher>,
    pub summarizer: Arc<dyn TextGenerator>,
    pub reviewer: Arc<dyn TextGenerator>,
    pub scorer: Arc<dyn SimilarityScorer>,
    pub speaker: Arc<dyn Speaker>,
    pub decisions: Arc<dyn DecisionProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Collaborators {
    /// Real adapters: HTTP fetch, inference API, stdin decisions, in-memory store
    pub fn from_config(config: &Config) -> Result<Self, CapabilityError> {
        let timeout = config.request_timeout();
        let endpoint =
            HuggingFaceEndpoint::new(&config.api_base_url, config.api_token.clone(), timeout)?;

        let scorer: Arc<dyn SimilarityScorer> = match config.scorer {
            ScorerKind::Lexical => Arc::new(LexicalScorer::new()),
            ScorerKind::Remote => Arc::new(HuggingFaceSimilarity::new(
                endpoint.clone(),
                &config.similarity_model,
            )),
        };

        let speaker: Arc<dyn Speaker> = match &config.speech_command {
            Some(program) => Arc::new(CommandSpeaker::new(program, config.speech_args.clone())),
            None => Arc::new(ConsoleSpeaker),
        };

        Ok(Self {
            fetcher: Arc::new(HttpPageFetcher::new(timeout)?),
            summarizer: Arc::new(HuggingFaceGenerator::new(
                endpoint.clone(),
                &config.summary_model,
            )),
            reviewer: Arc::new(HuggingFaceGenerator::new(endpoint, &config.review_model)),
            scorer,
            speaker,
            decisions: Arc::new(ConsoleDecisions::new()),
            store: Arc::new(InMemoryCollection::new(COLLECTION_NAME)),
        })
    }
}

/// Build the revision graph from stages bound to `collaborators`
pub fn build_workflow(
    config: &Config,
    collaborators: &Collaborators,
    recorder: Arc<VersionRecorder>,
) -> Result<WorkflowGraph, PipelineError> {
    let graph = GraphBuilder::new("revision-loop")
        .add_stage(Arc::new(FetchStage::new(collaborators.fetcher.clone())))
        .add_stage(Arc::new(GenerateStage::new(
            collaborators.summarizer.clone(),
            config.generation_params(),
            config.summary_input_chars,
        )))
        .add_stage(Arc::new(ReviewStage::new(collaborators.reviewer.clone())))
        .add_stage(Arc::new(ScoreStage::new(collaborators.scorer.clone())))
        .add_stage(Arc::new(PersistStage::new(recorder)))
        .add_stage(Arc::new(HumanGateStage::new(
            collaborators.decisions.clone(),
        )))
        .add_stage(Arc::new(FinalizeStage::new(collaborators.speaker.clone())))
        .set_entry(StageId::Fetch)
        .add_edge(StageId::Fetch, StageId::Generate)
        .add_edge(StageId::Generate, StageId::Review)
        .add_edge(StageId::Review, StageId::Score)
        .add_edge(StageId::Score, StageId::Persist)
        .add_edge(StageId::Persist, StageId::HumanGate)
        .add_branch(
            StageId::HumanGate,
            route_on_intent,
            [
                (Intent::Stop, Next::Stage(StageId::Finalize)),
                (Intent::Improve, Next::Stage(StageId::Generate)),
            ],
        )
        .add_edge(StageId::Finalize, Next::End)
        .max_review_passes(config.max_review_passes)
        .build()?;

    Ok(graph)
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    pub state: WorkflowState,
    pub visited: Vec<StageId>,
    pub review_passes: u32,
    /// Final text artifact, if a reviewed text existed
    pub artifact: Option<PathBuf>,
    pub export: ExportReport,
}

/// A wired pipeline ready to run
pub struct Pipeline {
    graph: WorkflowGraph,
    recorder: Arc<VersionRecorder>,
}

impl Pipeline {
    pub fn new(config: &Config, collaborators: Collaborators) -> Result<Self, PipelineError> {
        config.validate()?;
        let recorder = Arc::new(
            VersionRecorder::new(&config.output_dir, collaborators.store.clone())
                .with_export_file_name(&config.export_file_name),
        );
        let graph = build_workflow(config, &collaborators, recorder.clone())?;
        Ok(Self { graph, recorder })
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn recorder(&self) -> &VersionRecorder {
        &self.recorder
    }

    /// Run from `source_url` to termination, then write the final artifact and export.
    ///
    /// If the run or the artifact write fails, versions recorded so far are
    /// still exported before the error is returned.
    pub async fn run(&self, source_url: &str) -> Result<RunSummary, PipelineError> {
        parse_source_url(source_url)?;

        let trace = match self.graph.run_traced(WorkflowState::new(source_url)).await {
            Ok(trace) => trace,
            Err(e) => {
                log::error!("Workflow failed: {}", e);
                if let Err(export_err) = self.recorder.export_all().await {
                    log::error!("Export after failure also failed: {}", export_err);
                }
                return Err(e);
            }
        };

        // Export even if the artifact cannot be written
        let artifact =
            write_final_artifact(self.recorder.output_dir(), &trace.state, Local::now()).await;
        let export = self.recorder.export_all().await;
        let artifact = artifact?;
        let export = export?;

        Ok(RunSummary {
            state: trace.state,
            visited: trace.visited,
            review_passes: trace.review_passes,
            artifact,
            export,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::graph::to_dot;

    #[test]
    fn test_from_config_builds_standard_graph() {
        let config = Config::default();
        let collaborators = Collaborators::from_config(&config).unwrap();
        let pipeline = Pipeline::new(&config, collaborators).unwrap();

        assert_eq!(pipeline.graph().entry(), StageId::Fetch);
        assert_eq!(pipeline.graph().stage_ids(), StageId::ALL.to_vec());

        let dot = to_dot(pipeline.graph());
        assert!(dot.contains("Persist -> HumanGate;"));
        assert!(dot.contains("HumanGate -> Finalize [label=\"intent = stop\"];"));
        assert!(dot.contains("HumanGate -> Generate [label=\"intent = improve\"];"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            summary_input_chars: 0,
            ..Config::default()
        };
        let collaborators = Collaborators::from_config(&Config::default()).unwrap();
        assert!(matches!(
            Pipeline::new(&config, collaborators),
            Err(PipelineError::Config(_))
        ));
    }
}
