use std::fmt;

use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::error::GraderResult;
use crate::llm::ModelClient;
use crate::models::{GradingOutcome, GradingResult};
use crate::stages::{
    execute_feedback, execute_grade, execute_justify, execute_read, Stage, StageRole,
};

/// Progress of a single grading run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Reading,
    Grading,
    GeneratingFeedback,
    Justifying,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Grading => "grading",
            Self::GeneratingFeedback => "generating-feedback",
            Self::Justifying => "justifying",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The four grading stages bound to one model client.
///
/// Stages run strictly in order: read, grade, feedback, justify. The first
/// failing stage ends the run and no partial record is produced.
#[derive(Debug)]
pub struct GradingPipeline<'a> {
    reader: Stage<'a>,
    grader: Stage<'a>,
    feedback_generator: Stage<'a>,
    justifier: Stage<'a>,
}

impl<'a> GradingPipeline<'a> {
    pub fn new(client: &'a dyn ModelClient) -> Self {
        Self {
            reader: Stage::new(StageRole::Reader, client),
            grader: Stage::new(StageRole::Grader, client),
            feedback_generator: Stage::new(StageRole::FeedbackGenerator, client),
            justifier: Stage::new(StageRole::Justifier, client),
        }
    }

    /// Grade `assignment_text`. Errors are returned as `GradingOutcome::Failed`.
    pub async fn run(&self, run_id: Uuid, assignment_text: &str) -> GradingOutcome {
        let span = tracing::info_span!("grading_run", %run_id);

        async {
            let mut state = PipelineState::Idle;
            info!("Grading {} chars of assignment text", assignment_text.len());

            match self.run_stages(assignment_text, &mut state).await {
                Ok(result) => {
                    transition(&mut state, PipelineState::Done);
                    GradingOutcome::Graded(result)
                }
                Err(e) => {
                    warn!("Grading failed while {}: {}", state, e);
                    transition(&mut state, PipelineState::Failed);
                    GradingOutcome::failed(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        assignment_text: &str,
        state: &mut PipelineState,
    ) -> GraderResult<GradingResult> {
        transition(state, PipelineState::Reading);
        let cleaned_text = execute_read(&self.reader, assignment_text).await?;

        transition(state, PipelineState::Grading);
        let graded = execute_grade(&self.grader, &cleaned_text).await?;
        let grade = graded.fields.grade;

        transition(state, PipelineState::GeneratingFeedback);
        let feedback = execute_feedback(&self.feedback_generator, &cleaned_text, grade).await?;

        transition(state, PipelineState::Justifying);
        let grade_justification = execute_justify(&self.justifier, &cleaned_text, grade).await?;

        Ok(GradingResult {
            marks: graded.fields.marks,
            grade,
            rationale: GradingResult::rationale_for(grade),
            feedback,
            grade_justification,
        })
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    info!("Pipeline: {} -> {}", state, next);
    *state = next;
}

/// Run the full grading pipeline once against `client`
pub async fn run_grading_pipeline(
    client: &dyn ModelClient,
    assignment_text: &str,
) -> GradingOutcome {
    GradingPipeline::new(client)
        .run(Uuid::new_v4(), assignment_text)
        .await
}
