pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{GraderError, GraderResult};
pub use io::{extract_text, DocumentKind, GradingReport, PreviewConfig, ReportMetadata};
pub use llm::{build_client, AnthropicClient, GeminiClient, LlmConfig, ModelClient, Provider};
pub use models::{Grade, GradeLetter, GradingOutcome, GradingResult};
pub use pipeline::{run_grading_pipeline, GradingPipeline, PipelineState};
pub use stages::{Stage, StageRole};
