use std::fmt;

use tracing::debug;

use crate::error::GraderResult;
use crate::llm::{
    ModelClient, FEEDBACK_INSTRUCTIONS, GRADER_INSTRUCTIONS, JUSTIFIER_INSTRUCTIONS,
    READER_INSTRUCTIONS,
};

/// The four fixed roles of the grading pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageRole {
    Reader,
    Grader,
    FeedbackGenerator,
    Justifier,
}

impl StageRole {
    pub const ALL: [StageRole; 4] = [
        StageRole::Reader,
        StageRole::Grader,
        StageRole::FeedbackGenerator,
        StageRole::Justifier,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Reader => "AssignmentReader",
            Self::Grader => "GradingAgent",
            Self::FeedbackGenerator => "FeedbackAgent",
            Self::Justifier => "GradeJustifier",
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Self::Reader => READER_INSTRUCTIONS,
            Self::Grader => GRADER_INSTRUCTIONS,
            Self::FeedbackGenerator => FEEDBACK_INSTRUCTIONS,
            Self::Justifier => JUSTIFIER_INSTRUCTIONS,
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A role bound to a model client.
///
/// Holds no state between calls; every `respond` is a fresh request.
#[derive(Clone, Copy)]
pub struct Stage<'a> {
    role: StageRole,
    client: &'a dyn ModelClient,
}

impl<'a> Stage<'a> {
    pub fn new(role: StageRole, client: &'a dyn ModelClient) -> Self {
        Self { role, client }
    }

    pub fn role(&self) -> StageRole {
        self.role
    }

    pub fn instructions(&self) -> &'static str {
        self.role.instructions()
    }

    /// Send `message` under this role's instructions and return the raw answer
    pub async fn respond(&self, message: &str) -> GraderResult<String> {
        debug!(
            "{}: sending {} chars to {}",
            self.role,
            message.len(),
            self.client.model_name()
        );
        let output = self.client.send_message(self.instructions(), message).await?;
        debug!("{}: received {} chars", self.role, output.len());
        Ok(output)
    }
}

impl fmt::Debug for Stage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("role", &self.role)
            .field("model", &self.client.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    #[test]
    fn test_role_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            StageRole::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), 4);
    }

    #[tokio::test]
    async fn test_respond_sends_role_instructions() {
        let client = ScriptedClient::new().respond(StageRole::Grader, "Score: 50/100\nGrade: D");
        let stage = Stage::new(StageRole::Grader, &client);

        let output = stage.respond("Grade this").await.unwrap();

        assert_eq!(output, "Score: 50/100\nGrade: D");
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].role, StageRole::Grader);
        assert_eq!(calls[0].message, "Grade this");
    }

    #[tokio::test]
    async fn test_respond_propagates_client_failure() {
        let client = ScriptedClient::new().fail_on(StageRole::Reader, "connection refused");
        let stage = Stage::new(StageRole::Reader, &client);

        let err = stage.respond("anything").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
