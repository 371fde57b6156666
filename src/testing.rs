//! A scripted [`ModelClient`] for exercising the pipeline without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GraderError, GraderResult};
use crate::llm::ModelClient;
use crate::stages::StageRole;

/// One request seen by a [`ScriptedClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub role: StageRole,
    pub message: String,
}

/// Answers each role with a canned response, or fails for chosen roles.
///
/// The role is recognised from the instructions sent with the request.
/// Requests for a role with no script fail.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: HashMap<StageRole, Result<String, String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, role: StageRole, output: impl Into<String>) -> Self {
        self.script.insert(role, Ok(output.into()));
        self
    }

    pub fn fail_on(mut self, role: StageRole, error: impl Into<String>) -> Self {
        self.script.insert(role, Err(error.into()));
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn roles_called(&self) -> Vec<StageRole> {
        self.calls().into_iter().map(|c| c.role).collect()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn send_message(&self, instructions: &str, message: &str) -> GraderResult<String> {
        let role = StageRole::ALL
            .into_iter()
            .find(|r| r.instructions() == instructions)
            .ok_or_else(|| {
                GraderError::ModelInvocation("request does not match any stage role".to_string())
            })?;

        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                role,
                message: message.to_string(),
            });

        match self.script.get(&role) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(error)) => Err(GraderError::ModelInvocation(error.clone())),
            None => Err(GraderError::ModelInvocation(format!(
                "no scripted response for {}",
                role
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
