//! The AI tutor collaborator.
//!
//! Implementations talk to a generative model; callers go through
//! [`generate_solution`] and [`explain_step`], which never fail and instead
//! fold every error into a user-facing message.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const SOLVE_FAILED: &str = "Failed to generate solution. Please try again.";
pub const EXPLAIN_FAILED: &str = "Failed to explain step. Please try again.";
pub const NO_SOLUTION: &str = "An unexpected error occurred, or the AI did not return a solution.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub problem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub problem: String,
    pub solution: String,
    /// 1-indexed position of the step in the parsed solution.
    pub step_number: usize,
}

/// Generative-AI service able to solve problems and explain steps.
#[async_trait]
pub trait MathTutor: Send + Sync {
    async fn solve(&self, request: &SolveRequest) -> Result<String>;
    async fn explain(&self, request: &ExplainRequest) -> Result<String>;
}

/// Outcome of a tutor call: exactly one of `value` or `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TutorReply {
    pub fn ok(value: String) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> std::result::Result<String, String> {
        match (self.value, self.error) {
            (_, Some(error)) => Err(error),
            (Some(value), None) => Ok(value),
            (None, None) => Err(NO_SOLUTION.to_string()),
        }
    }
}

/// Ask the tutor for a solution. Blank answers count as failures.
pub async fn generate_solution(tutor: &dyn MathTutor, request: &SolveRequest) -> TutorReply {
    match tutor.solve(request).await {
        Ok(solution) if solution.trim().is_empty() => {
            warn!("[Tutor] Empty solution returned");
            TutorReply::failed(NO_SOLUTION)
        }
        Ok(solution) => TutorReply::ok(solution),
        Err(e) => {
            error!("[Tutor] Error generating solution: {}", e);
            TutorReply::failed(SOLVE_FAILED)
        }
    }
}

/// Ask the tutor to explain one step.
pub async fn explain_step(tutor: &dyn MathTutor, request: &ExplainRequest) -> TutorReply {
    match tutor.explain(request).await {
        Ok(explanation) if !explanation.trim().is_empty() => TutorReply::ok(explanation),
        Ok(_) => {
            warn!("[Tutor] Empty explanation for step {}", request.step_number);
            TutorReply::failed(EXPLAIN_FAILED)
        }
        Err(e) => {
            error!("[Tutor] Error explaining step {}: {}", request.step_number, e);
            TutorReply::failed(EXPLAIN_FAILED)
        }
    }
}
