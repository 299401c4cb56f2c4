//! Solve and explain endpoints.

use crate::config::AppState;
use crate::error::Result;
use axum::{extract::State, Json};
use mathfluent_core::solution::session::MISSING_CONTEXT;
use mathfluent_core::tutor::explain_step;
use mathfluent_core::{CoreError, ExplainRequest, SolutionSession, SolutionStep, SolveRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct SolveResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default)]
    pub steps: Vec<SolutionStep>,
    /// A single long step, shown as a plain answer rather than a walkthrough
    #[serde(default)]
    pub direct_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /solve
///
/// Tutor failures come back as `200` with `error` set; only an empty
/// problem is rejected outright.
pub async fn solve(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<SolveResponse>> {
    info!("POST /solve");

    let response = match SolutionSession::solve(state.tutor.as_ref(), &request).await {
        Ok(session) => SolveResponse {
            direct_answer: session.is_direct_answer(),
            solution: Some(session.solution().to_string()),
            steps: session.into_steps(),
            error: None,
        },
        Err(CoreError::Tutor(message)) => SolveResponse {
            solution: None,
            steps: Vec::new(),
            direct_answer: false,
            error: Some(message),
        },
        Err(e) => return Err(e.into()),
    };

    Ok(Json(response))
}

/// POST /explain
pub async fn explain(
    State(state): State<AppState>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>> {
    info!("POST /explain (step {})", request.step_number);

    if request.problem.trim().is_empty()
        || request.solution.trim().is_empty()
        || request.step_number == 0
    {
        return Err(CoreError::invalid("step", MISSING_CONTEXT).into());
    }

    let reply = explain_step(state.tutor.as_ref(), &request).await;
    Ok(Json(ExplainResponse {
        explanation: reply.value,
        error: reply.error,
    }))
}
