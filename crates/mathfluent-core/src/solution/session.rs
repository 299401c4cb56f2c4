//! State for one submitted problem: the raw solution, its steps and the
//! per-step explanation fetches.

use super::{parse_steps, SolutionStep};
use crate::error::{CoreError, Result};
use crate::tutor::{self, ExplainRequest, MathTutor, SolveRequest};
use crate::validation::validate_problem;
use tracing::{debug, info, warn};

pub const MISSING_CONTEXT: &str =
    "Missing problem or solution information to generate an explanation.";

/// Single steps longer than this are presented as a direct answer.
const DIRECT_ANSWER_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionSession {
    problem: String,
    solution: String,
    steps: Vec<SolutionStep>,
}

impl SolutionSession {
    /// Build a session from a solution that has already been generated.
    pub fn from_solution(problem: impl Into<String>, solution: impl Into<String>) -> Self {
        let solution = solution.into();
        let steps = parse_steps(&solution);
        Self {
            problem: problem.into(),
            solution,
            steps,
        }
    }

    /// Validate the problem, ask the tutor and parse the answer.
    ///
    /// Validation failures come back as [`CoreError::Validation`]; tutor
    /// failures as [`CoreError::Tutor`] carrying the user-facing message.
    pub async fn solve(tutor: &dyn MathTutor, request: &SolveRequest) -> Result<Self> {
        validate_problem(&request.problem)?;
        info!("[Solver] Solving problem ({} chars)", request.problem.len());

        let solution = tutor::generate_solution(tutor, request)
            .await
            .into_result()
            .map_err(CoreError::Tutor)?;

        let session = Self::from_solution(request.problem.clone(), solution);
        info!("[Solver] Parsed {} steps", session.steps.len());
        Ok(session)
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }

    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<SolutionStep> {
        self.steps
    }

    /// A single long step means the tutor answered directly instead of
    /// breaking the work down.
    pub fn is_direct_answer(&self) -> bool {
        matches!(self.steps.as_slice(), [only] if only.text.chars().count() > DIRECT_ANSWER_LEN)
    }

    /// Mark step `index` as loading and build the tutor request for it.
    ///
    /// Clears any earlier explanation or error of that step.
    pub fn begin_explanation(&mut self, index: usize) -> Result<(String, ExplainRequest)> {
        if self.problem.trim().is_empty() || self.solution.trim().is_empty() {
            return Err(CoreError::invalid("step", MISSING_CONTEXT));
        }
        let step = self
            .steps
            .get_mut(index)
            .ok_or_else(|| CoreError::invalid("step", MISSING_CONTEXT))?;

        step.is_loading_explanation = true;
        step.explanation = None;
        step.explanation_error = None;

        let request = ExplainRequest {
            problem: self.problem.clone(),
            solution: self.solution.clone(),
            step_number: index + 1,
        };
        Ok((step.id.clone(), request))
    }

    /// Record the outcome of an explanation fetch.
    ///
    /// Outcomes for steps that no longer exist are dropped.
    pub fn finish_explanation(
        &mut self,
        step_id: &str,
        outcome: std::result::Result<String, String>,
    ) -> bool {
        let Some(step) = self.steps.iter_mut().find(|s| s.id == step_id) else {
            debug!("[Solver] Dropping explanation for stale step {}", step_id);
            return false;
        };

        step.is_loading_explanation = false;
        match outcome {
            Ok(explanation) => {
                step.explanation = Some(explanation);
                step.explanation_error = None;
            }
            Err(message) => {
                warn!("[Solver] Explanation failed for {}: {}", step_id, message);
                step.explanation = None;
                step.explanation_error = Some(message);
            }
        }
        true
    }

    /// Fetch the explanation of step `index` (0-based) in one go.
    pub async fn explain_step(&mut self, tutor: &dyn MathTutor, index: usize) -> Result<()> {
        let (step_id, request) = self.begin_explanation(index)?;
        let outcome = tutor::explain_step(tutor, &request).await.into_result();
        self.finish_explanation(&step_id, outcome);
        Ok(())
    }
}
