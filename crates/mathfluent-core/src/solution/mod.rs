//! Step-by-step solutions: parsing tutor output and explaining single steps.

pub mod parser;
pub mod prompts;
pub mod session;

pub use parser::parse_steps;
pub use session::SolutionSession;

use serde::{Deserialize, Serialize};

/// One step of a parsed solution, with its on-demand explanation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub id: String,
    /// Step text; may embed LaTeX.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub is_loading_explanation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_error: Option<String>,
}

impl SolutionStep {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            explanation: None,
            is_loading_explanation: false,
            explanation_error: None,
        }
    }

    /// Whether the "explain" action should be offered for this step.
    pub fn can_request_explanation(&self) -> bool {
        self.explanation.is_none() && !self.is_loading_explanation && self.explanation_error.is_none()
    }
}
