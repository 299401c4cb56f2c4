//! genai-backed math tutor.

use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatRequest};
use genai::Client as GenAIClient;
use mathfluent_core::solution::prompts::{
    explain_prompt, solve_prompt, EXPLAIN_SYSTEM_PROMPT, SOLVE_SYSTEM_PROMPT,
};
use mathfluent_core::{CoreError, ExplainRequest, MathTutor, Result, SolveRequest};
use tracing::{debug, info};

use crate::config::ServerConfig;

pub struct GenAiTutor {
    client: GenAIClient,
    model: String,
    enabled: bool,
}

impl GenAiTutor {
    pub fn new(config: &ServerConfig) -> Self {
        if config.enable_ai {
            info!("[Tutor] Using model: {}", config.model);
        } else {
            info!("[Tutor] AI disabled, every request will fail");
        }
        Self {
            client: GenAIClient::default(),
            model: config.model.clone(),
            enabled: config.enable_ai,
        }
    }

    async fn ask(&self, system: &str, prompt: String) -> Result<String> {
        if !self.enabled {
            return Err(CoreError::Tutor("AI is disabled".to_string()));
        }

        let chat_req = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(prompt)]);

        debug!("[Tutor] Calling {}", self.model);
        let response = self
            .client
            .exec_chat(&self.model, chat_req, None)
            .await
            .map_err(|e| CoreError::Tutor(format!("GenAI error: {}", e)))?;

        Ok(response.first_text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl MathTutor for GenAiTutor {
    async fn solve(&self, request: &SolveRequest) -> Result<String> {
        self.ask(SOLVE_SYSTEM_PROMPT, solve_prompt(request)).await
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<String> {
        self.ask(EXPLAIN_SYSTEM_PROMPT, explain_prompt(request)).await
    }
}
