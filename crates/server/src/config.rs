//! Server configuration

use std::path::PathBuf;
use std::sync::Arc;

use mathfluent_core::{ChatStore, MathTutor};

/// Configuration for the MathFluent server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Root data directory
    pub data_dir: PathBuf,
    /// One JSON document per chat room
    pub rooms_dir: PathBuf,
    /// One JSON document per direct thread
    pub threads_dir: PathBuf,
    pub port: u16,
    /// genai model name used by the tutor
    pub model: String,
    /// When false the tutor reports every request as failed
    pub enable_ai: bool,
    /// Seconds between keep-alive lines on subscription streams
    pub heartbeat_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let root = std::env::var("MATHFLUENT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("mathfluent_data"));
        let mut config = Self::with_base_dir(root);

        if let Some(port) = std::env::var("MATHFLUENT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            config.port = port;
        }
        if let Ok(model) = std::env::var("MATHFLUENT_MODEL") {
            config.model = model;
        }
        config.enable_ai = std::env::var("DISABLE_AI").is_err();
        config
    }
}

impl ServerConfig {
    /// Create config rooted at `base_dir`, ignoring the environment
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let data_dir = base_dir.into();
        Self {
            rooms_dir: data_dir.join("rooms"),
            threads_dir: data_dir.join("threads"),
            data_dir,
            port: 3001,
            model: "gemini-2.0-flash".to_string(),
            enable_ai: true,
            heartbeat_secs: 30,
        }
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.rooms_dir).await?;
        tokio::fs::create_dir_all(&self.threads_dir).await?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub tutor: Arc<dyn MathTutor>,
    pub heartbeat_secs: u64,
}
