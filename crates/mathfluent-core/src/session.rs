//! Signed-in user state, persisted to a small JSON file.
//!
//! Login and signup are mocked: any credentials succeed after a short delay.

use crate::error::{CoreError, Result};
use crate::models::{Sender, User, UserRole};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Default location of the session file.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mathfluent").join("session.json"))
}

#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    user: Option<User>,
    delay: Duration,
}

/// Profile fields a signed-in user may change.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

impl SessionContext {
    /// Load the session stored at `path`.
    ///
    /// A missing or unreadable file yields a signed-out session.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let user = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<User>(&content) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("[Session] Failed to parse {:?}: {}", path, e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("[Session] Failed to read {:?}: {}", path, e);
                None
            }
        };

        Self {
            path,
            user,
            delay: DEFAULT_DELAY,
        }
    }

    /// Simulated latency of login and signup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Sender identity of the signed-in user.
    pub fn sender(&self) -> Result<Sender> {
        self.user
            .as_ref()
            .map(User::as_sender)
            .ok_or(CoreError::NotSignedIn)
    }

    /// Sign in as `email`. The password is not checked.
    pub async fn login(&mut self, email: &str, _password: &str) -> Result<&User> {
        let email = require_email(email)?;
        tokio::time::sleep(self.delay).await;

        let name = email.split('@').next().map(str::to_string);
        self.set_user(User {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            role: None,
        })
        .await
    }

    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        _password: &str,
        role: Option<UserRole>,
    ) -> Result<&User> {
        let email = require_email(email)?;
        if name.trim().is_empty() {
            return Err(CoreError::invalid("name", "Name is required."));
        }
        tokio::time::sleep(self.delay).await;

        self.set_user(User {
            id: Uuid::new_v4().to_string(),
            email,
            name: Some(name.trim().to_string()),
            role,
        })
        .await
    }

    pub async fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("[Session] {} signed out", user.email);
        }
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("[Session] Failed to remove {:?}: {}", self.path, e),
        }
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<&User> {
        let mut user = self.user.clone().ok_or(CoreError::NotSignedIn)?;
        if let Some(name) = update.name {
            let name = name.trim();
            user.name = (!name.is_empty()).then(|| name.to_string());
        }
        if update.role.is_some() {
            user.role = update.role;
        }
        self.set_user(user).await
    }

    async fn set_user(&mut self, user: User) -> Result<&User> {
        info!("[Session] Signed in as {}", user.email);
        if let Err(e) = self.persist(&user).await {
            warn!("[Session] Failed to save {:?}: {}", self.path, e);
        }
        Ok(self.user.insert(user))
    }

    async fn persist(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(user)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

fn require_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::invalid("email", "Invalid email address."));
    }
    Ok(email.to_string())
}
