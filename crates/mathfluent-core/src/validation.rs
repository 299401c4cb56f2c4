//! Form validation run before anything is submitted.

use crate::error::{CoreError, FieldError, Result};
use crate::models::RoomVisibility;
use serde::{Deserialize, Serialize};

pub const ROOM_NAME_MIN: usize = 3;
pub const ROOM_NAME_MAX: usize = 50;
pub const ROOM_DESCRIPTION_MAX: usize = 200;

/// Input of the room creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoomForm {
    pub room_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub room_type: RoomVisibility,
    #[serde(default)]
    pub enable_ai_assistant: bool,
}

impl ChatRoomForm {
    /// Check every field and report all violations at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let name_len = self.room_name.trim().chars().count();
        if name_len < ROOM_NAME_MIN {
            errors.push(FieldError::new(
                "room_name",
                "Room name must be at least 3 characters.",
            ));
        } else if name_len > ROOM_NAME_MAX {
            errors.push(FieldError::new(
                "room_name",
                "Room name must be 50 characters or less.",
            ));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > ROOM_DESCRIPTION_MAX {
                errors.push(FieldError::new(
                    "description",
                    "Description must be 200 characters or less.",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(errors))
        }
    }

    /// Description with surrounding whitespace removed, `None` when blank.
    pub fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

/// A problem must have some non-whitespace text before it is sent to the tutor.
pub fn validate_problem(problem: &str) -> Result<()> {
    if problem.trim().is_empty() {
        return Err(CoreError::invalid(
            "problem",
            "Problem description cannot be empty.",
        ));
    }
    Ok(())
}
