//! API request and response types

use crate::practice::Mode;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// Request to replace the answer draft
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

/// Request to switch rephrasing mode
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: Mode,
}

/// Request to save settings
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub api_key: String,
    pub model: String,
    pub has_api_key: bool,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            has_api_key: settings.has_api_key(),
            api_key: settings.api_key,
            model: settings.model,
        }
    }
}

/// Request to send a free chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ModeInfo {
    pub mode: Mode,
    pub label: &'static str,
    pub hint: &'static str,
}

impl From<Mode> for ModeInfo {
    fn from(mode: Mode) -> Self {
        Self {
            mode,
            label: mode.label(),
            hint: mode.hint(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeInfo>,
    pub default: Mode,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
