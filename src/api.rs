//! HTTP API for the rephrase trainer

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::chat::ChatService;
use crate::runtime::SessionHandle;
use crate::settings::SettingsService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub settings: Arc<SettingsService>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(session: SessionHandle, settings: Arc<SettingsService>, chat: ChatService) -> Self {
        Self {
            session,
            settings,
            chat: Arc::new(chat),
        }
    }
}
