//! Runtime for the practice session
//!
//! One task owns the [`Session`] and applies every change through the pure
//! transition function. Learner intents arrive over a command channel;
//! evaluation outcomes arrive from the pipeline task over an internal one.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::llm::CompletionClient;
use crate::practice::Mode;
use crate::settings::SettingsService;
use crate::state_machine::{DisplayedError, Round, Session, TransitionError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// What the learner asked for
#[derive(Debug, Clone)]
pub enum Intent {
    NewTopic,
    EditAnswer(String),
    SelectMode(Mode),
    Submit,
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SessionEvent {
    State { session: Box<Session> },
    Round { round: Round },
    Error { error: DisplayedError },
}

/// Intent plus the channel the outcome is reported on
#[derive(Debug)]
pub struct Command {
    pub intent: Intent,
    pub reply: oneshot::Sender<Result<Session, TransitionError>>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session runtime has stopped")]
    Stopped,
}

/// Handle to interact with the running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Session>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Seed the first topic and start the runtime task
    pub fn spawn<C>(client: Arc<C>, settings: Arc<SettingsService>) -> Self
    where
        C: CompletionClient + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let runtime = SessionRuntime::new(client, settings, command_rx, broadcast_tx.clone());
        Self::start(runtime, command_tx, broadcast_tx)
    }

    /// Start the runtime from a known session
    #[cfg(test)]
    pub fn spawn_with_session<C>(
        client: Arc<C>,
        settings: Arc<SettingsService>,
        session: Session,
    ) -> Self
    where
        C: CompletionClient + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let runtime = SessionRuntime::with_session(
            session,
            client,
            settings,
            command_rx,
            broadcast_tx.clone(),
        );
        Self::start(runtime, command_tx, broadcast_tx)
    }

    fn start<C>(
        runtime: SessionRuntime<C>,
        command_tx: mpsc::Sender<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self
    where
        C: CompletionClient + 'static,
    {
        let snapshot_rx = runtime.subscribe_snapshots();

        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!("Session runtime finished");
        });

        Self {
            command_tx,
            snapshot_rx,
            broadcast_tx,
        }
    }

    /// Apply an intent and return the resulting session
    pub async fn dispatch(&self, intent: Intent) -> Result<Session, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(Command { intent, reply })
            .await
            .map_err(|_| DispatchError::Stopped)?;
        Ok(rx.await.map_err(|_| DispatchError::Stopped)??)
    }

    /// Latest published session
    pub fn snapshot(&self) -> Session {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait until the published session satisfies `predicate`
    #[cfg(test)]
    pub async fn wait_for<F>(&self, predicate: F) -> Result<Session, DispatchError>
    where
        F: FnMut(&Session) -> bool,
    {
        let mut rx = self.snapshot_rx.clone();
        let session = rx
            .wait_for(predicate)
            .await
            .map_err(|_| DispatchError::Stopped)?;
        Ok(session.clone())
    }

    /// Subscribe to session updates
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }
}
