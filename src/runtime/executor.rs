//! Session runtime executor

use super::{Command, Intent, SessionEvent};
use crate::evaluation::{evaluate, EvaluationRequest};
use crate::llm::CompletionClient;
use crate::practice::Topic;
use crate::settings::SettingsService;
use crate::state_machine::{transition, Effect, Event, Session, TransitionError};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Owns the session and executes the effects of each transition
pub struct SessionRuntime<C>
where
    C: CompletionClient + 'static,
{
    session: Session,
    client: Arc<C>,
    settings: Arc<SettingsService>,
    rng: StdRng,
    command_rx: mpsc::Receiver<Command>,
    /// Pipeline tasks report back through this pair
    outcome_tx: mpsc::Sender<Event>,
    outcome_rx: mpsc::Receiver<Event>,
    snapshot_tx: watch::Sender<Session>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    /// Ticket and cancel token of the running evaluation
    evaluation: Option<(u64, CancellationToken)>,
}

impl<C> SessionRuntime<C>
where
    C: CompletionClient + 'static,
{
    pub fn new(
        client: Arc<C>,
        settings: Arc<SettingsService>,
        command_rx: mpsc::Receiver<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        let session = Session::new(Topic::random(&mut rng));
        tracing::info!(topic = %session.topic, "Seeded first topic");
        let mut runtime = Self::with_session(session, client, settings, command_rx, broadcast_tx);
        runtime.rng = rng;
        runtime
    }

    /// Start from an explicit session instead of a random topic
    pub fn with_session(
        session: Session,
        client: Arc<C>,
        settings: Arc<SettingsService>,
        command_rx: mpsc::Receiver<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(8);
        let (snapshot_tx, _) = watch::channel(session.clone());
        Self {
            session,
            client,
            settings,
            rng: StdRng::from_entropy(),
            command_rx,
            outcome_tx,
            outcome_rx,
            snapshot_tx,
            broadcast_tx,
            evaluation: None,
        }
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Session> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!("Starting session runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { intent, reply }) = command else {
                        break;
                    };
                    let event = self.event_for(intent);
                    let result = self.process_event(event);
                    if let Err(e) = &result {
                        tracing::debug!(error = %e, "Intent rejected");
                    }
                    let _ = reply.send(result);
                }
                Some(event) = self.outcome_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::error!(error = %e, "Error handling evaluation outcome");
                    }
                }
            }
        }

        if let Some((ticket, token)) = self.evaluation.take() {
            tracing::info!(ticket, "Aborting evaluation on shutdown");
            token.cancel();
        }
        tracing::info!("Session runtime stopped");
    }

    fn event_for(&mut self, intent: Intent) -> Event {
        match intent {
            Intent::NewTopic => Event::NewTopic {
                topic: Topic::random(&mut self.rng),
            },
            Intent::EditAnswer(text) => Event::EditAnswer { text },
            Intent::SelectMode(mode) => Event::SelectMode { mode },
            // Settings are read once here; later saves don't reach this submission
            Intent::Submit => Event::Submit {
                settings: self.settings.get(),
            },
        }
    }

    fn process_event(&mut self, event: Event) -> Result<Session, TransitionError> {
        if let Event::EvaluationComplete { ticket, .. } | Event::EvaluationFailed { ticket, .. } =
            &event
        {
            if self.session.in_flight_ticket() != Some(*ticket) {
                tracing::info!(ticket, "Discarding stale evaluation outcome");
            }
        }

        let result = transition(&self.session, event)?;
        if result.new_state.phase != self.session.phase {
            tracing::info!(
                from = self.session.phase.name(),
                to = result.new_state.phase.name(),
                "Session phase changed"
            );
        }
        self.session = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        // A finished or superseded pipeline no longer needs its token
        if let Some((ticket, _)) = &self.evaluation {
            if self.session.in_flight_ticket() != Some(*ticket) {
                self.evaluation = None;
            }
        }

        self.publish();
        Ok(self.session.clone())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestEvaluation { ticket, request } => {
                self.start_evaluation(ticket, request);
            }
            Effect::AbortEvaluation { ticket } => match self.evaluation.take() {
                Some((running, token)) if running == ticket => {
                    tracing::info!(ticket, "Aborting in-flight evaluation");
                    token.cancel();
                }
                other => self.evaluation = other,
            },
            Effect::NotifyRound { round } => {
                tracing::info!(
                    round_id = %round.id,
                    topic = %round.topic,
                    mode = %round.mode,
                    history_len = self.session.history.len(),
                    "Round recorded"
                );
                let _ = self.broadcast_tx.send(SessionEvent::Round { round });
            }
            Effect::NotifyError { error } => {
                tracing::warn!(kind = ?error.kind, message = %error.message, "Evaluation error");
                let _ = self.broadcast_tx.send(SessionEvent::Error { error });
            }
        }
    }

    fn start_evaluation(&mut self, ticket: u64, request: EvaluationRequest) {
        let token = CancellationToken::new();
        if let Some((previous, stale)) = self.evaluation.replace((ticket, token.clone())) {
            tracing::warn!(previous, ticket, "Replacing unfinished evaluation");
            stale.cancel();
        }

        tracing::info!(
            ticket,
            topic = %request.topic,
            mode = %request.mode,
            model = %request.model,
            "Starting evaluation"
        );

        let client = Arc::clone(&self.client);
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!(ticket, "Evaluation pipeline cancelled");
                    return;
                }
                outcome = evaluate(client.as_ref(), &request) => outcome,
            };

            let event = match outcome {
                Ok(evaluation) => Event::EvaluationComplete {
                    ticket,
                    evaluation,
                    completed_at: Utc::now(),
                },
                Err(error) => Event::EvaluationFailed { ticket, error },
            };

            if outcome_tx.send(event).await.is_err() {
                tracing::debug!(ticket, "Runtime gone before evaluation finished");
            }
        });
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.clone());
        let _ = self.broadcast_tx.send(SessionEvent::State {
            session: Box::new(self.session.clone()),
        });
    }
}
