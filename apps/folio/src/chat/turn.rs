//! Drives one accepted turn: opens the provider stream, folds deltas into the
//! widget transcript, and settles the turn.
//!
//! The turn runs as its own task so it always settles, even if the HTTP
//! client listening for events goes away. Events are forwarded best-effort.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::chat::widget::{ChatWidget, PendingTurn, TurnId};
use crate::llm_client::{GenerateRequest, GenerationBackend, TurnError};
use crate::models::chat::ChatMessage;

pub type SharedWidget = Arc<Mutex<ChatWidget>>;

/// Observable progress of a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    Delta { text: String },
    Done { message: ChatMessage },
    Failed { message: ChatMessage },
}

enum StreamOutcome {
    Completed,
    Abandoned,
}

/// Widget locks are only held for synchronous transitions, so a poisoned
/// lock still holds a consistent transcript.
pub fn lock(widget: &Mutex<ChatWidget>) -> MutexGuard<'_, ChatWidget> {
    widget.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn spawn_turn(widget: SharedWidget, pending: PendingTurn) -> mpsc::UnboundedReceiver<TurnEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_turn(widget, pending, tx));
    rx
}

pub async fn run_turn(widget: SharedWidget, pending: PendingTurn, tx: mpsc::UnboundedSender<TurnEvent>) {
    let PendingTurn {
        id,
        request,
        backend,
    } = pending;

    let outcome = stream_into(&widget, id, request, backend.as_ref(), &tx).await;

    let event = match outcome {
        Ok(StreamOutcome::Completed) => {
            let mut guard = lock(&widget);
            if guard.complete_turn(id) {
                guard.last_message().cloned().map(|message| {
                    info!("Chat turn settled ({} chars)", message.text.len());
                    TurnEvent::Done { message }
                })
            } else {
                None
            }
        }
        Ok(StreamOutcome::Abandoned) => {
            debug!("Chat turn abandoned: widget torn down");
            None
        }
        Err(e) => {
            let mut guard = lock(&widget);
            if guard.fail_turn(id, &e) {
                guard
                    .last_message()
                    .cloned()
                    .map(|message| TurnEvent::Failed { message })
            } else {
                None
            }
        }
    };

    if let Some(event) = event {
        let _ = tx.send(event);
    }
}

async fn stream_into(
    widget: &Mutex<ChatWidget>,
    id: TurnId,
    request: GenerateRequest,
    backend: &dyn GenerationBackend,
    tx: &mpsc::UnboundedSender<TurnEvent>,
) -> Result<StreamOutcome, TurnError> {
    let mut deltas = backend.stream_generate(request).await?;

    while let Some(delta) = deltas.next().await {
        let Some(text) = delta? else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let applied = lock(widget).apply_delta(id, &text);
        if !applied {
            return Ok(StreamOutcome::Abandoned);
        }
        let _ = tx.send(TurnEvent::Delta { text });
    }

    Ok(StreamOutcome::Completed)
}
