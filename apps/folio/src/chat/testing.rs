//! Scripted generation backend for chat tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::mpsc;

use crate::llm_client::{DeltaStream, GenerateRequest, GenerationBackend, TurnError};

pub(crate) enum Reply {
    /// Streams each delta, then ends normally.
    Deltas(Vec<&'static str>),
    /// Streams raw fragments; `None` carries no text.
    Fragments(Vec<Option<&'static str>>),
    /// Streams the deltas, then a mid-stream error.
    FailAfter(Vec<&'static str>),
    /// Fails before any stream is opened.
    Refuse,
    /// Streams whatever the test feeds in; ends when the sender drops.
    Live(mpsc::UnboundedReceiver<Option<String>>),
}

impl Reply {
    pub fn live() -> (mpsc::UnboundedSender<Option<String>>, Reply) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Reply::Live(rx))
    }
}

/// Replies are consumed in order; once exhausted every turn gets an empty
/// stream.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<DeltaStream, TurnError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Deltas(Vec::new()));

        let items: Vec<Result<Option<String>, TurnError>> = match reply {
            Reply::Deltas(deltas) => deltas.into_iter().map(|d| Ok(Some(d.to_string()))).collect(),
            Reply::Fragments(fragments) => fragments
                .into_iter()
                .map(|f| Ok(f.map(str::to_string)))
                .collect(),
            Reply::FailAfter(deltas) => deltas
                .into_iter()
                .map(|d| Ok(Some(d.to_string())))
                .chain(std::iter::once(Err(TurnError::Stream(
                    "connection reset".to_string(),
                ))))
                .collect(),
            Reply::Refuse => {
                return Err(TurnError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                })
            }
            Reply::Live(rx) => {
                return Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|fragment| (Ok::<_, TurnError>(fragment), rx))
                })))
            }
        };

        Ok(Box::pin(stream::iter(items)))
    }
}
