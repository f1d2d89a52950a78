//! In-memory [`GenerationBackend`] for tests in this and dependent crates.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Notify;

use crate::backend::{BackendError, BackendResult, GenerationBackend, GenerationRequest};

pub const SCRIPTED_BACKEND_ID: &str = "scripted";
pub const SCRIPTED_MODEL_ID: &str = "scripted-model";

/// Replays queued replies in order and records every request it receives.
///
/// Once the queue is empty every call fails with a transport error. A gated
/// backend holds each reply until [`ScriptedBackend::release`] is called.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<BackendResult<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Gate>,
}

struct Gate {
    entered: Notify,
    release: Notify,
}

impl ScriptedBackend {
    pub fn replying(replies: Vec<BackendResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn gated(replies: Vec<BackendResult<String>>) -> Self {
        Self {
            gate: Some(Gate {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::replying(replies)
        }
    }

    pub fn network_failure(message: &str) -> BackendResult<String> {
        Err(BackendError::Transport {
            stage: "scripted-reply",
            message: message.to_string(),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Resolves once a gated call is parked waiting for release.
    pub async fn wait_until_called(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.release.notify_one();
        }
    }
}

impl GenerationBackend for ScriptedBackend {
    fn id(&self) -> &str {
        SCRIPTED_BACKEND_ID
    }

    fn default_model(&self) -> &str {
        SCRIPTED_MODEL_ID
    }

    fn generate<'a>(&'a self, request: GenerationRequest) -> BoxFuture<'a, BackendResult<String>> {
        lock(&self.requests).push(request);
        let reply = lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Self::network_failure("no scripted reply left"));

        async move {
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            reply
        }
        .boxed()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
