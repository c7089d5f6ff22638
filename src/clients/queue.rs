//! Rate-limited FIFO request queue, one instance per upstream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::transport::{ApiRequest, RawResponse, Transport};
use crate::error::ClientError;

/// Serializes outbound calls to a single upstream.
///
/// Requests complete strictly in submission order. A single worker task
/// drains the queue; enqueueing while it runs only appends. After every
/// completed request the worker waits `60s / rate_per_minute` before taking
/// the next one. A 429 puts the request back at the *front* of the queue and
/// pauses the worker for the source's cooldown, so the stalled request keeps
/// its position and earlier callers are never starved by later ones.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    interval: Duration,
    cooldown: Duration,
    state: Mutex<QueueState>,
}

struct QueueState {
    queue: VecDeque<Pending>,
    processing: bool,
}

struct Pending {
    request: ApiRequest,
    tx: oneshot::Sender<Result<RawResponse, ClientError>>,
}

impl RequestQueue {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, rate_per_minute: u32, cooldown: Duration) -> Self {
        let interval = Duration::from_secs_f64(60.0 / f64::from(rate_per_minute.max(1)));
        Self {
            inner: Arc::new(Inner {
                transport,
                interval,
                cooldown,
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    processing: false,
                }),
            }),
        }
    }

    /// Submits a request and waits for its response.
    ///
    /// Resolves with the upstream body on success, `ClientError::Status` for
    /// non-OK non-429 responses, or the transport error. Never resolves with
    /// a 429: those are retried in place until the upstream yields.
    pub async fn enqueue(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        let (tx, rx) = oneshot::channel();

        let spawn_worker = {
            let mut state = self.inner.state.lock().expect("queue lock poisoned");
            state.queue.push_back(Pending { request, tx });
            if state.processing {
                false
            } else {
                state.processing = true;
                true
            }
        };

        if spawn_worker {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(drain(inner));
        }

        rx.await
            .unwrap_or_else(|_| Err(ClientError::Transport("request queue dropped".to_string())))
    }

    /// Number of requests currently waiting (excluding the in-flight one).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.state.lock().expect("queue lock poisoned").queue.len()
    }
}

async fn drain(inner: Arc<Inner>) {
    loop {
        let pending = {
            let mut state = inner.state.lock().expect("queue lock poisoned");
            match state.queue.pop_front() {
                Some(p) => p,
                None => {
                    state.processing = false;
                    return;
                }
            }
        };

        match inner.transport.execute(&pending.request).await {
            Ok(response) if response.is_rate_limited() => {
                warn!(
                    url = pending.request.url(),
                    cooldown_ms = inner.cooldown.as_millis(),
                    "upstream rate limit hit, requeueing at front"
                );
                inner
                    .state
                    .lock()
                    .expect("queue lock poisoned")
                    .queue
                    .push_front(pending);
                tokio::time::sleep(inner.cooldown).await;
                continue;
            }
            Ok(response) if !response.is_success() => {
                debug!(url = pending.request.url(), status = response.status, "upstream error status");
                let _ = pending.tx.send(Err(ClientError::Status {
                    status: response.status,
                }));
            }
            Ok(response) => {
                let _ = pending.tx.send(Ok(response));
            }
            Err(err) => {
                warn!(url = pending.request.url(), error = %err, "transport failure");
                let _ = pending.tx.send(Err(err));
            }
        }

        tokio::time::sleep(inner.interval).await;
    }
}
