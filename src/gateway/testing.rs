//! Scripted gateways for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::{Gateway, GatewayError, GatewayResult};

type Scripted<T> = Result<Vec<T>, String>;

/// Replays queued responses in order; errors once the queue runs dry
pub(crate) struct ScriptedGateway<T> {
    responses: Mutex<VecDeque<Scripted<T>>>,
    calls: AtomicUsize,
}

impl<T> ScriptedGateway<T> {
    pub(crate) fn new(responses: Vec<Scripted<T>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Gateway<T> for ScriptedGateway<T> {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self) -> GatewayResult<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(GatewayError::other(message)),
            None => Err(GatewayError::other("no scripted response")),
        }
    }
}

/// Each fetch waits until the test resolves it through the matching sender
pub(crate) struct GatedGateway<T> {
    pending: Mutex<VecDeque<oneshot::Receiver<Scripted<T>>>>,
    waiting: AtomicUsize,
}

impl<T> GatedGateway<T> {
    /// Gateway plus one sender per expected fetch, in call order
    pub(crate) fn new(calls: usize) -> (Self, Vec<oneshot::Sender<Scripted<T>>>) {
        let mut senders = Vec::with_capacity(calls);
        let mut receivers = VecDeque::with_capacity(calls);
        for _ in 0..calls {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        (
            Self {
                pending: Mutex::new(receivers),
                waiting: AtomicUsize::new(0),
            },
            senders,
        )
    }

    /// Number of fetches that have reached the gate so far
    pub(crate) fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Gateway<T> for GatedGateway<T> {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch(&self) -> GatewayResult<Vec<T>> {
        let rx = self.pending.lock().unwrap().pop_front();
        let rx = rx.ok_or_else(|| GatewayError::other("unexpected fetch"))?;
        self.waiting.fetch_add(1, Ordering::SeqCst);
        match rx.await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(message)) => Err(GatewayError::other(message)),
            Err(_) => Err(GatewayError::other("gate dropped")),
        }
    }
}
