use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{DestroyOutcome, MediaError, MediaHost};

type Scripted = Result<DestroyOutcome, MediaError>;

/// In-memory media host for dev/tests.
///
/// Records every destroy call. Responses can be scripted per public id and are
/// consumed in order; unscripted calls answer `Deleted`.
#[derive(Clone, Default)]
pub struct InMemoryMediaHost {
    calls: Arc<Mutex<Vec<String>>>,
    scripted: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    delay: Option<Duration>,
}

impl InMemoryMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response for `public_id`.
    pub fn respond(self, public_id: &str, response: Scripted) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted
                .entry(public_id.to_string())
                .or_default()
                .push_back(response);
        }
        self
    }

    /// Sleep this long before answering (timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Public ids passed to `destroy`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaHost for InMemoryMediaHost {
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, MediaError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(public_id.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut s| s.get_mut(public_id).and_then(VecDeque::pop_front));
        next.unwrap_or(Ok(DestroyOutcome::Deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_are_consumed_in_order() {
        let host = InMemoryMediaHost::new()
            .respond("a/b", Err(MediaError::Transport("reset".to_string())))
            .respond("a/b", Ok(DestroyOutcome::NotFound));

        assert!(host.destroy("a/b").await.is_err());
        assert_eq!(host.destroy("a/b").await.unwrap(), DestroyOutcome::NotFound);
        assert_eq!(host.destroy("a/b").await.unwrap(), DestroyOutcome::Deleted);
        assert_eq!(host.calls(), vec!["a/b", "a/b", "a/b"]);
    }
}
