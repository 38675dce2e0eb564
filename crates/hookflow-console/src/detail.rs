//! One-shot detail loads where the newest request wins.
//!
//! Opening a detail view for record A and then B can leave A's response
//! arriving last. Each load takes a generation number and a response is only
//! applied if no newer load (or clear) has started since.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use hookflow_client::{RecordId, Result as ClientResult};

/// State of a detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState<T> {
    Idle,
    Loading { id: RecordId },
    Loaded { id: RecordId, value: T },
    Failed { id: RecordId, message: String },
}

impl<T> DetailState<T> {
    /// The loaded value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            DetailState::Loaded { value, .. } => Some(value),
            _ => None,
        }
    }
}

struct Inner<T> {
    generation: u64,
    state: DetailState<T>,
}

/// Loads detail records, discarding superseded responses.
pub struct DetailFetcher<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for DetailFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for DetailFetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DetailFetcher<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                state: DetailState::Idle,
            })),
        }
    }

    /// Current state.
    pub fn state(&self) -> DetailState<T> {
        self.inner.lock().state.clone()
    }

    /// Close the view. Responses still in flight are dropped.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = DetailState::Idle;
    }

    /// Load record `id` with `fetch`.
    ///
    /// Returns `true` if the response was applied, `false` if a newer load
    /// or a clear superseded it.
    pub async fn load<F, Fut>(&self, id: RecordId, fetch: F, failure_message: &str) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = DetailState::Loading { id };
            inner.generation
        };

        let result = fetch().await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(id, generation, "detail response superseded; discarding");
            return false;
        }
        inner.state = match result {
            Ok(value) => DetailState::Loaded { id, value },
            Err(e) => {
                warn!(id, error = %e, "detail load failed");
                DetailState::Failed {
                    id,
                    message: failure_message.to_string(),
                }
            }
        };
        true
    }
}
