use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::client::SearchBackend;
use crate::error::SearchError;
use crate::model::{BookSummary, SearchResponse};
use crate::query::RequestDescriptor;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Outcome of the latest request. Replaced wholesale, never merged.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub status: SearchStatus,
    pub items: Vec<BookSummary>,
    pub total_count: u64,
    pub error_message: Option<String>,
}

impl SearchResult {
    pub fn idle() -> Self {
        Self {
            status: SearchStatus::Idle,
            items: Vec::new(),
            total_count: 0,
            error_message: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            status: SearchStatus::Loading,
            ..Self::idle()
        }
    }

    pub fn success(response: SearchResponse) -> Self {
        Self {
            status: SearchStatus::Success,
            items: response.docs,
            total_count: response.num_found,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SearchStatus::Error,
            error_message: Some(message.into()),
            ..Self::idle()
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status != SearchStatus::Loading
    }
}

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

/// Owns the request lifecycle: at most one request is live at a time, and
/// only the latest one may write the shared [`SearchResult`].
pub struct SearchOrchestrator {
    backend: Arc<dyn SearchBackend>,
    state: Arc<watch::Sender<SearchResult>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<InFlight>,
    last_request: Option<RequestDescriptor>,
}

impl SearchOrchestrator {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        let (state, _rx) = watch::channel(SearchResult::idle());
        Self {
            backend,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            last_request: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResult> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchResult {
        self.state.borrow().clone()
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| !in_flight.cancel.is_cancelled())
    }

    /// Moves to Loading for `request`, or to Idle when there is nothing to
    /// request. Any predecessor is canceled first.
    pub fn submit(&mut self, request: Option<RequestDescriptor>) {
        self.cancel_in_flight();

        let Some(request) = request else {
            self.last_request = None;
            let generation = self.generation.clone();
            self.state.send_modify(|state| {
                generation.fetch_add(1, Ordering::SeqCst);
                *state = SearchResult::idle();
            });
            tracing::debug!("blank query; search idle");
            return;
        };

        // Bumping the generation and publishing Loading happen under the
        // channel lock, so a settling predecessor observes one or the other.
        let mut generation = 0;
        let counter = self.generation.clone();
        self.state.send_modify(|state| {
            generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SearchResult::loading();
        });

        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            generation,
            cancel: cancel.clone(),
        });
        self.last_request = Some(request.clone());

        tracing::debug!(generation, url = %request.url(), "dispatch search");

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let counter = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let outcome = backend.search(&request, &cancel).await;
            settle(&state, &counter, generation, &cancel, outcome);
        });
    }

    /// Re-issues the last request unchanged. Returns `false` when there is none.
    pub fn retry(&mut self) -> bool {
        let Some(request) = self.last_request.clone() else {
            return false;
        };
        tracing::debug!("retry search");
        self.submit(Some(request));
        true
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            if !in_flight.cancel.is_cancelled() {
                tracing::debug!(generation = in_flight.generation, "cancel superseded search");
            }
            in_flight.cancel.cancel();
        }
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

fn settle(
    state: &watch::Sender<SearchResult>,
    counter: &AtomicU64,
    generation: u64,
    cancel: &CancellationToken,
    outcome: Result<SearchResponse, SearchError>,
) {
    let outcome = match outcome {
        Err(err) if err.is_canceled() => {
            tracing::debug!(generation, "search canceled");
            return;
        }
        other => other,
    };

    let applied = state.send_if_modified(|current| {
        if cancel.is_cancelled() || counter.load(Ordering::SeqCst) != generation {
            return false;
        }
        *current = match &outcome {
            Ok(response) => SearchResult::success(response.clone()),
            Err(err) => SearchResult::error(err.to_string()),
        };
        true
    });

    if !applied {
        tracing::debug!(generation, "discard stale search result");
        return;
    }
    match outcome {
        Ok(response) => {
            tracing::info!(
                generation,
                items = response.docs.len(),
                total = response.num_found,
                "search settled"
            );
        }
        Err(err) => {
            tracing::warn!(generation, error = %err, "search failed");
        }
    }
}
