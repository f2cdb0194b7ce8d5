use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::watch;
use url::Url;

use crate::client::SearchBackend;
use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::model::{BookSummary, FavoriteSet, FilterSet, Scope, SearchInput};
use crate::orchestrator::{SearchOrchestrator, SearchResult};
use crate::query;
use crate::view::{self, ViewState};

/// State of one interactive session: the input being edited, the debounced
/// query the pipeline runs on, favorites, and the book open in the detail view.
///
/// Query text goes through the debouncer. Scope, filter and page changes
/// re-run the pipeline immediately with the last settled query.
pub struct SearchSession {
    api_url: Url,
    input: SearchInput,
    settled_query: String,
    debouncer: Debouncer<String>,
    settled_rx: watch::Receiver<String>,
    orchestrator: SearchOrchestrator,
    favorites: FavoriteSet,
    selected: Option<BookSummary>,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &ClientConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce, String::new());
        let settled_rx = debouncer.subscribe();
        Self {
            api_url: config.api_url.clone(),
            input: SearchInput::default(),
            settled_query: String::new(),
            debouncer,
            settled_rx,
            orchestrator: SearchOrchestrator::new(backend),
            favorites: FavoriteSet::default(),
            selected: None,
        }
    }

    pub fn input(&self) -> &SearchInput {
        &self.input
    }

    pub fn settled_query(&self) -> &str {
        &self.settled_query
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResult> {
        self.orchestrator.subscribe()
    }

    pub fn result(&self) -> SearchResult {
        self.orchestrator.snapshot()
    }

    pub fn view(&self) -> ViewState {
        view::select(&self.result(), &self.input.query_text, self.input.page)
    }

    /// Records new query text. The pipeline runs once the text settles; see
    /// [`SearchSession::query_settled`].
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.input.query_text {
            return;
        }
        self.input.query_text = text.clone();
        self.debouncer.push(text);
        // A page reset re-runs right away with the last settled query.
        if self.input.page != 1 {
            self.input.page = 1;
            self.refresh();
        }
    }

    pub fn set_scope(&mut self, scope: Scope) {
        if scope == self.input.scope {
            return;
        }
        self.input.scope = scope;
        self.input.page = 1;
        self.refresh();
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        if filters == self.input.filters {
            return;
        }
        self.input.filters = filters;
        self.input.page = 1;
        self.refresh();
    }

    pub fn update_filters(&mut self, update: impl FnOnce(&mut FilterSet)) {
        let mut filters = self.input.filters.clone();
        update(&mut filters);
        self.set_filters(filters);
    }

    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page == self.input.page {
            return;
        }
        self.input.page = page;
        self.refresh();
    }

    pub fn next_page(&mut self) -> bool {
        let total_pages = view::total_pages(self.result().total_count);
        if self.input.page >= total_pages {
            return false;
        }
        self.set_page(self.input.page + 1);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.input.page <= 1 {
            return false;
        }
        self.set_page(self.input.page - 1);
        true
    }

    /// Re-runs the pipeline with the current input unchanged.
    pub fn retry(&mut self) {
        self.refresh();
    }

    /// Waits for the debouncer to settle a new query, then runs the pipeline.
    /// Cancel-safe.
    pub async fn query_settled(&mut self) -> anyhow::Result<()> {
        self.settled_rx
            .changed()
            .await
            .context("query debouncer closed")?;
        let query = self.settled_rx.borrow_and_update().clone();
        tracing::debug!(query = %query, "query settled");
        self.settled_query = query;
        self.refresh();
        Ok(())
    }

    /// Runs the pipeline with the current input, skipping the debounce.
    pub fn submit_now(&mut self) {
        self.debouncer.flush(self.input.query_text.clone());
        // Already handled here; `query_settled` must not run it again.
        self.settled_rx.borrow_and_update();
        self.settled_query = self.input.query_text.clone();
        self.refresh();
    }

    fn refresh(&mut self) {
        let request = query::build(
            &self.api_url,
            &self.settled_query,
            self.input.scope,
            &self.input.filters,
            self.input.page,
        );
        self.orchestrator.submit(request);
    }

    /// Book at `index` in the current result list.
    pub fn book(&self, index: usize) -> Option<BookSummary> {
        self.result().items.get(index).cloned()
    }

    pub fn show_details(&mut self, index: usize) -> Option<&BookSummary> {
        self.selected = self.book(index);
        self.selected.as_ref()
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&BookSummary> {
        self.selected.as_ref()
    }

    pub fn toggle_favorite(&mut self, key: &str) -> bool {
        self.favorites.toggle(key)
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.favorites.contains(key)
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }
}
