use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::model::SearchResponse;
use crate::query::RequestDescriptor;

/// The one external effect of the search pipeline.
///
/// Implementations must stop work once `cancel` fires and return
/// [`SearchError::Canceled`].
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchError>;
}

#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: reqwest::Client,
    user_agent: String,
}

impl OpenLibraryClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }

    async fn fetch(&self, request: &RequestDescriptor) -> Result<SearchResponse, SearchError> {
        let url = request.url();
        tracing::debug!(%url, "GET search");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| SearchError::Transport(transport_message(&err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_owned(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SearchError::Transport(transport_message(&err)))?;
        serde_json::from_slice(&body).map_err(|err| SearchError::Parse(err.to_string()))
    }
}

#[async_trait]
impl SearchBackend for OpenLibraryClient {
    async fn search(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        // Dropping the in-flight future aborts the underlying connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Canceled),
            result = self.fetch(request) => result,
        }
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
