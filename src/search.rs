use std::sync::Arc;

use anyhow::Context as _;
use url::Url;

use crate::cli::{FilterArgs, SearchArgs};
use crate::client::{OpenLibraryClient, SearchBackend};
use crate::config::ClientConfig;
use crate::model::{FavoriteSet, FilterSet, LanguageFilter, Scope, SearchInput};
use crate::orchestrator::{SearchOrchestrator, SearchResult, SearchStatus};
use crate::query;
use crate::render::Renderer;
use crate::view;

impl FilterArgs {
    pub fn resolve(&self) -> anyhow::Result<(Scope, FilterSet)> {
        let scope = Scope::parse(&self.scope);
        let language = LanguageFilter::parse(&self.language).context("parse --language")?;
        let filters = FilterSet {
            language,
            year_from: self.year_from,
            year_to: self.year_to,
            free_to_read: self.free_to_read,
        };
        Ok((scope, filters))
    }
}

pub async fn run(args: SearchArgs, config: ClientConfig) -> anyhow::Result<()> {
    let (scope, filters) = args.filters.resolve()?;
    let input = SearchInput {
        query_text: args.query,
        scope,
        filters,
        page: args.page.max(1),
    };

    let backend: Arc<dyn SearchBackend> = Arc::new(OpenLibraryClient::new(&config.user_agent));
    let result = search_once(backend, &config.api_url, &input).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("serialize result")?;
        println!("{json}");
    } else {
        let favorites = FavoriteSet::default();
        let renderer = Renderer {
            covers_url: &config.covers_url,
            site_url: &config.site_url,
            favorites: &favorites,
        };
        let view = view::select(&result, &input.query_text, input.page);
        print!("{}", renderer.view(&view).context("render results")?);
    }

    if result.status == SearchStatus::Error {
        let message = result.error_message.unwrap_or_default();
        anyhow::bail!("search failed: {message}");
    }
    Ok(())
}

/// Runs one pipeline pass for `input`, without debounce, and waits for it to settle.
pub async fn search_once(
    backend: Arc<dyn SearchBackend>,
    api_url: &Url,
    input: &SearchInput,
) -> anyhow::Result<SearchResult> {
    let mut orchestrator = SearchOrchestrator::new(backend);
    let mut rx = orchestrator.subscribe();
    orchestrator.submit(query::build_for(api_url, input));

    let result = rx
        .wait_for(SearchResult::is_settled)
        .await
        .context("search state closed")?
        .clone();
    Ok(result)
}
