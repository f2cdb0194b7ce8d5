mod openlibrary_stub;

use std::time::Duration;

use booksearch::client::{OpenLibraryClient, SearchBackend};
use booksearch::error::SearchError;
use booksearch::model::{FilterSet, LanguageFilter, Scope};
use booksearch::query;
use openlibrary_stub::{OpenLibraryStub, StubResponse, one_book_response};
use tokio_util::sync::CancellationToken;
use url::Url;

fn client() -> OpenLibraryClient {
    OpenLibraryClient::new("booksearch-test")
}

#[tokio::test]
async fn success_parses_docs_and_count() -> anyhow::Result<()> {
    let stub = OpenLibraryStub::spawn(|_| StubResponse::json(one_book_response()));
    let endpoint = Url::parse(&stub.search_url())?;
    let filters = FilterSet {
        language: LanguageFilter::Code("eng".to_owned()),
        free_to_read: true,
        ..FilterSet::default()
    };
    let request = query::build(&endpoint, "test book", Scope::All, &filters, 1).unwrap();

    let response = client()
        .search(&request, &CancellationToken::new())
        .await?;
    assert_eq!(response.num_found, 1);
    assert_eq!(response.docs[0].title.as_deref(), Some("Test Book"));
    assert_eq!(response.docs[0].cover_i, Some(1234));

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/search.json?q=test+book&language=eng&has_fulltext=true&page=1&limit=20&fields="));
    Ok(())
}

#[tokio::test]
async fn missing_docs_and_count_default_to_empty() -> anyhow::Result<()> {
    let stub = OpenLibraryStub::spawn(|_| StubResponse::json(serde_json::json!({})));
    let endpoint = Url::parse(&stub.search_url())?;
    let request = query::build(&endpoint, "zzzznomatch", Scope::All, &FilterSet::default(), 1).unwrap();

    let response = client()
        .search(&request, &CancellationToken::new())
        .await?;
    assert!(response.docs.is_empty());
    assert_eq!(response.num_found, 0);
    Ok(())
}

#[tokio::test]
async fn http_status_failure_reports_code_and_reason() -> anyhow::Result<()> {
    let stub = OpenLibraryStub::spawn(|_| StubResponse::raw(503, "{}"));
    let endpoint = Url::parse(&stub.search_url())?;
    let request = query::build(&endpoint, "x", Scope::Title, &FilterSet::default(), 1).unwrap();

    let err = client()
        .search(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SearchError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".to_owned()
        }
    );
    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    Ok(())
}

#[tokio::test]
async fn invalid_json_is_a_parse_failure() -> anyhow::Result<()> {
    let stub = OpenLibraryStub::spawn(|_| StubResponse::raw(200, "<html>oops</html>"));
    let endpoint = Url::parse(&stub.search_url())?;
    let request = query::build(&endpoint, "x", Scope::All, &FilterSet::default(), 1).unwrap();

    let err = client()
        .search(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() -> anyhow::Result<()> {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let endpoint = Url::parse(&format!("http://127.0.0.1:{port}/search.json"))?;
    let request = query::build(&endpoint, "x", Scope::All, &FilterSet::default(), 1).unwrap();

    let err = client()
        .search(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
    assert!(!err.to_string().is_empty());
    Ok(())
}

#[tokio::test]
async fn cancel_stops_a_slow_request() -> anyhow::Result<()> {
    let stub = OpenLibraryStub::spawn(|_| {
        StubResponse::json(one_book_response()).delayed(Duration::from_secs(5))
    });
    let endpoint = Url::parse(&stub.search_url())?;
    let request = query::build(&endpoint, "slow", Scope::All, &FilterSet::default(), 1).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = client().search(&request, &cancel).await.unwrap_err();
    assert_eq!(err, SearchError::Canceled);
    assert!(started.elapsed() < Duration::from_secs(4));
    Ok(())
}
