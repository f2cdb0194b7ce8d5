use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What the stub answers for one request.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    #[allow(dead_code)]
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            delay: Duration::ZERO,
        }
    }

    #[allow(dead_code)]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = dyn Fn(&str) -> StubResponse + Send + Sync;

/// Stand-in for the search endpoint, served at `{base_url}/search.json`.
pub struct OpenLibraryStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl OpenLibraryStub {
    pub fn spawn(handler: impl Fn(&str) -> StubResponse + Send + Sync + 'static) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start openlibrary stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                recorded.lock().expect("lock requests").push(url.clone());

                let path = url.split('?').next().unwrap_or(&url);
                if request.method() != &tiny_http::Method::Get || path != "/search.json" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                // Delayed answers run on their own thread so later requests are not blocked.
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    let stub = handler(&url);
                    if !stub.delay.is_zero() {
                        thread::sleep(stub.delay);
                    }
                    let header = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"application/json"[..],
                    )
                    .expect("build header");
                    let response = tiny_http::Response::from_string(stub.body)
                        .with_status_code(stub.status)
                        .with_header(header);
                    let _ = request.respond(response);
                });
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url)
    }

    /// Request targets (path + query) received so far.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock requests").clone()
    }
}

impl Drop for OpenLibraryStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(dead_code)]
pub fn one_book_response() -> serde_json::Value {
    serde_json::json!({
        "numFound": 1,
        "docs": [
            {
                "key": "/works/OL1W",
                "title": "Test Book",
                "author_name": ["Ada Author"],
                "first_publish_year": 2001,
                "cover_i": 1234
            }
        ]
    })
}
