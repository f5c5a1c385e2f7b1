use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum GoogleBehavior {
    Hit,
    Empty,
    Status500,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum OpenLibraryBehavior {
    Edition,
    Missing,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum AuthorBehavior {
    Resolved,
    AllFailing,
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogStubConfig {
    pub google: GoogleBehavior,
    pub open_library: OpenLibraryBehavior,
    pub authors: AuthorBehavior,
}

#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct CatalogHits {
    pub google: AtomicUsize,
    pub editions: AtomicUsize,
    pub authors: AtomicUsize,
}

/// One tiny_http server standing in for both catalogs: the Google Books
/// volume search under `/volumes` and Open Library under `/isbn/...` and
/// `/authors/...`.
pub struct CatalogStub {
    pub base_url: String,
    #[allow(dead_code)]
    pub hits: Arc<CatalogHits>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CatalogStub {
    pub fn spawn(config: CatalogStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start catalog stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let hits = Arc::new(CatalogHits::default());
        let hits_for_server = Arc::clone(&hits);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

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

                let path = request
                    .url()
                    .split('?')
                    .next()
                    .unwrap_or(request.url())
                    .to_string();

                let (status, body) = if path == "/volumes" {
                    hits_for_server.google.fetch_add(1, Ordering::SeqCst);
                    google_response(config.google)
                } else if path.starts_with("/isbn/") {
                    hits_for_server.editions.fetch_add(1, Ordering::SeqCst);
                    edition_response(config.open_library)
                } else if path.starts_with("/authors/") {
                    hits_for_server.authors.fetch_add(1, Ordering::SeqCst);
                    author_response(&path, config.authors)
                } else {
                    (404, "not found".to_string())
                };

                let mut response =
                    tiny_http::Response::from_string(body).with_status_code(status);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for CatalogStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn google_response(behavior: GoogleBehavior) -> (u16, String) {
    match behavior {
        GoogleBehavior::Status500 => (500, r#"{"error":"backend"}"#.to_string()),
        GoogleBehavior::Empty => (200, r#"{"totalItems":0}"#.to_string()),
        GoogleBehavior::Hit => (
            200,
            serde_json::json!({
                "totalItems": 1,
                "items": [
                    {
                        "volumeInfo": {
                            "title": "O Hobbit",
                            "authors": ["J. R. R. Tolkien"],
                            "description": "Lá e de volta outra vez.",
                            "imageLinks": {
                                "thumbnail": "http://books.google.com/hobbit.jpg",
                                "smallThumbnail": "http://books.google.com/hobbit-s.jpg"
                            },
                            "publisher": "HarperCollins",
                            "publishedDate": "2019-05-20",
                            "averageRating": 4.6,
                            "ratingsCount": 1042,
                            "pageCount": 336,
                            "categories": ["Fiction", "Fantasy"]
                        }
                    }
                ]
            })
            .to_string(),
        ),
    }
}

fn edition_response(behavior: OpenLibraryBehavior) -> (u16, String) {
    match behavior {
        OpenLibraryBehavior::Missing => (404, r#"{"error":"notfound"}"#.to_string()),
        OpenLibraryBehavior::Edition => (
            200,
            serde_json::json!({
                "title": "O Pequeno Príncipe",
                "authors": [
                    { "key": "/authors/OL1A" },
                    { "key": "/authors/OL2A" }
                ],
                "description": { "type": "/type/text", "value": "Fábula poética." },
                "publishers": ["Agir"],
                "publish_date": "2015",
                "number_of_pages": 96,
                "subjects": ["Fiction", "Aviators", "Princes", "Roses", "Foxes"]
            })
            .to_string(),
        ),
    }
}

fn author_response(path: &str, behavior: AuthorBehavior) -> (u16, String) {
    match behavior {
        AuthorBehavior::AllFailing => (500, r#"{"error":"backend"}"#.to_string()),
        AuthorBehavior::Resolved => {
            // One reference resolves; the other is gone, to exercise the
            // skip-and-continue path.
            if path == "/authors/OL1A.json" {
                (
                    200,
                    r#"{"name":"Antoine de Saint-Exupéry"}"#.to_string(),
                )
            } else {
                (404, r#"{"error":"notfound"}"#.to_string())
            }
        }
    }
}
