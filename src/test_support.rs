// src/test_support.rs
// =============================================================================
// Shared test utilities: a scriptable render server and fixture assets.
//
// FakeSite serves pages whose links are fixed up front. Each page builds
// its links through a RenderContext like the real blog renderer, so export
// runs see the same registration behavior.
//
//   let tracker = UrlTracker::new();
//   let site = FakeSite::new(&tracker).page("/", &["/a"]).page("/a", &[]);
//   let origin = spawn(site.router()).await;
// =============================================================================

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::export::Origin;
use crate::tracker::{RenderContext, UrlTracker};

#[derive(Clone)]
pub struct FakeSite {
    tracker: UrlTracker,
    pages: HashMap<String, Vec<String>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn new(tracker: &UrlTracker) -> Self {
        Self {
            tracker: tracker.clone(),
            pages: HashMap::new(),
            hits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `url` as a page linking to `links`. Unknown URLs answer 404.
    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(render).with_state(self.clone())
    }

    /// Every path requested so far, in request order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

async fn render(State(site): State<FakeSite>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    site.hits.lock().unwrap().push(path.clone());

    let Some(links) = site.pages.get(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let ctx = RenderContext::from_headers(&site.tracker, &headers);
    let body: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, ctx.static_page(link.as_str()), link))
        .collect();

    Html(format!("<html><body>{}</body></html>", body)).into_response()
}

/// Serve `router` on an ephemeral localhost port until the test ends.
pub async fn spawn(router: Router) -> Origin {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Origin::new("http", addr.to_string())
}

/// Asset tree with `style.css` and `img/logo.png`.
pub fn asset_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("style.css"), "body { margin: 0 }\n").unwrap();
    fs::create_dir(tmp.path().join("img")).unwrap();
    fs::write(
        tmp.path().join("img").join("logo.png"),
        [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    )
    .unwrap();
    tmp
}
