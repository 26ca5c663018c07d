// src/site/routes.rs
// =============================================================================
// HTTP routes of the blog server.
//
//   GET  /                              post index
//   GET  /posts/:year/:month/:day/:name a single post
//   GET  /export                        phase of the current/last export
//   POST /export                        run an export of this very server
//   *                                   static assets from assets_dir
//
// Every page handler builds a RenderContext from the request headers, so
// renders requested by the export driver (marker header present) register
// their links and ordinary browsing does not.
// =============================================================================

use axum::extract::{Path, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::pages;
use super::posts::{list_posts, BlogPost};
use crate::config::SiteConfig;
use crate::error::ExportError;
use crate::export::{Discovery, ExportSettings, Exporter, Origin, RunPhase};
use crate::tracker::{RenderContext, UrlTracker};

/// Shared state: the config plus the tracker/driver pair of this server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub tracker: UrlTracker,
    pub exporter: Arc<Exporter>,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Self {
        let tracker = UrlTracker::new();
        let settings = ExportSettings::from_config(&config, Discovery::Tracked);
        let exporter = Arc::new(Exporter::new(tracker.clone(), settings));
        Self {
            config: Arc::new(config),
            tracker,
            exporter,
        }
    }

    fn render_context(&self, headers: &HeaderMap) -> RenderContext {
        RenderContext::from_headers(&self.tracker, headers)
    }
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.assets_dir);

    Router::new()
        .route("/", get(index))
        .route("/posts/:year/:month/:day/:name", get(show_post))
        .route("/export", get(export_status).post(trigger_export))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = state.render_context(&headers);
    match list_posts(&state.config.content_dir) {
        Ok(posts) => Html(pages::index_page(&ctx, &posts)).into_response(),
        Err(e) => internal_error("could not list posts", e),
    }
}

async fn show_post(
    State(state): State<AppState>,
    Path((year, month, day, name)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let ctx = state.render_context(&headers);
    let not_found = || (StatusCode::NOT_FOUND, Html(pages::not_found_page(&ctx))).into_response();

    let Some(post) = BlogPost::from_route(&year, &month, &day, &name) else {
        return not_found();
    };

    match tokio::fs::read_to_string(post.path_in(&state.config.content_dir)).await {
        Ok(markdown) => Html(pages::post_page(&ctx, &post, &markdown)).into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(),
        Err(e) => internal_error("could not read post", e),
    }
}

// Runs an export of this server, reached through the address the client
// used. The response is sent once the whole run is over.
async fn trigger_export(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = state.render_context(&headers);
    let origin = request_origin(&headers, &state.config.bind);

    let result = state.exporter.export(&origin).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(ExportError::AlreadyRunning) => StatusCode::CONFLICT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Html(pages::export_result_page(&ctx, &result))).into_response()
}

#[derive(Debug, Serialize)]
struct ExportStatus {
    phase: RunPhase,
    discovered: usize,
}

async fn export_status(State(state): State<AppState>) -> Json<ExportStatus> {
    Json(ExportStatus {
        phase: state.exporter.phase(),
        discovered: state.tracker.len(),
    })
}

// Scheme and host the request came in on
//
// The scheme comes from X-Forwarded-Proto when a proxy sets it; this server
// itself only speaks plain http
fn request_origin(headers: &HeaderMap, fallback_host: &str) -> Origin {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let scheme = header("x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = header(HOST.as_str()).unwrap_or_else(|| fallback_host.to_string());
    Origin::new(scheme, host)
}

fn internal_error(what: &str, error: io::Error) -> Response {
    tracing::error!(error = %error, "{}", what);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", what, error)).into_response()
}
