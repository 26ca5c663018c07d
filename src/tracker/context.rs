// src/tracker/context.rs
// =============================================================================
// RenderContext: what a page renderer needs to take part in an export.
//
// It bundles the tracker handle with one flag: "was this render requested
// by the export driver?". On the wire the driver says so with the marker
// header; the server turns that into a RenderContext once per request and
// passes it down to whatever builds links.
//
// Renderers never call the tracker directly. They build every internal link
// with `static_page`, which returns the link unchanged and registers it when
// the flag is set.
// =============================================================================

use axum::http::HeaderMap;

use super::{UrlTracker, MARKER_HEADER};

#[derive(Debug, Clone)]
pub struct RenderContext {
    tracker: UrlTracker,
    export_render: bool,
}

impl RenderContext {
    pub fn new(tracker: UrlTracker, export_render: bool) -> Self {
        Self {
            tracker,
            export_render,
        }
    }

    // Builds the context for one incoming request
    //
    // Only the presence of the marker header matters, not its value
    pub fn from_headers(tracker: &UrlTracker, headers: &HeaderMap) -> Self {
        Self::new(tracker.clone(), headers.contains_key(MARKER_HEADER))
    }

    pub fn is_export_render(&self) -> bool {
        self.export_render
    }

    /// Returns `url` unchanged, registering it for export on driver renders.
    pub fn static_page(&self, url: impl Into<String>) -> String {
        let url = url.into();
        self.tracker.register(self.export_render, &url);
        url
    }
}
