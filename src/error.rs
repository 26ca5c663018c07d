// src/error.rs
// =============================================================================
// Typed errors for the export engine.
//
// Every failure of an export run ends up as one ExportError variant. The
// variants follow the phases of a run:
// - Setup:   the output directory or the asset tree could not be prepared
// - Fetch:   a page could not be fetched from the render server
// - Write:   a fetched page could not be written to disk
// - Crawl:   the worklist never drained (too many URLs)
//
// Each variant carries the offending URL or path plus the underlying cause,
// so nothing reaches the caller without context.
//
// We use `thiserror` here (typed errors the HTTP handler can match on) and
// keep `anyhow` for the application layer in main.rs.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a single page fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The server answered, but not with a 2xx status
    #[error("HTTP {0}")]
    Status(u16),
    /// The request did not finish within the configured timeout
    #[error("request timed out")]
    Timeout,
    /// The server could not be reached at all
    #[error("connection failed: {0}")]
    Connect(String),
    /// Anything else reqwest reports (body decoding, redirects, ...)
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export run is already in progress")]
    AlreadyRunning,

    #[error("asset source directory does not exist: {0}")]
    AssetsMissing(PathBuf),

    #[error("could not prepare output directory {path}: {source}")]
    PrepareOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not copy asset {path}: {source}")]
    CopyAsset {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("invalid page URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to fetch {url}: {failure}")]
    Fetch { url: String, failure: FetchFailure },

    #[error("failed to write {url} to {path}: {source}")]
    Write {
        url: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("crawl did not converge: more than {limit} URLs discovered")]
    NotConverged { limit: usize },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ExportError {
    /// The page URL this error is about, if it is about one page.
    pub fn url(&self) -> Option<&str> {
        match self {
            ExportError::InvalidUrl { url, .. }
            | ExportError::Fetch { url, .. }
            | ExportError::Write { url, .. } => Some(url),
            _ => None,
        }
    }
}
