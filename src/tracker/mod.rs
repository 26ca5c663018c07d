// src/tracker/mod.rs
// =============================================================================
// This module tracks which page URLs must be exported.
//
// Submodules:
// - registry: the shared, deduplicated worklist (UrlTracker)
// - context:  the per-request handle renderers use to register links
// =============================================================================

mod context;
mod registry;

pub use context::RenderContext;
pub use registry::UrlTracker;

/// Request header the export driver sends with every page fetch.
///
/// Presence-only: any value marks the request as coming from the driver.
/// Header names are case-insensitive on the wire; the lowercase form is the
/// one `http::HeaderName` stores.
pub const MARKER_HEADER: &str = "staticsitegenerator";

/// First URL of every export run
pub const ROOT_URL: &str = "/";
