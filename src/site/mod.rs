// src/site/mod.rs
// =============================================================================
// The blog: a small dynamic site that renders markdown posts and can
// export itself.
//
// Submodules:
// - posts:  reading `YYYY-MM-DD-slug.md` files from the content directory
// - pages:  HTML rendering (every internal link goes through RenderContext)
// - routes: axum handlers, including POST /export
// - server: start/stop/serve
// =============================================================================

mod pages;
mod posts;
mod routes;
mod server;

pub use server::{serve, start};
