// src/export/mod.rs
// =============================================================================
// This module exports a live site into a static file tree.
//
// Submodules:
// - driver: the export run itself (prepare, seed, drain the worklist)
// - fetch:  HTTP fetching with the marker header, failure classification
// - output: URL -> file mapping, output directory reset, asset copy
// - links:  link scraping for servers that don't report their links
// =============================================================================

mod driver;
mod fetch;
mod links;
mod output;

pub use driver::{Discovery, ExportReport, ExportSettings, Exporter, RunPhase};
pub use fetch::Origin;
