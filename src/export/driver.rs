// src/export/driver.rs
// =============================================================================
// The export driver: turns a live site into a static file tree.
//
// How one run works:
// 1. Preparing: wipe the output directory and copy the assets into it
// 2. Seed the tracker with "/"
// 3. Draining: pop the next pending URL, fetch it with the marker header,
//    write the body to <output>/<url>/Index.html. Rendering that page may
//    register new URLs in the tracker, which makes them pending in turn
// 4. Done when nothing is pending, i.e. every discovered URL was fetched
//    exactly once
//
// Phases: Idle -> Preparing -> Draining -> Done, and any step can end in
// Failed. A failed run is not resumed; files already written stay on disk.
//
// Guards:
// - Only one run at a time. A second call while a run is active gets
//   ExportError::AlreadyRunning right away
// - A run that keeps discovering URLs past `max_urls` stops with
//   ExportError::NotConverged
// =============================================================================

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use super::fetch::{Origin, PageFetcher};
use super::links::extract_page_links;
use super::output::{output_path, prepare_output, write_page};
use crate::config::{FailurePolicy, SiteConfig};
use crate::error::ExportError;
use crate::tracker::{UrlTracker, ROOT_URL};

/// How the driver learns about new pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Discovery {
    /// The render server registers links through its RenderContext
    #[default]
    Tracked,
    /// The driver scrapes same-origin links out of every fetched page
    Scraped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    Preparing,
    Draining,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub max_urls: usize,
    pub on_fetch_error: FailurePolicy,
    pub request_timeout: Duration,
    pub discovery: Discovery,
}

impl ExportSettings {
    pub fn from_config(config: &SiteConfig, discovery: Discovery) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            assets_dir: config.assets_dir.clone(),
            max_urls: config.max_urls,
            on_fetch_error: config.on_fetch_error,
            request_timeout: config.request_timeout(),
            discovery,
        }
    }
}

/// One page written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedPage {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// One page skipped under `FailurePolicy::Skip`.
#[derive(Debug, Clone, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

/// Summary of a finished run. Pages are listed in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub origin: String,
    pub output_dir: PathBuf,
    pub assets_copied: usize,
    pub pages: Vec<ExportedPage>,
    pub failed: Vec<FailedPage>,
}

impl ExportReport {
    /// True when every discovered page was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Exporter {
    tracker: UrlTracker,
    settings: ExportSettings,
    run_lock: Mutex<()>,
    phase: watch::Sender<RunPhase>,
}

impl Exporter {
    // Creates a driver that shares `tracker` with the render server
    pub fn new(tracker: UrlTracker, settings: ExportSettings) -> Self {
        let (phase, _) = watch::channel(RunPhase::Idle);
        Self {
            tracker,
            settings,
            run_lock: Mutex::new(()),
            phase,
        }
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    // Runs one complete export against `origin`
    //
    // Returns: the report, or the error that stopped the run
    pub async fn export(&self, origin: &Origin) -> Result<ExportReport, ExportError> {
        let _running = self
            .run_lock
            .try_lock()
            .map_err(|_| ExportError::AlreadyRunning)?;

        let result = self.run(origin).await;
        match &result {
            Ok(report) => {
                self.phase.send_replace(RunPhase::Done);
                tracing::info!(
                    pages = report.pages.len(),
                    failed = report.failed.len(),
                    "export finished"
                );
            }
            Err(e) => {
                self.phase.send_replace(RunPhase::Failed);
                tracing::error!(error = %e, url = e.url(), "export failed");
            }
        }
        result
    }

    async fn run(&self, origin: &Origin) -> Result<ExportReport, ExportError> {
        self.phase.send_replace(RunPhase::Preparing);
        tracing::info!(
            %origin,
            output = %self.settings.output_dir.display(),
            "starting export"
        );

        // Build the client first: a bad origin must not wipe the output
        let fetcher = PageFetcher::new(origin, self.settings.request_timeout)?;
        let assets_copied = prepare_output(&self.settings.output_dir, &self.settings.assets_dir)?;

        self.tracker.reset(ROOT_URL);
        self.phase.send_replace(RunPhase::Draining);

        let mut report = ExportReport {
            origin: origin.to_string(),
            output_dir: self.settings.output_dir.clone(),
            assets_copied,
            pages: Vec::new(),
            failed: Vec::new(),
        };

        while let Some(url) = self.tracker.next_pending() {
            if self.tracker.len() > self.settings.max_urls {
                return Err(ExportError::NotConverged {
                    limit: self.settings.max_urls,
                });
            }

            match self.visit(&fetcher, &url).await {
                Ok(page) => report.pages.push(page),
                Err(e) if self.is_skippable(&e) => {
                    tracing::warn!(url = %url, error = %e, "skipping page");
                    report.failed.push(FailedPage {
                        url,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    // Fetches one URL and writes it to its output file
    async fn visit(&self, fetcher: &PageFetcher, url: &str) -> Result<ExportedPage, ExportError> {
        let path = output_path(&self.settings.output_dir, url)?;
        let absolute = fetcher.absolute_url(url)?;

        tracing::info!(url, "exporting page");
        let body = fetcher
            .fetch(&absolute)
            .await
            .map_err(|failure| ExportError::Fetch {
                url: url.to_string(),
                failure,
            })?;

        if self.settings.discovery == Discovery::Scraped {
            let html = String::from_utf8_lossy(&body);
            for link in extract_page_links(&html, &absolute) {
                self.tracker.register(true, &link);
            }
        }

        write_page(&path, &body)
            .await
            .map_err(|source| ExportError::Write {
                url: url.to_string(),
                path: path.clone(),
                source,
            })?;

        Ok(ExportedPage {
            url: url.to_string(),
            path,
            bytes: body.len(),
        })
    }

    // Per-page errors the skip policy may step over. Write errors are
    // never skipped: a failing disk will fail the next page too.
    fn is_skippable(&self, error: &ExportError) -> bool {
        self.settings.on_fetch_error == FailurePolicy::Skip
            && matches!(
                error,
                ExportError::Fetch { .. } | ExportError::InvalidUrl { .. }
            )
    }
}
