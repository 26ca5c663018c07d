// src/site/server.rs
// =============================================================================
// Starting and stopping the blog server.
//
// - serve: run on the configured address until Ctrl+C
// - start: run in the background (used by the `export` command and tests),
//          returning a handle with the server's origin and state
// =============================================================================

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::routes::{router, AppState};
use crate::config::SiteConfig;
use crate::export::Origin;

/// A blog server running on a background task.
pub struct RunningSite {
    pub origin: Origin,
    pub state: AppState,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningSite {
    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(self) -> Result<()> {
        // The receiver is gone only if the server already stopped on its own
        let _ = self.shutdown.send(());
        self.task
            .await
            .context("server task panicked")?
            .context("server error")?;
        Ok(())
    }
}

// Starts the blog server in the background
//
// Parameters:
//   config: site configuration (content, assets, export settings)
//   addr:   address to bind, e.g. "127.0.0.1:0" for any free port
pub async fn start(config: SiteConfig, addr: &str) -> Result<RunningSite> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    let local = listener.local_addr()?;

    let state = AppState::new(config);
    let app = router(state.clone());
    let (shutdown, signal) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = signal.await;
            })
            .await
    });

    tracing::debug!("blog server listening on {}", local);
    Ok(RunningSite {
        origin: Origin::new("http", local.to_string()),
        state,
        shutdown,
        task,
    })
}

// Runs the blog server in the foreground until Ctrl+C
pub async fn serve(config: SiteConfig) -> Result<()> {
    let bind = config.bind.clone();
    let site = start(config, &bind).await?;

    tracing::info!("serving blog on {}", site.origin);
    tracing::info!("export with: curl -X POST {}/export", site.origin);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    tracing::info!("shutting down");

    site.stop().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MARKER_HEADER;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    // content/ with two posts, wwwroot/ with a stylesheet, docs/ as output
    fn blog_fixture() -> (TempDir, SiteConfig) {
        let root = tempdir().unwrap();
        let content = root.path().join("_posts");
        let assets = root.path().join("wwwroot");
        fs::create_dir_all(&content).unwrap();
        fs::create_dir_all(&assets).unwrap();
        fs::write(content.join("2024-01-15-hello-world.md"), "# Hello\n\nFirst post.").unwrap();
        fs::write(content.join("2024-02-20-second-post.md"), "# Second\n").unwrap();
        fs::write(assets.join("style.css"), "body { color: black }").unwrap();

        let config = SiteConfig {
            content_dir: content,
            assets_dir: assets,
            output_dir: root.path().join("docs"),
            ..SiteConfig::default()
        };
        (root, config)
    }

    #[tokio::test]
    async fn export_writes_index_and_every_post() {
        let (root, config) = blog_fixture();
        let site = start(config, "127.0.0.1:0").await.unwrap();

        let report = site.state.exporter.export(&site.origin).await.unwrap();
        site.stop().await.unwrap();

        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/",
                "/posts/2024/02/20/second-post",
                "/posts/2024/01/15/hello-world"
            ]
        );

        let docs = root.path().join("docs");
        let post = fs::read_to_string(
            docs.join("posts/2024/01/15/hello-world").join("Index.html"),
        )
        .unwrap();
        assert!(post.contains("<h1>Hello</h1>"));
        assert!(docs.join("style.css").exists());

        let index = fs::read_to_string(docs.join("Index.html")).unwrap();
        assert!(!index.contains("<form"));
    }

    #[tokio::test]
    async fn browsing_does_not_register_links() {
        let (_root, config) = blog_fixture();
        let site = start(config, "127.0.0.1:0").await.unwrap();
        site.state.tracker.reset("/");

        let body = reqwest::get(format!("{}/", site.origin))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("hello world"));
        assert_eq!(site.state.tracker.discovered(), vec!["/"]);

        let client = reqwest::Client::new();
        client
            .get(format!("{}/", site.origin))
            .header(MARKER_HEADER, "true")
            .send()
            .await
            .unwrap();
        assert_eq!(site.state.tracker.len(), 3);

        site.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_post_is_404_and_assets_are_served() {
        let (_root, config) = blog_fixture();
        let site = start(config, "127.0.0.1:0").await.unwrap();

        let missing = reqwest::get(format!("{}/posts/2020/01/01/nope", site.origin))
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        let css = reqwest::get(format!("{}/style.css", site.origin))
            .await
            .unwrap();
        assert!(css.status().is_success());
        assert_eq!(css.text().await.unwrap(), "body { color: black }");

        site.stop().await.unwrap();
    }

    #[tokio::test]
    async fn post_export_endpoint_runs_an_export() {
        let (root, config) = blog_fixture();
        let site = start(config, "127.0.0.1:0").await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/export", site.origin))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let body = response.text().await.unwrap();
        assert!(body.contains("Export finished"));

        assert!(root.path().join("docs").join("Index.html").exists());

        let status: serde_json::Value = reqwest::get(format!("{}/export", site.origin))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["phase"], "Done");
        assert_eq!(status["discovered"], 3);

        site.stop().await.unwrap();
    }
}
