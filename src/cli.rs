// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - serve:  run the blog with a POST /export trigger
// - export: boot the blog in the background, export it once, exit
// - mirror: export some other running server by following its links
//
// Directory and limit flags override the config file; anything not given
// on the command line comes from the config (or its defaults).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{FailurePolicy, SiteConfig};

#[derive(Parser, Debug)]
#[command(
    name = "static-export",
    version,
    about = "Export a dynamically rendered site into static files",
    long_about = "static-export renders every page of a site once, following the links each \
                  page emits while it is rendered, and writes the results as a static file tree \
                  ready for any file server."
)]
pub struct Cli {
    /// Path to a TOML config file (default: ./static-export.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the blog; POST /export writes the static copy
    ///
    /// Example: static-export serve --bind 127.0.0.1:5000
    Serve {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        limits: LimitArgs,

        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
    },

    /// Export the blog once and exit
    ///
    /// Example: static-export export --output docs
    Export {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export an already running server by scraping its same-origin links
    ///
    /// Example: static-export mirror http://localhost:8080 --assets public
    Mirror {
        /// Origin of the server to export (e.g. http://localhost:8080)
        url: String,

        /// Static files to copy into the output
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Output directory (wiped before the export)
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Where the blog reads from and writes to
#[derive(Args, Debug, Default)]
pub struct SiteArgs {
    /// Folder of YYYY-MM-DD-slug.md posts
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Static files served live and copied into the export
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Output directory (wiped before every export)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Export run limits
#[derive(Args, Debug, Default)]
pub struct LimitArgs {
    /// Stop an export after this many distinct URLs
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// What to do when a page cannot be fetched
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,
}

impl SiteArgs {
    pub fn apply(self, config: &mut SiteConfig) {
        if let Some(content) = self.content {
            config.content_dir = content;
        }
        if let Some(assets) = self.assets {
            config.assets_dir = assets;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
    }
}

impl LimitArgs {
    pub fn apply(self, config: &mut SiteConfig) {
        if let Some(max_urls) = self.max_urls {
            config.max_urls = max_urls;
        }
        if let Some(policy) = self.on_error {
            config.on_fetch_error = policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn export_flags_override_config() {
        let cli = Cli::parse_from([
            "static-export",
            "export",
            "--output",
            "public",
            "--on-error",
            "skip",
            "--json",
        ]);
        let Commands::Export { site, limits, json } = cli.command else {
            panic!("expected export command");
        };
        assert!(json);

        let mut config = SiteConfig::default();
        site.apply(&mut config);
        limits.apply(&mut config);
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.on_fetch_error, FailurePolicy::Skip);
        assert_eq!(config.content_dir, PathBuf::from("_posts"));
        assert_eq!(config.max_urls, 10_000);
    }

    #[test]
    fn mirror_takes_a_url() {
        let cli = Cli::parse_from([
            "static-export",
            "-v",
            "mirror",
            "http://localhost:8080",
            "--max-urls",
            "50",
        ]);
        assert!(cli.verbose);
        let Commands::Mirror { url, limits, .. } = cli.command else {
            panic!("expected mirror command");
        };
        assert_eq!(url, "http://localhost:8080");
        assert_eq!(limits.max_urls, Some(50));
    }
}
