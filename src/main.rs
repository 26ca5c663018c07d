// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load the config file
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = pages skipped, 2 = error)
// =============================================================================

mod cli;
mod config;
mod error;
mod export;
mod logging;
mod report;
mod site;
mod tracker;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use export::{Discovery, ExportReport, ExportSettings, Exporter, Origin};
use tracker::UrlTracker;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = export complete (or server stopped cleanly)
//   Ok(1) = export finished but some pages were skipped
//   Err   = the run failed
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let mut config = config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { site, limits, bind } => {
            site.apply(&mut config);
            limits.apply(&mut config);
            if let Some(bind) = bind {
                config.bind = bind;
            }
            config.validate()?;

            site::serve(config).await?;
            Ok(0)
        }
        Commands::Export { site, limits, json } => {
            site.apply(&mut config);
            limits.apply(&mut config);
            config.validate()?;

            handle_export(config, json).await
        }
        Commands::Mirror {
            url,
            assets,
            output,
            limits,
            json,
        } => {
            if let Some(assets) = assets {
                config.assets_dir = assets;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            limits.apply(&mut config);
            config.validate()?;

            handle_mirror(&url, config, json).await
        }
    }
}

// Handles the 'export' subcommand
//
// Boots the blog on a free localhost port, exports it through that port,
// then shuts it down again
async fn handle_export(config: SiteConfig, json: bool) -> Result<i32> {
    let site = site::start(config, "127.0.0.1:0").await?;

    let result = site.state.exporter.export(&site.origin).await;
    site.stop().await?;

    let report = result.context("export failed")?;
    report::print_report(&report, json)?;
    Ok(exit_code(&report))
}

// Handles the 'mirror' subcommand
//
// The remote server does not register links with us, so the driver
// scrapes them from the pages it fetches
async fn handle_mirror(url: &str, config: SiteConfig, json: bool) -> Result<i32> {
    let origin = Origin::parse(url)?;
    let settings = ExportSettings::from_config(&config, Discovery::Scraped);
    let exporter = Exporter::new(UrlTracker::new(), settings);

    let report = exporter
        .export(&origin)
        .await
        .with_context(|| format!("failed to mirror {}", origin))?;
    report::print_report(&report, json)?;
    Ok(exit_code(&report))
}

fn exit_code(report: &ExportReport) -> i32 {
    if report.is_complete() {
        0
    } else {
        1
    }
}
