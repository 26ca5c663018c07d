// src/report.rs
// =============================================================================
// Printing export reports, either as a table or as JSON (--json).
//
// The table lists every exported page in discovery order, then the skipped
// pages (only possible with --on-error skip), then a summary.
// =============================================================================

use anyhow::Result;

use crate::export::ExportReport;

// Prints the report either as a table or JSON
pub fn print_report(report: &ExportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &ExportReport) {
    println!("{:<60} {:>10}", "URL", "BYTES");
    println!("{}", "=".repeat(71));

    for page in &report.pages {
        println!("{:<60} {:>10}", truncate(&page.url, 60), page.bytes);
    }

    if !report.failed.is_empty() {
        println!();
        println!("{:<60} {}", "SKIPPED", "REASON");
        println!("{}", "=".repeat(71));
        for failed in &report.failed {
            println!("{:<60} {}", truncate(&failed.url, 60), failed.reason);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   🌐 Origin: {}", report.origin);
    println!("   📁 Output: {}", report.output_dir.display());
    println!("   📄 Pages: {}", report.pages.len());
    println!("   🎨 Assets: {}", report.assets_copied);
    println!("   ❌ Skipped: {}", report.failed.len());
}

// Shortens long URLs so the table columns stay aligned
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
