// src/export/output.rs
// =============================================================================
// Everything the export does to the output directory.
//
// - output_path:    maps a page URL to the file it is written to
// - prepare_output: wipes the output directory and copies the assets in
// - write_page:     writes one rendered page, creating parent directories
//
// URL to file mapping:
//   /                  -> <root>/Index.html
//   /posts/2024-hello  -> <root>/posts/2024-hello/Index.html
//   /posts/2024-hello/ -> <root>/posts/2024-hello/Index.html  (same file)
// =============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ExportError;

/// Leaf file name every exported page is written to
pub const INDEX_FILE: &str = "Index.html";

// Maps a page URL to its file under the output root
//
// Parameters:
//   root: the output directory
//   url:  a root-relative page URL, e.g. "/posts/2024-hello"
//
// Returns: the file path, or InvalidUrl for URLs that are not root-relative
// or would climb out of the output root ("." and ".." segments)
pub fn output_path(root: &Path, url: &str) -> Result<PathBuf, ExportError> {
    if !url.starts_with('/') {
        return Err(ExportError::InvalidUrl {
            url: url.to_string(),
            reason: "page URLs must start with '/'".to_string(),
        });
    }

    let mut path = root.to_path_buf();
    // Pushing segment by segment gives us the platform separator for free
    for segment in url.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(ExportError::InvalidUrl {
                url: url.to_string(),
                reason: "relative path segments are not allowed".to_string(),
            });
        }
        path.push(segment);
    }
    path.push(INDEX_FILE);

    Ok(path)
}

// Resets the output directory and copies the asset tree into it
//
// Parameters:
//   output_dir: export destination (deleted if it exists)
//   assets_dir: static files to copy verbatim
//
// Returns: the number of asset files copied
//
// The asset tree is checked before anything is deleted, so a typo in the
// assets path does not wipe a previous export.
pub fn prepare_output(output_dir: &Path, assets_dir: &Path) -> Result<usize, ExportError> {
    if !assets_dir.is_dir() {
        return Err(ExportError::AssetsMissing(assets_dir.to_path_buf()));
    }

    let prepare_err = |source: io::Error| ExportError::PrepareOutput {
        path: output_dir.to_path_buf(),
        source,
    };

    // Output around the assets: the wipe destroys the copy source.
    // Output inside the assets: the copy walks into its own output.
    let assets = fs::canonicalize(assets_dir).map_err(prepare_err)?;
    let output = resolve_path(output_dir).map_err(prepare_err)?;
    if assets.starts_with(&output) || output.starts_with(&assets) {
        return Err(prepare_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output and asset directories must not contain each other",
        )));
    }

    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(prepare_err)?;
    }
    fs::create_dir_all(output_dir).map_err(prepare_err)?;

    copy_assets(assets_dir, output_dir)
}

// Canonical form of a path that may not exist yet: the deepest existing
// ancestor is canonicalized and the missing tail appended to it
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut missing = Vec::new();
    let mut existing = absolute.as_path();

    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = fs::canonicalize(existing)?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

// Recursively copies `src` into `dst`, preserving relative paths
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, ExportError> {
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| ExportError::CopyAsset {
            path: e.path().unwrap_or(src).to_path_buf(),
            source: e.into(),
        })?;

        let copy_err = |source: io::Error| ExportError::CopyAsset {
            path: entry.path().to_path_buf(),
            source,
        };

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| copy_err(io::Error::new(io::ErrorKind::Other, e)))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(copy_err)?;
        } else {
            fs::copy(entry.path(), &target).map_err(copy_err)?;
            copied += 1;
        }
    }

    tracing::debug!(files = copied, "copied assets from {}", src.display());
    Ok(copied)
}

/// Writes a rendered page, creating parent directories and overwriting any
/// existing file.
pub async fn write_page(path: &Path, body: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await
}
