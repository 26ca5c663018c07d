// src/site/posts.rs
// =============================================================================
// Blog posts on disk.
//
// Posts are markdown files named `YYYY-MM-DD-slug.md` inside the content
// directory, e.g. `2024-03-09-hello-world.md`. The name is the only
// metadata: it gives the publication date and the slug used in the URL
//
//   2024-03-09-hello-world.md  ->  /posts/2024/03/09/hello-world
//
// Only the blog renderer reads these names. The export engine just sees
// the URLs the renderer emits.
// =============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EXTENSION: &str = ".md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub file_name: String,
    pub year: String,
    pub month: String,
    pub day: String,
    /// Slug after the date, dashes preserved
    pub name: String,
}

impl BlogPost {
    // Parses a post file name
    //
    // Returns: None unless the name is `YYYY-MM-DD-slug.md` with a
    // non-empty slug that is safe to use as a single path segment
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(EXTENSION)?;

        let year = stem.get(0..4)?;
        let month = stem.get(5..7)?;
        let day = stem.get(8..10)?;
        let name = stem.get(11..)?;

        let dashes = [stem.get(4..5)?, stem.get(7..8)?, stem.get(10..11)?];
        if dashes.iter().any(|d| *d != "-") {
            return None;
        }
        if ![year, month, day]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return None;
        }

        Some(Self {
            file_name: file_name.to_string(),
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
            name: name.to_string(),
        })
    }

    // Builds the post for a URL's path parameters
    //
    // Goes through `parse` so a URL can only ever name a well-formed file
    pub fn from_route(year: &str, month: &str, day: &str, name: &str) -> Option<Self> {
        Self::parse(&format!("{}-{}-{}-{}{}", year, month, day, name, EXTENSION))
    }

    pub fn url(&self) -> String {
        format!("/posts/{}/{}/{}/{}", self.year, self.month, self.day, self.name)
    }

    pub fn date(&self) -> String {
        format!("{}-{}-{}", self.year, self.month, self.day)
    }

    /// Display title: slug with dashes turned into spaces
    pub fn title(&self) -> String {
        self.name.replace('-', " ")
    }

    pub fn path_in(&self, content_dir: &Path) -> PathBuf {
        content_dir.join(&self.file_name)
    }
}

// Lists all posts in the content directory, newest first
//
// A missing directory means "no posts yet". Markdown files that don't
// follow the naming pattern are skipped with a warning; other files are
// ignored silently.
pub fn list_posts(content_dir: &Path) -> io::Result<Vec<BlogPost>> {
    let entries = match fs::read_dir(content_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("content directory {} does not exist", content_dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut posts = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(EXTENSION) {
            continue;
        }

        match BlogPost::parse(&file_name) {
            Some(post) => posts.push(post),
            None => tracing::warn!(file = %file_name, "ignoring post with unexpected name"),
        }
    }

    // Dates lead the file name, so name order is date order
    posts.sort_by(|a, b| b.file_name.cmp(&a.file_name));
    Ok(posts)
}
