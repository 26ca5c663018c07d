// src/export/links.rs
// =============================================================================
// Link discovery for servers that do not report their links.
//
// A server built on RenderContext registers every page link it renders, so
// the driver learns about new pages for free. An arbitrary server does not,
// so in "scraped" mode the driver reads each fetched page itself and
// registers the links it finds.
//
// What counts as a page link:
// - <a href> pointing at the same origin (scheme, host and port)
// - http or https only (no mailto:, tel:, javascript:, #anchors)
// - whose last path segment has no file extension: /about is a page,
//   /files/cv.pdf is a file and belongs in the asset tree instead
//
// Links are returned as root-relative paths ("/about"), the same shape the
// tracker stores. Query strings and fragments are dropped since a static
// file cannot vary by either.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts page links from HTML that stay on the page's origin
//
// Parameters:
//   html:     the fetched page
//   page_url: absolute URL of that page (for resolving relative links)
//
// Returns: root-relative paths in document order (duplicates kept; the
// tracker dedups)
pub fn extract_page_links(html: &str, page_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };
    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_link(page_url, href) else {
            continue;
        };

        if target.origin() == page_url.origin() && is_page_path(target.path()) {
            links.push(target.path().to_string());
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute http(s) URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

fn is_page_path(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or("");
    !last.contains('.')
}
