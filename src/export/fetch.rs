// src/export/fetch.rs
// =============================================================================
// Fetches rendered pages from the render server.
//
// Every request carries the marker header, which tells the server "this
// render is part of an export, register the links you emit". Only one
// request is ever in flight: the driver awaits each fetch before popping
// the next URL.
//
// Failures are sorted into a FetchFailure so the driver (and the report)
// can say *why* a page is missing, not just that it is.
// =============================================================================

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{ExportError, FetchFailure};
use crate::tracker::MARKER_HEADER;

/// Scheme and host of the server being exported, e.g. `http` + `localhost:5000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    // Parses an origin out of a full URL
    //
    // Example: "http://localhost:5000/anything" -> http + localhost:5000
    pub fn parse(input: &str) -> Result<Self, ExportError> {
        let invalid = |reason: String| ExportError::InvalidOrigin {
            origin: input.to_string(),
            reason,
        };

        let url = Url::parse(input).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("URL has no host".to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self::new(url.scheme(), host))
    }

    /// The origin as a base URL, e.g. `http://localhost:5000/`.
    pub fn base_url(&self) -> Result<Url, ExportError> {
        let raw = format!("{}://{}/", self.scheme, self.host);
        let url = Url::parse(&raw).map_err(|e| ExportError::InvalidOrigin {
            origin: self.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ExportError::InvalidOrigin {
                origin: self.to_string(),
                reason: "only http and https origins can be exported".to_string(),
            });
        }
        Ok(url)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// HTTP client bound to one origin, sending the marker header on every request.
pub struct PageFetcher {
    client: Client,
    base: Url,
}

impl PageFetcher {
    pub fn new(origin: &Origin, timeout: Duration) -> Result<Self, ExportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(MARKER_HEADER),
            HeaderValue::from_static("true"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base: origin.base_url()?,
        })
    }

    // Resolves a root-relative page URL against the origin
    //
    // Example: base "http://localhost:5000/" + "/posts/a" -> "http://localhost:5000/posts/a"
    //
    // Protocol-relative URLs ("//other-host/x", "/\other-host/x") would leave
    // the origin when joined and are rejected
    pub fn absolute_url(&self, url: &str) -> Result<Url, ExportError> {
        let invalid = |reason: String| ExportError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        if !url.starts_with('/') || url.starts_with("//") {
            return Err(invalid("page URLs must be root-relative paths".to_string()));
        }

        let absolute = self.base.join(url).map_err(|e| invalid(e.to_string()))?;
        if absolute.origin() != self.base.origin() {
            return Err(invalid(format!(
                "resolves outside the exported origin {}",
                self.base.origin().ascii_serialization()
            )));
        }
        Ok(absolute)
    }

    // Fetches one page
    //
    // Returns: the raw response body, or a FetchFailure describing what went wrong
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(categorize_error)?;
        Ok(body.to_vec())
    }
}

// Sorts reqwest errors into the failure kinds we report
fn categorize_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        FetchFailure::Status(status.as_u16())
    } else {
        FetchFailure::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn;
    use axum::routing::get;
    use axum::Router;

    #[test]
    fn origin_from_url_keeps_port() {
        let origin = Origin::parse("http://localhost:5000/some/page").unwrap();
        assert_eq!(origin, Origin::new("http", "localhost:5000"));
        assert_eq!(origin.to_string(), "http://localhost:5000");
    }

    #[test]
    fn origin_without_port() {
        let origin = Origin::parse("https://example.com").unwrap();
        assert_eq!(origin.host, "example.com");
    }

    #[test]
    fn non_http_origins_are_rejected() {
        let origin = Origin::new("ftp", "example.com");
        assert!(matches!(
            origin.base_url(),
            Err(ExportError::InvalidOrigin { .. })
        ));
    }

    #[test]
    fn garbage_origin_is_rejected() {
        assert!(Origin::parse("not a url").is_err());
    }

    #[test]
    fn page_urls_resolve_against_origin() {
        let fetcher =
            PageFetcher::new(&Origin::new("http", "127.0.0.1:8080"), Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            fetcher.absolute_url("/posts/2024/01/02/hello").unwrap().as_str(),
            "http://127.0.0.1:8080/posts/2024/01/02/hello"
        );
        assert_eq!(
            fetcher.absolute_url("/").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
    }

    #[test]
    fn urls_leaving_the_origin_are_rejected() {
        let fetcher =
            PageFetcher::new(&Origin::new("http", "127.0.0.1:8080"), Duration::from_secs(1))
                .unwrap();
        for url in ["//other-host/x", "/\\other-host/x", "http://other-host/x", "posts/a"] {
            assert!(
                matches!(fetcher.absolute_url(url), Err(ExportError::InvalidUrl { .. })),
                "{} should be rejected",
                url
            );
        }
    }

    #[tokio::test]
    async fn slow_page_is_a_timeout() {
        let router = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let origin = spawn(router).await;
        let fetcher = PageFetcher::new(&origin, Duration::from_secs(1)).unwrap();

        let url = fetcher.absolute_url("/").unwrap();
        let failure = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(failure, FetchFailure::Timeout));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connect_failure() {
        // Bind and drop a listener to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let fetcher = PageFetcher::new(
            &Origin::new("http", format!("127.0.0.1:{}", port)),
            Duration::from_secs(2),
        )
        .unwrap();

        let url = fetcher.absolute_url("/").unwrap();
        let failure = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(failure, FetchFailure::Connect(_)));
    }
}
