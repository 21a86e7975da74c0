// src/fetch/http.rs
// =============================================================================
// This module downloads pages.
//
// The crawl loop only depends on the Downloader trait, so tests can swap in
// an in-memory site while the binary uses HttpDownloader (reqwest).
//
// A download never fails from the caller's point of view: network errors are
// folded into a Response with status 0 and an error message. The worker then
// treats the page as "no content" and still marks it complete.
//
// Rust concepts:
// - async_trait: Async methods in traits
// - reqwest::Client: Cheap to clone, pools connections internally
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;

use crate::config::Config;

// What a downloader hands back for one URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// HTTP status code, or 0 when no response was received
    pub status: u16,
    /// The URL the content actually came from (after redirects)
    pub url: String,
    pub raw_content: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl Response {
    #[cfg(test)]
    pub fn ok(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            raw_content: Some(body.into()),
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            raw_content: None,
            error: Some(error.into()),
        }
    }

    // The page body, but only for a 200 response that actually has one
    pub fn page_content(&self) -> Option<&[u8]> {
        if self.status == 200 {
            self.raw_content.as_deref()
        } else {
            None
        }
    }
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Response;
}

// Downloads pages over HTTP(S) with reqwest
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Response {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Response::failed(url, 0, describe_error(&e)),
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        match response.bytes().await {
            Ok(body) => Response {
                status,
                url: final_url,
                raw_content: Some(body.to_vec()),
                error: None,
            },
            Err(e) => Response::failed(final_url, status, describe_error(&e)),
        }
    }
}

// Short, log-friendly description of a reqwest failure
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_content_requires_200() {
        let ok = Response::ok("https://cs.uci.edu/", "<p>hi</p>");
        assert_eq!(ok.page_content(), Some(&b"<p>hi</p>"[..]));

        let not_found = Response {
            status: 404,
            url: "https://cs.uci.edu/gone".to_string(),
            raw_content: Some(b"missing".to_vec()),
            error: None,
        };
        assert_eq!(not_found.page_content(), None);

        let failed = Response::failed("https://cs.uci.edu/", 0, "connection failed");
        assert_eq!(failed.page_content(), None);
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpDownloader::new(&Config::default()).is_ok());
    }
}
