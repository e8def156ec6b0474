//! HTTP fetcher with browser-like headers and legacy charset support
//!
//! This module wraps a single reqwest client for all crawl fetches:
//! - User-Agent rotation over a small pool of realistic browser strings
//! - Standard Accept/Accept-Language headers
//! - Windows-1252 fallback decoding for legacy sites that omit a charset
//!
//! Certificate validation is disabled so crawls reach hosts with
//! self-signed or expired chains; the fetcher trades transport
//! authenticity for crawl coverage.

use encoding_rs::{UTF_8, WINDOWS_1252};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

use crate::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// A successfully fetched resource (status 200)
#[derive(Debug)]
pub struct FetchedPage {
    /// Content-Type header value, empty when the server sent none
    pub content_type: String,

    /// Decoded response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the server declared an HTML body
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }
}

/// HTTP fetcher shared by all crawl workers
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a new fetcher with the given per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a URL, accepting only status 200.
    ///
    /// # Errors
    ///
    /// - `FetchError::Timeout` when the configured timeout elapses
    /// - `FetchError::Status` for any response status other than 200
    /// - `FetchError::Http` for connection and transport failures
    /// - `FetchError::Decode` when the body defeats charset detection
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;
        let body = Self::decode_bytes(&bytes, &content_type)?;

        Ok(FetchedPage { content_type, body })
    }

    /// Decode bytes to UTF-8 with charset detection
    ///
    /// Strategy:
    /// 1. honor an explicit charset in the Content-Type header
    /// 2. try UTF-8 (most common)
    /// 3. fall back to Windows-1252, the superset legacy sites actually
    ///    mean when they say ISO-8859-1 or say nothing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if decoding fails with all strategies
    pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
        let declared = content_type.to_lowercase();

        if declared.contains("charset=utf-8") {
            return Self::decode_utf8(bytes);
        }

        if declared.contains("charset=iso-8859-1") || declared.contains("charset=windows-1252") {
            return Self::decode_windows_1252(bytes);
        }

        if let Ok(text) = Self::decode_utf8(bytes) {
            if !text.starts_with('\u{FFFD}') {
                return Ok(text);
            }
        }

        Self::decode_windows_1252(bytes)
    }

    /// Decode bytes as UTF-8
    fn decode_utf8(bytes: &[u8]) -> Result<String, FetchError> {
        let (cow, _encoding, had_errors) = UTF_8.decode(bytes);

        if had_errors {
            return Err(FetchError::Decode("UTF-8 decoding errors".to_string()));
        }

        Ok(cow.into_owned())
    }

    /// Decode bytes as Windows-1252
    fn decode_windows_1252(bytes: &[u8]) -> Result<String, FetchError> {
        let (cow, _encoding, had_errors) = WINDOWS_1252.decode(bytes);

        if had_errors {
            return Err(FetchError::Decode("Windows-1252 decoding errors".to_string()));
        }

        Ok(cow.into_owned())
    }

    /// Build browser-like request headers with a rotated User-Agent
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(Self::random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-ES,es;q=0.8,en-US;q=0.5,en;q=0.3"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent() -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = PageFetcher::random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_decode_utf8() {
        let text = "Información general — año 2024";
        let decoded = PageFetcher::decode_bytes(text.as_bytes(), "text/html; charset=utf-8");

        assert_eq!(decoded.unwrap(), text);
    }

    #[test]
    fn test_decode_latin1_declared() {
        // "año" in ISO-8859-1 / Windows-1252
        let bytes: &[u8] = &[0x61, 0xF1, 0x6F];
        let decoded = PageFetcher::decode_bytes(bytes, "text/html; charset=iso-8859-1");

        assert_eq!(decoded.unwrap(), "año");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // Same bytes with no declared charset: invalid UTF-8, so the
        // decoder must fall back to Windows-1252.
        let bytes: &[u8] = &[0x61, 0xF1, 0x6F];
        let decoded = PageFetcher::decode_bytes(bytes, "text/html");

        assert_eq!(decoded.unwrap(), "año");
    }

    #[test]
    fn test_build_headers() {
        let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
        let headers = fetcher.build_headers();

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(PageFetcher::new(Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_is_html() {
        let page = FetchedPage {
            content_type: "text/html; charset=utf-8".to_string(),
            body: String::new(),
        };
        assert!(page.is_html());

        let pdf = FetchedPage {
            content_type: "application/pdf".to_string(),
            body: String::new(),
        };
        assert!(!pdf.is_html());
    }
}
