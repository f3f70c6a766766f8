//! Input fetching: download the document behind a URL into memory.
//!
//! Only the download is bounded by the caller's timeout; conversion and
//! model calls run without one. A non-2xx status is treated as a download
//! failure so the request stops before any conversion starts.

use crate::config::ServiceConfig;
use crate::error::MenuError;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};

/// A downloaded document.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub bytes: Vec<u8>,
    /// Raw `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Build the shared HTTP client used for downloads.
///
/// In development mode every request goes through the configured proxy.
pub fn build_client(config: &ServiceConfig) -> Result<reqwest::Client, MenuError> {
    let mut builder = reqwest::Client::builder();

    if let Some(proxy_url) = config.active_proxy() {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            MenuError::InvalidConfig(format!("Invalid proxy '{}': {}", proxy_url, e))
        })?;
        info!("Development mode: routing downloads through {}", proxy_url);
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| MenuError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Download `url` with a timeout of `timeout_secs` seconds.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<FetchedDocument, MenuError> {
    validate_url(url)?;
    info!("Downloading document from: {}", url);

    let timeout_err = || MenuError::DownloadTimeout {
        url: url.to_string(),
        secs: timeout_secs,
    };
    let failed = |e: reqwest::Error| MenuError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let response = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await
        .map_err(|e| if e.is_timeout() { timeout_err() } else { failed(e) })?;

    if !response.status().is_success() {
        return Err(MenuError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| if e.is_timeout() { timeout_err() } else { failed(e) })?;

    debug!(
        "Downloaded {} bytes (Content-Type: {:?})",
        bytes.len(),
        content_type
    );

    Ok(FetchedDocument {
        url: url.to_string(),
        bytes: bytes.to_vec(),
        content_type,
    })
}

fn validate_url(input: &str) -> Result<(), MenuError> {
    if !is_url(input) {
        return Err(MenuError::InvalidUrl {
            input: input.to_string(),
            reason: "not an HTTP/HTTPS URL".to_string(),
        });
    }
    reqwest::Url::parse(input).map_err(|e| MenuError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/menu.pdf"));
        assert!(is_url("http://example.com/menu.pdf"));
        assert!(!is_url("/tmp/menu.pdf"));
        assert!(!is_url("ftp://example.com/menu.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn malformed_urls_rejected() {
        assert!(matches!(
            validate_url("menu.pdf"),
            Err(MenuError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("http://"),
            Err(MenuError::InvalidUrl { .. })
        ));
        assert!(validate_url("https://example.com/menu.pdf").is_ok());
    }

    #[test]
    fn client_builds_with_and_without_proxy() {
        let plain = ServiceConfig::default();
        assert!(build_client(&plain).is_ok());

        let dev = ServiceConfig::builder().development(true).build().unwrap();
        assert!(build_client(&dev).is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_download_error() {
        let client = reqwest::Client::new();
        // Port 9 (discard) on localhost is almost never listening.
        let err = fetch(&client, "http://127.0.0.1:9/menu.pdf", 2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Download);
    }
}
