//! Job-description acquisition — scrapes a posting URL for its description block.
//!
//! Every failure here is non-fatal: the orchestrator reports it as an inline
//! notice and falls back to whatever the user typed.

use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

/// Job boards tend to refuse unadorned library user agents, so the fetch
/// identifies as a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.66 Safari/537.36";

/// The postings we target carry their text in a `<div class="description">`.
const DESCRIPTION_SELECTOR: &str = "div.description";

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("HTTP error occurred: status {0}")]
    Status(u16),

    #[error("Request error occurred: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Job description not found on the page. Please check the link.")]
    NotFound,
}

/// Fetches `link` and extracts the first description element's stripped text.
///
/// The client is expected to carry [`BROWSER_USER_AGENT`]; it is built once
/// at startup and shared across submits.
pub async fn scrape_job_description(
    client: &Client,
    link: &str,
) -> Result<String, AcquisitionError> {
    debug!("Fetching job posting: {link}");

    let response = client.get(link).send().await?;
    let status = response.status();
    debug!("Job posting response status: {status}");

    if !status.is_success() {
        return Err(AcquisitionError::Status(status.as_u16()));
    }

    let html = response.text().await?;
    extract_description(&html).ok_or(AcquisitionError::NotFound)
}

/// Pulls the stripped text of the first `div.description` element, or `None`
/// when the element is missing or carries no text.
pub fn extract_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(DESCRIPTION_SELECTOR).expect("static selector is valid");

    let element = document.select(&selector).next()?;
    let text = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_extracts_first_description_element() {
        let html = r#"
            <html><body>
                <div class="header">Acme Corp</div>
                <div class="description">
                    <p>Seeking a Rust developer</p>
                    <p>3+ years experience</p>
                </div>
                <div class="description">second block is ignored</div>
            </body></html>
        "#;

        let text = extract_description(html).unwrap();
        assert_eq!(text, "Seeking a Rust developer 3+ years experience");
    }

    #[test]
    fn test_missing_description_element_yields_none() {
        let html = r#"<html><body><div class="job-body">text</div></body></html>"#;
        assert_eq!(extract_description(html), None);
    }

    #[test]
    fn test_empty_description_element_yields_none() {
        let html = r#"<html><body><div class="description">   </div></body></html>"#;
        assert_eq!(extract_description(html), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n")
                .await;
        });

        let client = Client::new();
        let err = scrape_job_description(&client, &format!("http://{addr}/job"))
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Status(404)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_request_error() {
        // Nothing listens on the discard port; connection is refused.
        let client = Client::new();
        let err = scrape_job_description(&client, "http://127.0.0.1:9/job")
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Request(_)));
    }
}
