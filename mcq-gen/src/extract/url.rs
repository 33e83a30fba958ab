//! Fetching source text over HTTP.

use reqwest::header::CONTENT_TYPE;

use crate::error::{McqError, Result};

/// Wrap width for HTML rendering; wide enough that paragraphs stay on one line
const HTML_TEXT_WIDTH: usize = 1000;

/// Fetch a URL and return its body as text.
///
/// HTML pages are rendered to plain text; anything else is returned as-is.
pub async fn fetch_text(url: &str) -> Result<String> {
    let fetch_error = |source| McqError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?;

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));

    let body = response.text().await.map_err(fetch_error)?;
    log::debug!("Fetched {} bytes from {} (html: {})", body.len(), url, is_html);

    if is_html {
        Ok(html_to_text(&body))
    } else {
        Ok(body)
    }
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), HTML_TEXT_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_html_is_rendered_to_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/article");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<html><body><p>The mitochondria is the powerhouse of the cell.</p></body></html>");
            })
            .await;

        let text = fetch_text(&server.url("/article")).await.unwrap();
        assert!(text.contains("The mitochondria is the powerhouse of the cell."));
        assert!(!text.contains("<p>"));
    }

    #[tokio::test]
    async fn test_plain_text_is_returned_verbatim() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/notes.txt");
                then.status(200)
                    .header("content-type", "text/plain")
                    .body("<not html> just text");
            })
            .await;

        let text = fetch_text(&server.url("/notes.txt")).await.unwrap();
        assert_eq!(text, "<not html> just text");
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let err = fetch_text(&server.url("/missing")).await.unwrap_err();
        assert!(matches!(err, McqError::Fetch { .. }));
        assert!(err.is_client_error());
    }
}
