// src/crawl/fetch.rs
// =============================================================================
// Fetches a single page and sorts failures into FetchFailure variants.
//
// A failed page is never fatal: the crawler records the failure and moves
// on, treating the page as having no links.
//
// The HTTP status does not decide success. Error pages (a soft 404, a 500
// with the site's usual nav and footer) still carry links, so their bodies
// are parsed like any other page and the status is only reported.
// =============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use super::links::LinkMap;
use crate::error::FetchFailure;

// Result of visiting one page
#[derive(Debug)]
pub enum PageOutcome {
    /// Page was fetched and parsed. The map may be empty.
    Links { links: LinkMap, status: u16 },
    /// Page could not be fetched or was not HTML
    Failed(FetchFailure),
}

// A fetched HTML body and the status it came with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub html: String,
}

// Fetches a web page and returns its HTML content
//
// Responses that declare a non-HTML content type are failures. A missing
// Content-Type header is accepted as HTML.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, FetchFailure> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(categorize_error)?;

    let status = response.status().as_u16();

    if let Some(content_type) = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        if !is_html_content_type(content_type) {
            return Err(FetchFailure::NotHtml(content_type.to_string()));
        }
    }

    let html = response
        .text()
        .await
        .map_err(|e| FetchFailure::Body(e.to_string()))?;

    Ok(FetchedPage { status, html })
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

// Maps reqwest errors onto FetchFailure
fn categorize_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect(error.to_string())
    } else if error.is_body() || error.is_decode() {
        FetchFailure::Body(error.to_string())
    } else {
        FetchFailure::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("text/plain"));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/", server.uri())).unwrap();
        let page = fetch_page(&client(), &url).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.html, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_error_status_body_still_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"<a href="/privacy">Privacy</a>"#, "text/html"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let page = fetch_page(&client(), &url).await.unwrap();
        assert_eq!(page.status, 404);
        assert!(page.html.contains("/privacy"));
    }

    #[tokio::test]
    async fn test_non_html_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/file.pdf", server.uri())).unwrap();
        let result = fetch_page(&client(), &url).await;
        assert!(matches!(result, Err(FetchFailure::NotHtml(_))));
    }

    #[tokio::test]
    async fn test_timeout_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>slow</p>", "text/html")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let result = fetch_page(&client, &url).await;
        assert_eq!(result, Err(FetchFailure::Timeout));
    }
}
