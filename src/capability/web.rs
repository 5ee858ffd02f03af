// SPDX-License-Identifier: MIT

//! Page fetch over HTTP, with the visible body text extracted from HTML

use super::PageFetcher;
use crate::error::CapabilityError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

const PROVIDER: &str = "web";

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("revision-loop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String, CapabilityError> {
        let resp = self.client.get(url.clone()).send().await?;

        if !resp.status().is_success() {
            return Err(CapabilityError::api(
                PROVIDER,
                format!("GET {} returned {}", url, resp.status()),
            ));
        }

        let is_html = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        let body = resp.text().await?;
        log::info!("Fetched {} ({} bytes)", url, body.len());

        if is_html {
            html_to_text(&body)
        } else {
            Ok(body)
        }
    }
}

/// Visible text of `<body>` (or the whole document if there is none)
pub fn html_to_text(html: &str) -> Result<String, CapabilityError> {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body")
        .map_err(|e| CapabilityError::InvalidResponse(format!("selector: {:?}", e)))?;

    let text = match document.select(&body_selector).next() {
        Some(body) => extract_text(&body),
        None => extract_text(&document.root_element()),
    };

    Ok(clean_text(&text))
}

fn extract_text(element: &ElementRef) -> String {
    let mut output = Vec::new();

    for node in element.descendants() {
        if let Some(text) = node.value().as_text() {
            let skipped = node
                .parent()
                .and_then(|p| p.value().as_element().map(|el| el.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            let trimmed = text.trim();
            if !skipped && !trimmed.is_empty() {
                output.push(trimmed.to_string());
            }
        } else if let Some(el) = node.value().as_element() {
            if matches!(
                el.name(),
                "p" | "div" | "br" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr"
            ) {
                output.push("\n".to_string());
            }
        }
    }

    output.join(" ")
}

/// Collapse runs of whitespace, keeping single line breaks
fn clean_text(text: &str) -> String {
    let mut result = String::new();
    let mut prev_was_whitespace = false;
    let mut prev_was_newline = false;

    for ch in text.chars() {
        if ch == '\n' {
            if !prev_was_newline {
                if prev_was_whitespace && result.ends_with(' ') {
                    result.pop();
                }
                result.push('\n');
            }
            prev_was_newline = true;
            prev_was_whitespace = true;
        } else if ch.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
            }
            prev_was_whitespace = true;
        } else {
            result.push(ch);
            prev_was_whitespace = false;
            prev_was_newline = false;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_reads_body() {
        let html = r#"<html><head><title>T</title></head>
            <body><h1>Chapter 1</h1><p>Hello   world</p></body></html>"#;
        let text = html_to_text(html).unwrap();
        assert!(text.starts_with("Chapter 1"));
        assert!(text.contains("Hello world"));
    }

    #[test]
    fn test_html_to_text_skips_scripts() {
        let html = "<body><script>var x = 1;</script><style>p{}</style><p>Visible</p></body>";
        let text = html_to_text(html).unwrap();
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a   b \n\n\n c  "), "a b\nc");
    }
}
