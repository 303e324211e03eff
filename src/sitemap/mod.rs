//! Sitemap retrieval and parsing
//!
//! A sitemap is consumed only for its `<urlset><url><loc>` entries; every
//! other element is skipped. Fetch and parse failures are fatal for the
//! submitting job, so they surface as errors here rather than degraded
//! data.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while retrieving or parsing a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Sitemap {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse sitemap: {0}")]
    Parse(String),
}

/// Fetches a sitemap document and extracts its target URLs in order
pub async fn fetch_sitemap(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<String>, SitemapError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SitemapError::Http {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SitemapError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| SitemapError::Http {
        url: url.to_string(),
        source: e,
    })?;

    parse_sitemap(&body)
}

/// Parses sitemap XML into the ordered list of `<loc>` values.
///
/// Namespace prefixes are ignored; only the element local names matter.
/// The document must be rooted at `<urlset>`.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut saw_root = false;
    let mut in_url = false;
    let mut in_loc = false;
    let mut loc_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = name.local_name();
                if !saw_root {
                    if local.as_ref() != b"urlset" {
                        return Err(SitemapError::Parse(format!(
                            "expected <urlset> root, found <{}>",
                            String::from_utf8_lossy(local.as_ref())
                        )));
                    }
                    saw_root = true;
                } else if local.as_ref() == b"url" {
                    in_url = true;
                } else if in_url && local.as_ref() == b"loc" {
                    in_loc = true;
                    loc_text.clear();
                }
            }
            Ok(Event::Text(t)) if in_loc => {
                let text = t
                    .unescape()
                    .map_err(|e| SitemapError::Parse(e.to_string()))?;
                loc_text.push_str(&text);
            }
            Ok(Event::CData(t)) if in_loc => {
                loc_text.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = name.local_name();
                if local.as_ref() == b"loc" && in_loc {
                    let trimmed = loc_text.trim();
                    if !trimmed.is_empty() {
                        urls.push(trimmed.to_string());
                    }
                    in_loc = false;
                } else if local.as_ref() == b"url" {
                    in_url = false;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SitemapError::Parse(e.to_string())),
        }
    }

    if !saw_root {
        return Err(SitemapError::Parse("document has no root element".to_string()));
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_sitemap() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>https://example.com/</loc><priority>1.0</priority></url>
                <url><loc>https://example.com/about</loc></url>
                <url><loc>https://example.com/contact</loc></url>
            </urlset>"#;

        let urls = parse_sitemap(xml).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/contact",
            ]
        );
    }

    #[test]
    fn test_parse_preserves_document_order() {
        let xml = r#"<urlset>
            <url><loc>https://example.com/c</loc></url>
            <url><loc>https://example.com/a</loc></url>
            <url><loc>https://example.com/b</loc></url>
        </urlset>"#;

        let urls = parse_sitemap(xml).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b",
            ]
        );
    }

    #[test]
    fn test_parse_empty_urlset() {
        let urls = parse_sitemap("<urlset></urlset>").unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_parse_ignores_loc_outside_url() {
        // sitemap-index style <sitemap><loc> entries are not targets
        let xml = r#"<urlset>
            <sitemap><loc>https://example.com/other.xml</loc></sitemap>
            <url><loc>https://example.com/page</loc></url>
        </urlset>"#;

        let urls = parse_sitemap(xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_parse_namespaced_elements() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sm:url><sm:loc>https://example.com/page</sm:loc></sm:url>
        </sm:urlset>"#;

        let urls = parse_sitemap(xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_parse_rejects_wrong_root() {
        let err = parse_sitemap("<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, SitemapError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let err = parse_sitemap("<urlset><url><loc>https://x</url></urlset>").unwrap_err();
        assert!(matches!(err, SitemapError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_non_xml() {
        assert!(parse_sitemap("just some text").is_err());
    }

    #[test]
    fn test_parse_skips_empty_loc() {
        let xml = r#"<urlset>
            <url><loc>   </loc></url>
            <url><loc>https://example.com/page</loc></url>
        </urlset>"#;

        let urls = parse_sitemap(xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/page"]);
    }
}
