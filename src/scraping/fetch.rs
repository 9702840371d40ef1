use crate::antibot;
use crate::core::{ScoutError, ScoutResult};
use crate::types::Language;
use reqwest::Client;
use tracing::info;
use url::Url;

/// Validate a page URL; only http(s) is fetched.
pub fn parse_page_url(url: &str) -> ScoutResult<Url> {
    let parsed = Url::parse(url).map_err(|source| ScoutError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ScoutError::UnsupportedScheme(url.to_string()));
    }
    Ok(parsed)
}

/// GET a page with browser-like headers and return its markup.
///
/// Non-2xx answers are errors; the body of an error page is never parsed.
pub async fn fetch_html(client: &Client, url: &str, language: Language) -> ScoutResult<String> {
    let parsed = parse_page_url(url)?;
    info!("fetch: GET {}", parsed);

    let mut request = client.get(parsed.as_str());
    for (name, value) in antibot::browser_headers(language) {
        request = request.header(name, value);
    }

    let response = request.send().await.map_err(|source| ScoutError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScoutError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ScoutError::Http {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_schemes() {
        assert!(matches!(
            parse_page_url("ftp://amazon.com/sp?seller=A1"),
            Err(ScoutError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_page_url("not a url"),
            Err(ScoutError::InvalidUrl { .. })
        ));
        assert!(parse_page_url("https://www.amazon.de/sp?seller=A1").is_ok());
    }
}
