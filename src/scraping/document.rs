use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

/// A parsed page plus the URL it was loaded from.
///
/// Every query is guarded: a selector that fails to parse or matches nothing
/// yields an empty result, never an error.
pub struct PageDocument {
    html: Html,
    url: Option<Url>,
}

impl PageDocument {
    pub fn parse(markup: &str, url: Option<Url>) -> Self {
        Self {
            html: Html::parse_document(markup),
            url,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.as_ref().and_then(|u| u.host_str())
    }

    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                warn!("document: invalid selector {:?}: {}", selector, e);
                Vec::new()
            }
        }
    }

    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        self.select_all(selector).into_iter().next()
    }

    pub fn exists(&self, selector: &str) -> bool {
        self.select_first(selector).is_some()
    }

    pub fn lang_attr(&self) -> Option<&str> {
        self.select_first("html")
            .and_then(|el| el.value().attr("lang"))
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn body_text(&self) -> String {
        self.select_first("body")
            .map(|b| element_text(&b))
            .unwrap_or_default()
    }

    /// First value of a query parameter on the page URL.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url.as_ref().and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        })
    }

    /// Absolute form of an `href`, or the raw value when there is no base.
    pub fn resolve_href(&self, href: &str) -> String {
        match self.url.as_ref().map(|base| base.join(href)) {
            Some(Ok(abs)) => abs.to_string(),
            _ => href.to_string(),
        }
    }
}

/// Concatenated text of an element and its descendants.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Text with runs of whitespace collapsed to single spaces.
pub fn collapsed_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `a[href]` at or below `el`.
pub fn first_anchor<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if el.value().name() == "a" && el.value().attr("href").is_some() {
        return Some(*el);
    }
    let sel = Selector::parse("a[href]").ok()?;
    el.select(&sel).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selector_is_empty() {
        let page = PageDocument::parse("<div>x</div>", None);
        assert!(page.select_all("div[[").is_empty());
        assert!(!page.exists("#missing"));
    }

    #[test]
    fn test_query_param_and_href_resolution() {
        let url = Url::parse("https://www.amazon.com/dp/B00TEST?smid=A2SELLER&th=1").unwrap();
        let page = PageDocument::parse("<html></html>", Some(url));
        assert_eq!(page.query_param("smid").as_deref(), Some("A2SELLER"));
        assert!(page.query_param("seller").is_none());
        assert_eq!(
            page.resolve_href("/shops/A1234567890"),
            "https://www.amazon.com/shops/A1234567890"
        );
        assert_eq!(page.host(), Some("www.amazon.com"));
    }

    #[test]
    fn test_collapsed_text() {
        let page = PageDocument::parse("<p>  Sold   by\n <b>Shop</b> </p>", None);
        let p = page.select_first("p").unwrap();
        assert_eq!(collapsed_text(&p), "Sold by Shop");
    }

    #[test]
    fn test_first_anchor_on_anchor_itself() {
        let page = PageDocument::parse(
            r#"<a id="sellerProfileTriggerId" href="/sp?seller=A9">Shop</a>"#,
            None,
        );
        let el = page.select_first("#sellerProfileTriggerId").unwrap();
        let a = first_anchor(&el).unwrap();
        assert_eq!(a.value().attr("href"), Some("/sp?seller=A9"));
    }
}
