//! The page an evaluation runs against.

use std::sync::Mutex;

use url::Url;

use crate::features::widget::{find_injection_point, RenderedWidget};
use crate::scraping::document::PageDocument;
use crate::scraping::selectors;

/// A live page: something that can be re-read while it renders and can take
/// a badge. Snapshots are fresh parses and must not be held across awaits.
pub trait PageHost: Send + Sync {
    fn url(&self) -> &Url;

    fn snapshot(&self) -> PageDocument;

    /// True when a badge from any earlier evaluation is already on the page.
    fn has_widget(&self) -> bool;

    /// Place the badge. Returns the selector it was placed after, or `None`
    /// when the page has no usable injection point.
    fn inject(&self, widget: RenderedWidget) -> Option<&'static str>;
}

/// A saved page. Injection is recorded rather than written into the markup.
#[derive(Debug)]
pub struct StaticPage {
    url: Url,
    html: String,
    injected: Mutex<Option<RenderedWidget>>,
}

impl StaticPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
            injected: Mutex::new(None),
        }
    }

    pub fn injected(&self) -> Option<RenderedWidget> {
        self.injected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PageHost for StaticPage {
    fn url(&self) -> &Url {
        &self.url
    }

    fn snapshot(&self) -> PageDocument {
        PageDocument::parse(&self.html, Some(self.url.clone()))
    }

    fn has_widget(&self) -> bool {
        if self.injected().is_some() {
            return true;
        }
        let page = self.snapshot();
        selectors::INJECTED_WIDGET_IDS
            .iter()
            .any(|sel| page.exists(sel))
    }

    fn inject(&self, widget: RenderedWidget) -> Option<&'static str> {
        let point = find_injection_point(&self.snapshot())?;
        *self
            .injected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(widget);
        Some(point)
    }
}
