//! Return policy from a third-party seller's storefront page.

use super::document::{element_text, PageDocument};
use super::fetch::fetch_html;
use super::inference::{classify_block, Polarity};
use super::{patterns, selectors};
use crate::types::{EvidenceKind, Language, ReturnPolicyVerdict, ScanStep};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

/// What a seller's storefront says about returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontPolicy {
    /// A returns section was found and read.
    Found(ReturnPolicyVerdict),
    /// The storefront says its items cannot be returned.
    NotReturnable,
    /// Fetch failed, or the page has no returns section.
    Unavailable,
}

impl StorefrontPolicy {
    pub fn into_verdict(self) -> Option<ReturnPolicyVerdict> {
        match self {
            StorefrontPolicy::Found(verdict) => Some(verdict),
            _ => None,
        }
    }
}

/// Where seller verdicts come from. Failures are absorbed into
/// [`StorefrontPolicy::Unavailable`], never an error.
#[async_trait]
pub trait SellerPolicySource: Send + Sync {
    async fn fetch(
        &self,
        seller_link: &str,
        language: Language,
        default_window: u32,
    ) -> StorefrontPolicy;
}

/// Fetches the storefront over HTTP and reads its returns section.
#[derive(Clone)]
pub struct HttpSellerPolicySource {
    client: Client,
}

impl HttpSellerPolicySource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SellerPolicySource for HttpSellerPolicySource {
    async fn fetch(
        &self,
        seller_link: &str,
        language: Language,
        default_window: u32,
    ) -> StorefrontPolicy {
        let html = match fetch_html(&self.client, seller_link, language).await {
            Ok(html) => html,
            Err(e) => {
                warn!("seller_policy: fetch failed for {}: {}", seller_link, e);
                return StorefrontPolicy::Unavailable;
            }
        };
        let policy = parse_seller_policy(&html, default_window);
        info!(
            "seller_policy: {} → {}",
            seller_link,
            match &policy {
                StorefrontPolicy::Found(_) => "policy found",
                StorefrontPolicy::NotReturnable => "not returnable",
                StorefrontPolicy::Unavailable => "no returns section",
            }
        );
        policy
    }
}

/// Read a storefront page. Without any returns section there is no verdict.
///
/// Once a section is found the seller is assumed to take free returns unless
/// the section says the buyer pays.
pub fn parse_seller_policy(html: &str, default_window: u32) -> StorefrontPolicy {
    let page = PageDocument::parse(html, None);
    let sections: Vec<String> = page
        .select_all(selectors::ALL_ELEMENTS)
        .iter()
        .map(element_text)
        .filter(|text| patterns::contains_section_heading(text))
        .collect();

    if sections.is_empty() {
        debug!("seller_policy: no returns section in {} bytes", html.len());
        return StorefrontPolicy::Unavailable;
    }

    let mut free = true;
    let mut cost = None;
    let mut window = default_window;

    for text in &sections {
        for evidence in classify_block(text, ScanStep::SellerSection, Polarity::FreeFirst) {
            match evidence.kind {
                EvidenceKind::NonReturnable => {
                    debug!("seller_policy: storefront says items are not returnable");
                    return StorefrontPolicy::NotReturnable;
                }
                EvidenceKind::FreeReturns => free = true,
                EvidenceKind::BuyerPays { cost: token } => {
                    free = false;
                    if token.is_some() {
                        cost = token;
                    }
                }
                EvidenceKind::Window { days } => window = days,
                EvidenceKind::PolicySection => {}
            }
        }
    }

    StorefrontPolicy::Found(ReturnPolicyVerdict::third_party(free, cost, window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_section_abstains() {
        let html = "<html><body><h1>Welcome to our shop</h1><p>Great prices.</p></body></html>";
        assert_eq!(parse_seller_policy(html, 30), StorefrontPolicy::Unavailable);
    }

    #[test]
    fn test_section_defaults_to_free() {
        let html = r#"<html><body><div><h2>Return Policy</h2><p>Items can be sent back within 60 day returns period.</p></div></body></html>"#;
        let verdict = parse_seller_policy(html, 30).into_verdict().unwrap();
        assert!(verdict.regular_return_free);
        assert!(verdict.is_third_party_seller);
        assert_eq!(verdict.return_window_days, 60);
        assert!(!verdict.is_estimate);
    }

    #[test]
    fn test_buyer_pays_in_section() {
        let html = r#"<html><body><section><h3>Rückgaberecht</h3><p>Der Käufer zahlt die Rücksendekosten von €4,90. Rückgabe innerhalb von 30 Tagen.</p></section></body></html>"#;
        let verdict = parse_seller_policy(html, 14).into_verdict().unwrap();
        assert!(!verdict.regular_return_free);
        assert_eq!(verdict.regular_return_cost.as_deref(), Some("€4,90"));
        assert_eq!(verdict.return_window_days, 30);
        assert!(verdict.defective_policy.free);
    }

    #[test]
    fn test_non_returnable_section_abstains() {
        let html = r#"<html><body><div>Returns policy: all sales are final.</div></body></html>"#;
        assert_eq!(parse_seller_policy(html, 30), StorefrontPolicy::NotReturnable);

        let html = r#"<html><body><div><h3>Return policy</h3><p>Free returns within 30 days.</p></div><p>Return policy: items cannot be returned.</p></body></html>"#;
        assert_eq!(parse_seller_policy(html, 30), StorefrontPolicy::NotReturnable);
    }
}
