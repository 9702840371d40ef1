//! Who sells the listing: the marketplace itself or a third party.

use super::document::{collapsed_text, element_text, first_anchor, PageDocument};
use super::selectors;
use crate::types::{seller_page_url, SellerIdentity};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static MARKETPLACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Amazon\.com|Amazon\.de|Amazon\s*$").expect("valid marketplace name regex")
});

static BRAND_STORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Visit the .+ Store|Besuchen Sie den .+-Store")
        .expect("valid brand store regex")
});

static SELLER_ID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)seller=([A-Z0-9]+)").expect("valid seller id regex"));

static SELLER_ID_SHOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)shops/([A-Z0-9]+)").expect("valid shop id regex"));

/// Query parameters that carry a seller id on a product URL.
const SELLER_QUERY_PARAMS: &[&str] = &["smid", "seller"];

fn looks_like_seller_link(href: &str) -> bool {
    href.contains("/sp?seller=") || href.contains("/shops/") || href.contains("seller=")
}

/// Seller id embedded in a storefront link.
pub fn seller_id_from_link(link: &str) -> Option<String> {
    SELLER_ID_PARAM
        .captures(link)
        .or_else(|| SELLER_ID_SHOP.captures(link))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Inspect the byline and merchant blocks. Pages without any of them are
/// treated as sold by the marketplace.
pub fn detect(page: &PageDocument) -> SellerIdentity {
    let Some(block) = selectors::SELLER_BLOCKS
        .iter()
        .find_map(|sel| page.select_first(sel))
    else {
        debug!("seller: no merchant block, assuming marketplace-sold");
        return SellerIdentity::marketplace();
    };

    let text = element_text(&block);
    if MARKETPLACE_NAME.is_match(text.trim_end()) || BRAND_STORE.is_match(&text) {
        debug!("seller: marketplace or brand storefront byline");
        return SellerIdentity::marketplace();
    }

    let anchor = first_anchor(&block);
    let mut seller_link = anchor
        .and_then(|a| a.value().attr("href"))
        .map(|href| page.resolve_href(href))
        .or_else(|| {
            page.select_all(selectors::ANCHORS)
                .into_iter()
                .filter_map(|a| a.value().attr("href"))
                .find(|href| looks_like_seller_link(href))
                .map(|href| page.resolve_href(href))
        });

    let mut seller_id = seller_link.as_deref().and_then(seller_id_from_link);

    if seller_id.is_none() {
        if let Some(id) = SELLER_QUERY_PARAMS.iter().find_map(|p| page.query_param(p)) {
            if let Some(host) = page.host() {
                seller_link = Some(seller_page_url(host, &id));
            }
            seller_id = Some(id);
        }
    }

    let seller_name = anchor
        .map(|a| collapsed_text(&a))
        .filter(|n| !n.is_empty())
        .or_else(|| Some(collapsed_text(&block)).filter(|n| !n.is_empty()));

    debug!(
        "seller: third-party {:?} (id {:?}, link {:?})",
        seller_name, seller_id, seller_link
    );

    SellerIdentity {
        is_third_party: true,
        seller_id,
        seller_link,
        seller_name,
    }
}
