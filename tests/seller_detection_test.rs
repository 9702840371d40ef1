/// Seller detection on saved product pages.
use return_scout::scraping::document::PageDocument;
use return_scout::seller;
use url::Url;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
}

fn page(name: &str, url: &str) -> PageDocument {
    PageDocument::parse(&fixture(name), Some(Url::parse(url).unwrap()))
}

#[test]
fn test_marketplace_sold_pages() {
    for (name, url) in [
        ("amazon-com-free-returns.html", "https://www.amazon.com/dp/B0MOUSE"),
        ("amazon-de-free-returns.html", "https://www.amazon.de/dp/B0MOUSE"),
        ("amazon-com-no-return-info.html", "https://www.amazon.com/dp/B0BOTTLE"),
    ] {
        let identity = seller::detect(&page(name, url));
        assert!(!identity.is_third_party, "{name}");
        assert!(identity.seller_link.is_none(), "{name}");
        assert!(identity.seller_id.is_none(), "{name}");
    }
}

#[test]
fn test_third_party_from_shop_link() {
    let identity = seller::detect(&page(
        "amazon-com-paid-returns.html",
        "https://www.amazon.com/dp/B0LAMP",
    ));
    assert!(identity.is_third_party);
    assert_eq!(identity.seller_name.as_deref(), Some("ThirdPartyStore"));
    assert_eq!(identity.seller_id.as_deref(), Some("A1234567890"));
    let link = identity.seller_link.unwrap();
    assert!(link.starts_with("https://www.amazon.com/"));
    assert!(link.contains("/shops/A1234567890"));
}

#[test]
fn test_third_party_from_seller_param() {
    let identity = seller::detect(&page(
        "amazon-com-third-party-free.html",
        "https://www.amazon.com/dp/B0CABLE",
    ));
    assert!(identity.is_third_party);
    assert_eq!(identity.seller_name.as_deref(), Some("BestElectronicsStore"));
    assert_eq!(identity.seller_id.as_deref(), Some("A1BESTSELLER123"));
}

#[test]
fn test_seller_id_from_page_url_when_block_has_no_link() {
    let p = PageDocument::parse(
        r#"<div id="merchant-info">Ships from and sold by Gadget Corner.</div>"#,
        Some(Url::parse("https://www.amazon.com/dp/B0X?smid=A9GADGET&psc=1").unwrap()),
    );
    let identity = seller::detect(&p);
    assert!(identity.is_third_party);
    assert_eq!(identity.seller_id.as_deref(), Some("A9GADGET"));
    assert_eq!(
        identity.seller_link.as_deref(),
        Some("https://www.amazon.com/sp?seller=A9GADGET")
    );
    assert_eq!(
        identity.seller_name.as_deref(),
        Some("Ships from and sold by Gadget Corner.")
    );
}
