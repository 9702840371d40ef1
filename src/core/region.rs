//! Marketplace and page-language detection.

use crate::core::config::ScoutConfig;
use crate::scraping::document::PageDocument;
use crate::types::{Language, Region};
use regex::Regex;
use std::sync::LazyLock;
use whatlang::Lang;

struct RegionDefaults {
    domain: &'static str,
    currency: &'static str,
    language: Language,
    window_days: u32,
    default_cost: Option<&'static str>,
    estimate_cost: &'static str,
}

/// Checked in order against the hostname.
const KNOWN_REGIONS: &[RegionDefaults] = &[
    RegionDefaults {
        domain: "amazon.com",
        currency: "USD",
        language: Language::En,
        window_days: 30,
        default_cost: None,
        estimate_cost: "$5.00-$10.00",
    },
    RegionDefaults {
        domain: "amazon.de",
        currency: "EUR",
        language: Language::De,
        window_days: 14,
        default_cost: Some("€6.50-€13.00"),
        estimate_cost: "€6.50-€13.00",
    },
];

static GERMAN_STOREFRONT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)In den Einkaufswagen|Jetzt kaufen|Zum Warenkorb")
        .expect("valid storefront phrase regex")
});

/// Map a hostname onto a supported marketplace, applying config overrides.
pub fn detect_region(hostname: &str, config: &ScoutConfig) -> Option<Region> {
    let host = hostname.trim().to_ascii_lowercase();
    let defaults = KNOWN_REGIONS.iter().find(|r| host.contains(r.domain))?;

    let mut region = Region {
        domain: defaults.domain.to_string(),
        currency: defaults.currency.to_string(),
        language: defaults.language,
        default_return_window_days: defaults.window_days,
        default_return_cost: defaults.default_cost.map(str::to_string),
        third_party_estimate_cost: defaults.estimate_cost.to_string(),
    };

    if let Some(o) = config.region_override(defaults.domain) {
        if let Some(cost) = &o.default_return_cost {
            region.default_return_cost = Some(cost.trim().to_string()).filter(|c| !c.is_empty());
        }
        if let Some(cost) = &o.third_party_estimate_cost {
            if !cost.trim().is_empty() {
                region.third_party_estimate_cost = cost.trim().to_string();
            }
        }
        if let Some(days) = o.default_return_window_days {
            region.default_return_window_days = days;
        }
    }

    Some(region)
}

/// Language of the page: `<html lang>`, then storefront phrases, then a
/// statistical guess over the body text, then the region's own language.
pub fn detect_language(page: &PageDocument, region: &Region) -> Language {
    if let Some(lang) = page.lang_attr().and_then(Language::from_tag) {
        return lang;
    }

    let body = page.body_text();
    if GERMAN_STOREFRONT.is_match(&body) {
        return Language::De;
    }

    if let Some(info) = whatlang::detect(&body) {
        if info.is_reliable() {
            match info.lang() {
                Lang::Deu => return Language::De,
                Lang::Eng => return Language::En,
                _ => {}
            }
        }
    }

    region.language
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RegionOverride;

    #[test]
    fn test_detects_both_marketplaces() {
        let cfg = ScoutConfig::default();
        let us = detect_region("www.amazon.com", &cfg).unwrap();
        assert_eq!(us.currency, "USD");
        assert_eq!(us.default_return_window_days, 30);
        assert_eq!(us.language, Language::En);
        assert!(us.default_return_cost.is_none());

        let de = detect_region("www.amazon.de", &cfg).unwrap();
        assert_eq!(de.currency, "EUR");
        assert_eq!(de.default_return_window_days, 14);
        assert_eq!(de.default_return_cost.as_deref(), Some("€6.50-€13.00"));

        assert!(detect_region("www.ebay.com", &cfg).is_none());
    }

    #[test]
    fn test_override_can_clear_default_cost() {
        let mut cfg = ScoutConfig::default();
        cfg.regions.insert(
            "amazon.de".into(),
            RegionOverride {
                default_return_cost: Some(String::new()),
                third_party_estimate_cost: Some("€7.00".into()),
                default_return_window_days: Some(30),
            },
        );
        let de = detect_region("amazon.de", &cfg).unwrap();
        assert!(de.default_return_cost.is_none());
        assert_eq!(de.third_party_estimate_cost, "€7.00");
        assert_eq!(de.default_return_window_days, 30);
    }

    #[test]
    fn test_language_from_lang_attribute() {
        let cfg = ScoutConfig::default();
        let us = detect_region("amazon.com", &cfg).unwrap();
        let page = PageDocument::parse(r#"<html lang="de-de"><body>Hello</body></html>"#, None);
        assert_eq!(detect_language(&page, &us), Language::De);
    }

    #[test]
    fn test_language_from_storefront_phrase() {
        let cfg = ScoutConfig::default();
        let us = detect_region("amazon.com", &cfg).unwrap();
        let page = PageDocument::parse(
            r#"<html><body><input type="submit" value="x"><span>In den Einkaufswagen</span></body></html>"#,
            None,
        );
        assert_eq!(detect_language(&page, &us), Language::De);
    }

    #[test]
    fn test_language_falls_back_to_region() {
        let cfg = ScoutConfig::default();
        let de = detect_region("amazon.de", &cfg).unwrap();
        let page = PageDocument::parse("<html><body>42</body></html>", None);
        assert_eq!(detect_language(&page, &de), Language::De);
    }
}
