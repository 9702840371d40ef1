use serde::{Deserialize, Serialize};

/// Page languages the pattern library and the badge text know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::De];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }

    /// Accepts bare codes and region-qualified tags (`de-DE`, `en_US`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.starts_with("de") {
            Some(Language::De)
        } else if tag.starts_with("en") {
            Some(Language::En)
        } else {
            None
        }
    }
}

/// A recognized marketplace storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub domain: String,
    pub currency: String,
    pub language: Language,
    pub default_return_window_days: u32,
    /// Cost range applied when a page implies paid returns without naming an
    /// amount. `None` means the region has no known default, and an unset
    /// free/paid signal makes the engine abstain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_return_cost: Option<String>,
    /// Cost range shown on the conservative third-party estimate.
    pub third_party_estimate_cost: String,
}

/// Cost and window for one class of return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnTerms {
    pub free: bool,
    pub cost: Option<String>,
    pub window: u32,
}

impl ReturnTerms {
    /// Defective or damaged items always go back free of charge.
    pub fn defective(window: u32) -> Self {
        Self {
            free: true,
            cost: None,
            window,
        }
    }
}

/// The engine's answer for one page. Either fully populated or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPolicyVerdict {
    pub regular_return_free: bool,
    #[serde(default)]
    pub regular_return_cost: Option<String>,
    pub return_window_days: u32,
    pub defective_policy: ReturnTerms,
    pub is_third_party_seller: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_page_link: Option<String>,
    /// Set only on the synthesized third-party default, never on scraped data.
    #[serde(default)]
    pub is_estimate: bool,
}

impl ReturnPolicyVerdict {
    fn build(free: bool, cost: Option<String>, window: u32, third_party: bool) -> Self {
        Self {
            regular_return_free: free,
            regular_return_cost: if free { None } else { cost },
            return_window_days: window,
            defective_policy: ReturnTerms::defective(window),
            is_third_party_seller: third_party,
            seller_name: None,
            seller_link: None,
            seller_page_link: None,
            is_estimate: false,
        }
    }

    pub fn first_party(free: bool, cost: Option<String>, window: u32) -> Self {
        Self::build(free, cost, window, false)
    }

    pub fn third_party(free: bool, cost: Option<String>, window: u32) -> Self {
        Self::build(free, cost, window, true)
    }

    /// Paid-return estimate for a third-party listing whose own policy could
    /// not be read.
    pub fn third_party_estimate(region: &Region) -> Self {
        let mut verdict = Self::build(
            false,
            Some(region.third_party_estimate_cost.clone()),
            region.default_return_window_days,
            true,
        );
        verdict.is_estimate = true;
        verdict
    }

    /// Attach the seller identity. The only mutation a verdict sees after
    /// construction.
    pub fn with_seller(mut self, seller: &SellerIdentity, domain: &str) -> Self {
        self.seller_name = seller.seller_name.clone();
        self.seller_link = seller.seller_link.clone();
        self.seller_page_link = seller
            .seller_id
            .as_ref()
            .map(|id| seller_page_url(domain, id));
        self
    }

    pub fn regular_return_policy(&self) -> ReturnTerms {
        ReturnTerms {
            free: self.regular_return_free,
            cost: self.regular_return_cost.clone(),
            window: self.return_window_days,
        }
    }
}

/// Clean storefront URL for a seller id.
pub fn seller_page_url(domain: &str, seller_id: &str) -> String {
    format!("https://{}/sp?seller={}", domain, seller_id)
}

/// Who sells the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerIdentity {
    pub is_third_party: bool,
    pub seller_id: Option<String>,
    pub seller_link: Option<String>,
    pub seller_name: Option<String>,
}

impl SellerIdentity {
    pub fn marketplace() -> Self {
        Self::default()
    }
}

/// The scan that produced a piece of evidence, in engine order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStep {
    Badge,
    ReturnableWithin,
    ProductDetails,
    ExpandableSection,
    SellerSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceKind {
    FreeReturns,
    BuyerPays { cost: Option<String> },
    NonReturnable,
    Window { days: u32 },
    /// A returns-policy block was found but said nothing classifiable.
    PolicySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub step: ScanStep,
    #[serde(flatten)]
    pub kind: EvidenceKind,
}

impl Evidence {
    pub fn new(step: ScanStep, kind: EvidenceKind) -> Self {
        Self { step, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainReason {
    /// The marketplace already advertises free returns on the page.
    MarketplaceShowsFreeReturns,
    /// No return evidence on the page.
    NoEvidence,
    /// The page or the seller's storefront says the item cannot be returned.
    NotReturnable,
    /// Inference blew up; treated like no evidence.
    InferenceFailed,
}

/// Result of one page evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    UnsupportedDomain {
        host: String,
    },
    AlreadyPresent,
    Abstained {
        reason: AbstainReason,
    },
    Rendered {
        verdict: ReturnPolicyVerdict,
        widget: crate::features::widget::RenderedWidget,
    },
}

impl Outcome {
    pub fn verdict(&self) -> Option<&ReturnPolicyVerdict> {
        match self {
            Outcome::Rendered { verdict, .. } => Some(verdict),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn de_region() -> Region {
        Region {
            domain: "amazon.de".to_string(),
            currency: "EUR".to_string(),
            language: Language::De,
            default_return_window_days: 14,
            default_return_cost: Some("€6.50-€13.00".to_string()),
            third_party_estimate_cost: "€6.50-€13.00".to_string(),
        }
    }

    #[test]
    fn test_language_from_tag() {
        assert_eq!(Language::from_tag("de-DE"), Some(Language::De));
        assert_eq!(Language::from_tag("en_US"), Some(Language::En));
        assert_eq!(Language::from_tag(" EN "), Some(Language::En));
        assert_eq!(Language::from_tag("fr"), None);
    }

    #[test]
    fn test_free_verdict_drops_cost() {
        let verdict = ReturnPolicyVerdict::first_party(true, Some("$4.99".into()), 30);
        assert!(verdict.regular_return_free);
        assert!(verdict.regular_return_cost.is_none());
        assert_eq!(verdict.defective_policy, ReturnTerms::defective(30));
    }

    #[test]
    fn test_estimate_is_marked() {
        let verdict = ReturnPolicyVerdict::third_party_estimate(&de_region());
        assert!(verdict.is_estimate);
        assert!(verdict.is_third_party_seller);
        assert!(!verdict.regular_return_free);
        assert_eq!(verdict.regular_return_cost.as_deref(), Some("€6.50-€13.00"));
        assert_eq!(verdict.return_window_days, 14);
        assert!(verdict.defective_policy.free);
    }

    #[test]
    fn test_with_seller_builds_page_link() {
        let seller = SellerIdentity {
            is_third_party: true,
            seller_id: Some("A1BESTSELLER123".into()),
            seller_link: Some("https://www.amazon.de/gp/help/seller?seller=A1BESTSELLER123".into()),
            seller_name: Some("BestElectronicsStore".into()),
        };
        let verdict = ReturnPolicyVerdict::third_party(true, None, 14).with_seller(&seller, "amazon.de");
        assert_eq!(
            verdict.seller_page_link.as_deref(),
            Some("https://amazon.de/sp?seller=A1BESTSELLER123")
        );
        assert_eq!(verdict.seller_name.as_deref(), Some("BestElectronicsStore"));
    }

    #[test]
    fn test_verdict_serializes_camel_case() {
        let verdict = ReturnPolicyVerdict::first_party(false, Some("$15.99".into()), 30);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["regularReturnFree"], false);
        assert_eq!(json["regularReturnCost"], "$15.99");
        assert_eq!(json["returnWindowDays"], 30);
        assert_eq!(json["defectivePolicy"]["free"], true);
        assert!(json["defectivePolicy"]["cost"].is_null());
        assert!(json.get("sellerName").is_none());
    }
}
