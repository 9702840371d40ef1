//! Return-policy inference over a product page.
//!
//! Each scan produces an ordered list of [`Evidence`]; [`resolve`] folds the
//! list into a verdict. The engine never guesses: no evidence, or any sign the
//! item cannot be returned, means no verdict.

use super::document::{element_text, PageDocument};
use super::{patterns, selectors};
use crate::types::{Evidence, EvidenceKind, Region, ReturnPolicyVerdict, ScanStep};
use tracing::debug;

/// How a block's free/paid statements are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    /// Badges: both tests run, a later buyer-pays overrides a free match.
    Independent,
    /// Policy rows and sections: free wins, buyer-pays is only checked otherwise.
    FreeFirst,
}

/// Run the full engine against one page.
pub fn infer(page: &PageDocument, region: &Region) -> Option<ReturnPolicyVerdict> {
    if marketplace_shows_free_returns(page) {
        debug!("inference: marketplace already shows free returns");
        return None;
    }
    let evidence = collect_evidence(page);
    debug!("inference: {} evidence items", evidence.len());
    resolve(&evidence, region)
}

/// The buy box already advertises free returns; nothing to add.
pub fn marketplace_shows_free_returns(page: &PageDocument) -> bool {
    let Ok(content_sel) = scraper::Selector::parse(selectors::MARKETPLACE_RETURNS_CONTENT) else {
        return false;
    };
    selectors::MARKETPLACE_RETURNS_CONTAINERS
        .iter()
        .filter_map(|sel| page.select_first(sel))
        .filter_map(|container| container.select(&content_sel).next())
        .any(|content| patterns::marketplace_free_returns_text(element_text(&content).trim()))
}

/// Any scan finds explicit non-returnable text.
pub fn shows_non_returnable(page: &PageDocument) -> bool {
    collect_evidence(page)
        .iter()
        .any(|e| matches!(e.kind, EvidenceKind::NonReturnable))
}

/// Evidence from every scan, in scan order. Stops early once the item is
/// known to be non-returnable.
pub fn collect_evidence(page: &PageDocument) -> Vec<Evidence> {
    let scans: [(ScanStep, fn(&PageDocument) -> Vec<Evidence>); 4] = [
        (ScanStep::Badge, scan_badges),
        (ScanStep::ReturnableWithin, scan_returnable_within),
        (ScanStep::ProductDetails, scan_product_details),
        (ScanStep::ExpandableSection, scan_expandable_sections),
    ];

    let mut evidence = Vec::new();
    for (step, scan) in scans {
        let found = scan(page);
        let blocked = found
            .iter()
            .any(|e| matches!(e.kind, EvidenceKind::NonReturnable));
        if !found.is_empty() {
            debug!("inference: {:?} produced {} items", step, found.len());
        }
        evidence.extend(found);
        if blocked {
            debug!("inference: non-returnable text found during {:?}", step);
            break;
        }
    }
    evidence
}

/// Classify one block of text. Non-returnable short-circuits the block.
pub(crate) fn classify_block(text: &str, step: ScanStep, polarity: Polarity) -> Vec<Evidence> {
    let mut out = Vec::new();

    if patterns::any_non_returnable(text) {
        out.push(Evidence::new(step, EvidenceKind::NonReturnable));
        return out;
    }

    let free = patterns::any_free_returns(text);
    if free {
        out.push(Evidence::new(step, EvidenceKind::FreeReturns));
    }
    let check_paid = polarity == Polarity::Independent || !free;
    if check_paid && patterns::any_buyer_pays(text) {
        out.push(Evidence::new(
            step,
            EvidenceKind::BuyerPays {
                cost: patterns::find_cost_token(text),
            },
        ));
    }

    if let Some(days) = patterns::find_return_window(text) {
        out.push(Evidence::new(step, EvidenceKind::Window { days }));
    }
    out
}

fn scan_badges(page: &PageDocument) -> Vec<Evidence> {
    let mut evidence = Vec::new();
    for sel in selectors::BADGES {
        for badge in page.select_all(sel) {
            let text = element_text(&badge);
            if text.trim().chars().count() <= 5 {
                continue;
            }
            let found = classify_block(&text, ScanStep::Badge, Polarity::Independent);
            let blocked = found
                .iter()
                .any(|e| matches!(e.kind, EvidenceKind::NonReturnable));
            evidence.extend(found);
            if blocked {
                return evidence;
            }
        }
    }
    evidence
}

fn scan_returnable_within(page: &PageDocument) -> Vec<Evidence> {
    page.select_all(selectors::RETURNABLE_TEXT)
        .iter()
        .filter_map(|el| patterns::find_returnable_within(&element_text(el)))
        .map(|days| Evidence::new(ScanStep::ReturnableWithin, EvidenceKind::Window { days }))
        .collect()
}

fn scan_product_details(page: &PageDocument) -> Vec<Evidence> {
    let mut evidence = Vec::new();
    for row in page.select_all(selectors::PRODUCT_DETAIL_ROWS) {
        let text = element_text(&row);
        if !patterns::contains_section_heading(&text) {
            continue;
        }
        evidence.push(Evidence::new(ScanStep::ProductDetails, EvidenceKind::PolicySection));
        let found = classify_block(&text, ScanStep::ProductDetails, Polarity::FreeFirst);
        let blocked = found
            .iter()
            .any(|e| matches!(e.kind, EvidenceKind::NonReturnable));
        evidence.extend(found);
        if blocked {
            break;
        }
    }
    evidence
}

fn scan_expandable_sections(page: &PageDocument) -> Vec<Evidence> {
    let mut evidence = Vec::new();
    for section in page.select_all(selectors::EXPANDABLE_SECTIONS) {
        let text = element_text(&section);
        // Empty containers and collapsed toggles carry no policy.
        if text.trim().chars().count() <= 10 {
            continue;
        }
        let found = classify_block(&text, ScanStep::ExpandableSection, Polarity::FreeFirst);
        let blocked = found
            .iter()
            .any(|e| matches!(e.kind, EvidenceKind::NonReturnable));
        evidence.extend(found);
        if blocked {
            break;
        }
    }
    evidence
}

/// Running state of the evidence fold.
#[derive(Debug, Default)]
struct Resolution {
    free: Option<bool>,
    cost: Option<String>,
    window: Option<u32>,
    non_returnable: bool,
}

impl Resolution {
    fn absorb(mut self, evidence: &Evidence) -> Self {
        match &evidence.kind {
            EvidenceKind::NonReturnable => self.non_returnable = true,
            EvidenceKind::FreeReturns => self.free = Some(true),
            EvidenceKind::BuyerPays { cost } => {
                self.free = Some(false);
                if cost.is_some() {
                    self.cost = cost.clone();
                }
            }
            EvidenceKind::Window { days } => self.window = Some(*days),
            EvidenceKind::PolicySection => {}
        }
        self
    }
}

/// Fold ordered evidence into a verdict, or abstain.
///
/// Only an explicit free-returns item sets free; the last explicit free/paid
/// item wins and a window never flips it. An unset free/paid state becomes a
/// paid verdict only where the region has a default cost.
pub fn resolve(evidence: &[Evidence], region: &Region) -> Option<ReturnPolicyVerdict> {
    if evidence.is_empty() {
        return None;
    }
    let state = evidence.iter().fold(Resolution::default(), Resolution::absorb);
    if state.non_returnable {
        return None;
    }

    let window = state.window.unwrap_or(region.default_return_window_days);
    let (free, cost) = match state.free {
        Some(true) => (true, None),
        Some(false) => (
            false,
            state.cost.or_else(|| region.default_return_cost.clone()),
        ),
        None => match &region.default_return_cost {
            Some(default_cost) => (false, Some(default_cost.clone())),
            None => {
                debug!(
                    "inference: signal without free/paid statement on {}, abstaining",
                    region.domain
                );
                return None;
            }
        },
    };

    Some(ReturnPolicyVerdict::first_party(free, cost, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    fn region(default_cost: Option<&str>) -> Region {
        Region {
            domain: "amazon.test".into(),
            currency: "EUR".into(),
            language: Language::En,
            default_return_window_days: 14,
            default_return_cost: default_cost.map(str::to_string),
            third_party_estimate_cost: "€6.50-€13.00".into(),
        }
    }

    fn ev(kind: EvidenceKind) -> Evidence {
        Evidence::new(ScanStep::Badge, kind)
    }

    #[test]
    fn test_empty_evidence_abstains() {
        assert!(resolve(&[], &region(Some("€6.50-€13.00"))).is_none());
    }

    #[test]
    fn test_non_returnable_wins_over_free() {
        let evidence = [ev(EvidenceKind::FreeReturns), ev(EvidenceKind::NonReturnable)];
        assert!(resolve(&evidence, &region(None)).is_none());
    }

    #[test]
    fn test_window_does_not_flip_paid() {
        let evidence = [
            ev(EvidenceKind::BuyerPays { cost: None }),
            Evidence::new(ScanStep::ExpandableSection, EvidenceKind::Window { days: 30 }),
        ];
        let verdict = resolve(&evidence, &region(None)).unwrap();
        assert!(!verdict.regular_return_free);
        assert_eq!(verdict.return_window_days, 30);
        assert!(verdict.regular_return_cost.is_none());
    }

    #[test]
    fn test_explicit_free_after_paid_sets_free() {
        let evidence = [
            ev(EvidenceKind::BuyerPays {
                cost: Some("$4.00".into()),
            }),
            Evidence::new(ScanStep::ExpandableSection, EvidenceKind::FreeReturns),
        ];
        let verdict = resolve(&evidence, &region(None)).unwrap();
        assert!(verdict.regular_return_free);
        assert!(verdict.regular_return_cost.is_none());
    }

    #[test]
    fn test_later_cost_overrides_earlier() {
        let evidence = [
            ev(EvidenceKind::BuyerPays {
                cost: Some("$4.00".into()),
            }),
            ev(EvidenceKind::BuyerPays { cost: None }),
            Evidence::new(
                ScanStep::ProductDetails,
                EvidenceKind::BuyerPays {
                    cost: Some("$9.99".into()),
                },
            ),
        ];
        let verdict = resolve(&evidence, &region(None)).unwrap();
        assert_eq!(verdict.regular_return_cost.as_deref(), Some("$9.99"));
    }

    #[test]
    fn test_paid_without_token_uses_region_default() {
        let evidence = [ev(EvidenceKind::BuyerPays { cost: None })];
        let verdict = resolve(&evidence, &region(Some("€6.50-€13.00"))).unwrap();
        assert_eq!(verdict.regular_return_cost.as_deref(), Some("€6.50-€13.00"));
        assert_eq!(verdict.return_window_days, 14);
    }

    #[test]
    fn test_unset_polarity_depends_on_region_default() {
        let evidence = [ev(EvidenceKind::Window { days: 14 })];
        assert!(resolve(&evidence, &region(None)).is_none());

        let verdict = resolve(&evidence, &region(Some("€6.50-€13.00"))).unwrap();
        assert!(!verdict.regular_return_free);
        assert_eq!(verdict.regular_return_cost.as_deref(), Some("€6.50-€13.00"));
    }

    #[test]
    fn test_defective_policy_always_free() {
        let evidence = [ev(EvidenceKind::BuyerPays {
            cost: Some("$89.99".into()),
        })];
        let verdict = resolve(&evidence, &region(None)).unwrap();
        assert!(verdict.defective_policy.free);
        assert!(verdict.defective_policy.cost.is_none());
        assert_eq!(verdict.defective_policy.window, verdict.return_window_days);
        assert!(!verdict.is_third_party_seller);
    }

    #[test]
    fn test_classify_badge_reads_both_polarities() {
        let found = classify_block(
            "FREE Returns on most items. Buyer pays return shipping for oversized items.",
            ScanStep::Badge,
            Polarity::Independent,
        );
        let kinds: Vec<_> = found.iter().map(|e| &e.kind).collect();
        assert_eq!(kinds[0], &EvidenceKind::FreeReturns);
        assert!(matches!(kinds[1], EvidenceKind::BuyerPays { .. }));
    }

    #[test]
    fn test_classify_section_prefers_free() {
        let found = classify_block(
            "Return policy: free returns, customer pays for opened software",
            ScanStep::ProductDetails,
            Polarity::FreeFirst,
        );
        assert_eq!(found, vec![Evidence::new(ScanStep::ProductDetails, EvidenceKind::FreeReturns)]);
    }

    #[test]
    fn test_marketplace_free_returns_block() {
        let page = PageDocument::parse(
            r#"<div id="freeReturns_feature_div"><span id="creturns-return-policy-content"> FREE Returns </span></div>"#,
            None,
        );
        assert!(marketplace_shows_free_returns(&page));

        let loose = PageDocument::parse(
            r#"<span id="creturns-return-policy-content">FREE Returns</span>"#,
            None,
        );
        assert!(!marketplace_shows_free_returns(&loose));
    }

    #[test]
    fn test_infer_is_idempotent() {
        let page = PageDocument::parse(
            r#"<div id="creturns-return-policy-message">Return shipping fee $7.50 applies. 30-day returns</div>"#,
            None,
        );
        let r = region(None);
        let first = infer(&page, &r);
        let second = infer(&page, &r);
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
