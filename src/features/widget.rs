//! Badge text for a verdict.
//!
//! Every badge has a defective-items line and a regular-returns line, each
//! "free within N days" or "costs C within N days", plus a footer naming the
//! policy source.

use crate::scraping::document::PageDocument;
use crate::scraping::selectors;
use crate::types::{Language, ReturnPolicyVerdict, ReturnTerms};
use serde::Serialize;

/// Element id the injected badge carries.
pub const BADGE_ELEMENT_ID: &str = "return-scout-badge";

const NBSP: char = '\u{00A0}';

pub struct UiText {
    pub heading: &'static str,
    pub defective_items: &'static str,
    pub regular_returns: &'static str,
    pub based_on_policy: &'static str,
}

const EN: UiText = UiText {
    heading: "Return Cost Information",
    defective_items: "Defective/Damaged Items",
    regular_returns: "Regular Returns",
    based_on_policy: "Based on Amazon's return policy",
};

const DE: UiText = UiText {
    heading: "Rücksendekosten-Informationen",
    defective_items: "Defekte/Beschädigte Artikel",
    regular_returns: "Reguläre Rücksendungen",
    based_on_policy: "Basierend auf Amazons Rückgaberichtlinie",
};

pub fn ui_text(language: Language) -> &'static UiText {
    match language {
        Language::En => &EN,
        Language::De => &DE,
    }
}

/// One line of return terms. A missing cost renders as `?`.
pub fn format_return_text(free: bool, cost: Option<&str>, window: u32, language: Language) -> String {
    let cost = cost.unwrap_or("?");
    match (language, free) {
        (Language::En, true) => format!("Free returns within {window}{NBSP}days"),
        (Language::En, false) => {
            format!("Non-free returns ({cost} shipping cost) within {window}{NBSP}days")
        }
        (Language::De, true) => format!("Kostenlose Rücksendung innerhalb von {window}{NBSP}Tagen"),
        (Language::De, false) => format!(
            "Kostenpflichtige Rücksendung ({cost} Versandkosten) innerhalb von {window}{NBSP}Tagen"
        ),
    }
}

fn terms_line(terms: &ReturnTerms, language: Language) -> String {
    format_return_text(terms.free, terms.cost.as_deref(), terms.window, language)
}

fn footer(verdict: &ReturnPolicyVerdict, language: Language) -> String {
    let text = ui_text(language);
    match (verdict.is_third_party_seller, verdict.seller_name.as_deref()) {
        (true, Some(name)) if verdict.is_estimate => match language {
            Language::En => format!(
                "Estimated costs for third-party seller \"{name}\". Check seller's return policy for exact details."
            ),
            Language::De => format!(
                "Geschätzte Kosten für Dritthändler \"{name}\". Prüfen Sie die Rückgaberichtlinie des Verkäufers für genaue Details."
            ),
        },
        (_, Some(name)) => match language {
            Language::En => format!("Based on {name}'s return policy"),
            Language::De => format!("Basierend auf {name}s Rückgaberichtlinie"),
        },
        (_, None) => text.based_on_policy.to_string(),
    }
}

/// Rendered badge, ready for a page host to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedWidget {
    pub element_id: &'static str,
    pub language: Language,
    pub heading: String,
    pub defective_label: String,
    pub defective_line: String,
    pub regular_label: String,
    pub regular_line: String,
    pub footer: String,
    /// Link for the seller name in the footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_page_link: Option<String>,
    /// Link to the seller's own policy on estimated badges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_policy_link: Option<String>,
}

impl RenderedWidget {
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{}\n  {}: {}\n  {}: {}\n  ⚬ {}",
            self.heading,
            self.defective_label,
            self.defective_line,
            self.regular_label,
            self.regular_line,
            self.footer
        );
        if let Some(link) = &self.seller_page_link {
            out.push_str(&format!("\n    {}", link));
        }
        out
    }
}

pub trait WidgetRenderer: Send + Sync {
    fn render(&self, verdict: &ReturnPolicyVerdict, language: Language) -> RenderedWidget;
}

/// Compact badge placed below the buy box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeRenderer;

impl WidgetRenderer for BadgeRenderer {
    fn render(&self, verdict: &ReturnPolicyVerdict, language: Language) -> RenderedWidget {
        let text = ui_text(language);
        RenderedWidget {
            element_id: BADGE_ELEMENT_ID,
            language,
            heading: text.heading.to_string(),
            defective_label: text.defective_items.to_string(),
            defective_line: terms_line(&verdict.defective_policy, language),
            regular_label: text.regular_returns.to_string(),
            regular_line: terms_line(&verdict.regular_return_policy(), language),
            footer: footer(verdict, language),
            seller_page_link: verdict.seller_page_link.clone(),
            seller_policy_link: verdict
                .seller_link
                .clone()
                .filter(|_| verdict.is_estimate),
        }
    }
}

/// Selector of the element the badge goes after.
pub fn find_injection_point(page: &PageDocument) -> Option<&'static str> {
    selectors::INJECTION_POINTS
        .iter()
        .copied()
        .find(|sel| page.exists(sel))
}
