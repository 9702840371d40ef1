//! Return-policy vocabulary per language.
//!
//! Marketplace localization is inconsistent (English badges on German pages
//! and the reverse), so the `any_*` helpers test every language.

use crate::types::Language;
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::sync::LazyLock;

pub struct LanguagePatterns {
    pub free_returns: Regex,
    pub buyer_pays: Regex,
    pub non_returnable: Regex,
    /// Group 1 is the count, group 2 the unit (day or month).
    pub return_window: Regex,
    /// Lowercase literal substrings that mark a returns-policy block.
    pub section_headings: &'static [&'static str],
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid return-policy pattern")
}

static ENGLISH: LazyLock<LanguagePatterns> = LazyLock::new(|| LanguagePatterns {
    free_returns: compile(r"(?i)free returns?|no cost|at no charge|complimentary return"),
    buyer_pays: compile(
        r"(?i)buyer pays?|customer pays?|return shipping (?:fee|cost)|restocking fee",
    ),
    non_returnable: compile(
        r"(?i)non-returnable|not returnable|not eligible for return|cannot be returned|all sales are final|final sale",
    ),
    return_window: compile(r"(?i)(\d+)[\s-]?(day|month)s?\s+returns?"),
    section_headings: &["returns & refunds", "return policy", "returns policy"],
});

static GERMAN: LazyLock<LanguagePatterns> = LazyLock::new(|| LanguagePatterns {
    free_returns: compile(
        r"(?i)kostenlose rücksendung|kostenloser rückversand|gratis rücksendung|ohne kosten",
    ),
    buyer_pays: compile(r"(?i)käufer zahlt|kunde zahlt|rücksendekosten|rücksendegebühr"),
    non_returnable: compile(
        r"(?i)nicht rückgabefähig|keine rückgabe möglich|kann nicht zurückgegeben werden|von der rückgabe ausgeschlossen|alle verkäufe sind endgültig",
    ),
    return_window: compile(
        r"(?i)(?:rückgabe\s+innerhalb\s+von\s+|innerhalb\s+von\s+)?(\d+)[\s-]?(tagen|tage|tag|monaten|monate|monat)\b(?:\s+rückgaberecht)?",
    ),
    section_headings: &["rückgabe & erstattung", "rückgaberecht", "rückgabebedingungen"],
});

/// Currency symbol, amount with optional thousands groups, optional cents:
/// `$15.99`, `€12,50`, `£7`, `$1,299.00`, `€1.234,56`.
static COST_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"[$€£]\s?(?:\d{1,3}(?:[.,]\d{3})+|\d+)(?:[.,]\d{2})?")
});

/// "Returnable if requested within 30 days" and its German counterpart.
static RETURNABLE_WITHIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)returnable if requested within (\d+) days?|rückgabe (?:ist )?innerhalb von (\d+) tagen möglich",
    )
});

/// The marketplace's own "FREE Returns" block in the buy box.
static MARKETPLACE_FREE_RETURNS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)FREE.*Return|GRATIS.*Rück|Kostenlose"));

static SECTION_HEADINGS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    let headings: Vec<&str> = all()
        .iter()
        .flat_map(|p| p.section_headings.iter().copied())
        .collect();
    AhoCorasick::new(headings).expect("valid section heading automaton")
});

pub fn for_language(language: Language) -> &'static LanguagePatterns {
    match language {
        Language::En => &ENGLISH,
        Language::De => &GERMAN,
    }
}

pub fn all() -> [&'static LanguagePatterns; 2] {
    Language::ALL.map(for_language)
}

pub fn any_free_returns(text: &str) -> bool {
    all().iter().any(|p| p.free_returns.is_match(text))
}

pub fn any_buyer_pays(text: &str) -> bool {
    all().iter().any(|p| p.buyer_pays.is_match(text))
}

pub fn any_non_returnable(text: &str) -> bool {
    all().iter().any(|p| p.non_returnable.is_match(text))
}

/// Return window in days. Months count as 30 days.
pub fn find_return_window(text: &str) -> Option<u32> {
    all().iter().find_map(|p| {
        let caps = p.return_window.captures(text)?;
        let count: u32 = caps.get(1)?.as_str().parse().ok()?;
        let unit = caps.get(2)?.as_str().to_lowercase();
        if unit.starts_with('m') {
            count.checked_mul(30)
        } else {
            Some(count)
        }
    })
}

/// First currency amount in the text, whitespace after the symbol removed.
///
/// A match running straight into another digit is a misread amount and is
/// skipped.
pub fn find_cost_token(text: &str) -> Option<String> {
    COST_TOKEN
        .find_iter(text)
        .find(|m| {
            !text[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
        .map(|m| m.as_str().split_whitespace().collect())
}

pub fn find_returnable_within(text: &str) -> Option<u32> {
    let caps = RETURNABLE_WITHIN.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn contains_section_heading(text: &str) -> bool {
    SECTION_HEADINGS.is_match(&text.to_lowercase())
}

pub fn marketplace_free_returns_text(text: &str) -> bool {
    MARKETPLACE_FREE_RETURNS.is_match(text)
}
