//! Browser-like request headers for storefront fetches.
//!
//! Marketplace storefront pages answer bare HTTP clients with a captcha or a
//! stripped-down page, so seller fetches present themselves as a desktop
//! browser in the page's language.

use crate::types::Language;
use rand::seq::IndexedRandom;

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Firefox 133 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari 17 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
];

/// Returns a randomly-chosen desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

pub fn accept_language(language: Language) -> &'static str {
    match language {
        Language::En => "en-US,en;q=0.9",
        Language::De => "de-DE,de;q=0.9,en;q=0.6",
    }
}

/// Headers sent with every page fetch, User-Agent included.
pub fn browser_headers(language: Language) -> Vec<(&'static str, &'static str)> {
    vec![
        ("User-Agent", random_user_agent()),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", accept_language(language)),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
    ]
}
