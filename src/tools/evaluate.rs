//! One pass over a product page: decide, render, inject.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

use super::page_host::PageHost;
use crate::core::region::{detect_language, detect_region};
use crate::core::wait::wait_for;
use crate::features::cache::seller_cache_key;
use crate::scraping::seller_policy::StorefrontPolicy;
use crate::scraping::{inference, selectors, seller};
use crate::types::{AbstainReason, Language, Outcome, Region, ReturnPolicyVerdict, SellerIdentity};
use crate::AppState;

/// Evaluate the page behind `host`. Never fails: every problem along the way
/// ends in an abstain outcome.
pub async fn evaluate(state: &AppState, host: &dyn PageHost) -> Outcome {
    let hostname = host.url().host_str().unwrap_or_default().to_string();
    let Some(region) = detect_region(&hostname, &state.config) else {
        debug!("evaluate: {} is not a supported marketplace", hostname);
        return Outcome::UnsupportedDomain { host: hostname };
    };

    let language = detect_language(&host.snapshot(), &region);
    info!(
        "evaluate: {} ({}, {})",
        host.url(),
        region.domain,
        language.code()
    );

    let ready = wait_for(
        state.config.resolve_wait_timeout(),
        state.config.resolve_wait_interval(),
        || {
            let page = host.snapshot();
            selectors::PRODUCT_DETAILS_READY
                .iter()
                .any(|sel| page.exists(sel))
        },
    )
    .await;
    if !ready {
        debug!("evaluate: product details never appeared, continuing anyway");
    }

    if host.has_widget() {
        debug!("evaluate: badge already present");
        return Outcome::AlreadyPresent;
    }

    let (shows_free, not_returnable, seller) = {
        let page = host.snapshot();
        (
            inference::marketplace_shows_free_returns(&page),
            inference::shows_non_returnable(&page),
            seller::detect(&page),
        )
    };
    if shows_free {
        info!("evaluate: marketplace already shows free returns");
        return Outcome::Abstained {
            reason: AbstainReason::MarketplaceShowsFreeReturns,
        };
    }
    if not_returnable {
        info!("evaluate: page says the item is not returnable");
        return Outcome::Abstained {
            reason: AbstainReason::NotReturnable,
        };
    }

    let mut verdict = None;
    if seller.is_third_party && seller.seller_link.is_some() {
        match third_party_verdict(state, &seller, &region, language).await {
            Some(v) => verdict = Some(v),
            None => {
                return Outcome::Abstained {
                    reason: AbstainReason::NotReturnable,
                }
            }
        }
    }

    if verdict.is_none() {
        match catch_unwind(AssertUnwindSafe(|| {
            inference::infer(&host.snapshot(), &region)
        })) {
            Ok(v) => verdict = v,
            Err(_) => {
                warn!("evaluate: inference panicked on {}", host.url());
                return Outcome::Abstained {
                    reason: AbstainReason::InferenceFailed,
                };
            }
        }
    }

    let Some(verdict) = verdict else {
        info!("evaluate: no return evidence");
        return Outcome::Abstained {
            reason: AbstainReason::NoEvidence,
        };
    };

    if host.has_widget() {
        debug!("evaluate: badge appeared while evaluating");
        return Outcome::AlreadyPresent;
    }

    let widget = state.renderer.render(&verdict, language);
    match host.inject(widget.clone()) {
        Some(point) => debug!("evaluate: badge placed after {}", point),
        None => warn!("evaluate: no injection point on {}", host.url()),
    }
    Outcome::Rendered { verdict, widget }
}

/// Cache, then the seller's storefront, then the conservative estimate.
/// `None` when the storefront says its items cannot be returned.
async fn third_party_verdict(
    state: &AppState,
    seller: &SellerIdentity,
    region: &Region,
    language: Language,
) -> Option<ReturnPolicyVerdict> {
    let cache_key = seller
        .seller_id
        .as_deref()
        .map(|id| seller_cache_key(id, &region.domain));

    if let Some(key) = &cache_key {
        if let Some(cached) = state.seller_cache.get(key).await {
            debug!("evaluate: seller cache hit for {}", key);
            return Some(cached.with_seller(seller, &region.domain));
        }
    }

    let fetched = match seller.seller_link.as_deref() {
        Some(link) => {
            state
                .seller_source
                .fetch(link, language, region.default_return_window_days)
                .await
        }
        None => StorefrontPolicy::Unavailable,
    };

    match fetched {
        StorefrontPolicy::Found(policy) => {
            if let Some(key) = &cache_key {
                state
                    .seller_cache
                    .put(key, policy.clone(), state.config.resolve_cache_ttl())
                    .await;
            }
            Some(policy.with_seller(seller, &region.domain))
        }
        StorefrontPolicy::NotReturnable => {
            info!(
                "evaluate: seller {:?} does not take returns",
                seller.seller_name
            );
            None
        }
        StorefrontPolicy::Unavailable => {
            info!(
                "evaluate: no seller policy for {:?}, using estimate",
                seller.seller_name
            );
            Some(
                ReturnPolicyVerdict::third_party_estimate(region)
                    .with_seller(seller, &region.domain),
            )
        }
    }
}
