use std::sync::Arc;

use crate::core::config::{load_scout_config, ScoutConfig};
use crate::features::cache::{MemoryPolicyCache, PolicyCache};
use crate::features::widget::{BadgeRenderer, WidgetRenderer};
use crate::scraping::seller_policy::{HttpSellerPolicySource, SellerPolicySource};

/// Everything one evaluation needs. Cheap to clone; pieces are shared.
#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    /// File-based config loaded from `return-scout.json` (env-var fallback for all fields).
    pub config: Arc<ScoutConfig>,
    /// Seller verdicts keyed by `seller-{id}-{domain}`.
    pub seller_cache: Arc<dyn PolicyCache>,
    pub seller_source: Arc<dyn SellerPolicySource>,
    pub renderer: Arc<dyn WidgetRenderer>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache_ttl", &self.config.resolve_cache_ttl())
            .field("cache_path", &self.config.resolve_cache_path())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client) -> Self {
        let config = load_scout_config();
        let seller_cache: Arc<dyn PolicyCache> =
            Arc::new(MemoryPolicyCache::new(config.resolve_cache_ttl()));
        let seller_source: Arc<dyn SellerPolicySource> =
            Arc::new(HttpSellerPolicySource::new(http_client.clone()));
        Self {
            http_client,
            config: Arc::new(config),
            seller_cache,
            seller_source,
            renderer: Arc::new(BadgeRenderer),
        }
    }

    pub fn with_config(mut self, config: ScoutConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn PolicyCache>) -> Self {
        self.seller_cache = cache;
        self
    }

    pub fn with_seller_source(mut self, source: Arc<dyn SellerPolicySource>) -> Self {
        self.seller_source = source;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn WidgetRenderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
