use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config loader (return-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "RETURN_SCOUT_CONFIG";
pub const ENV_CACHE_TTL_DAYS: &str = "RETURN_SCOUT_CACHE_TTL_DAYS";
pub const ENV_CACHE_PATH: &str = "RETURN_SCOUT_CACHE_PATH";
pub const ENV_WAIT_TIMEOUT_MS: &str = "RETURN_SCOUT_WAIT_TIMEOUT_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Per-marketplace cost overrides (the `regions` key in return-scout.json).
///
/// The default-cost table was still being tuned when it was first written
/// down, so it lives in config rather than in the engine.
#[derive(serde::Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct RegionOverride {
    /// Cost range the engine applies to implied paid returns. An explicit
    /// empty string clears the built-in default (the engine then abstains
    /// instead of guessing).
    pub default_return_cost: Option<String>,
    /// Cost range shown on the third-party estimate.
    pub third_party_estimate_cost: Option<String>,
    /// Return window used when the page names none.
    pub default_return_window_days: Option<u32>,
}

/// Top-level config loaded from `return-scout.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    /// How long a fetched seller policy stays fresh. Default: 7 days.
    pub cache_ttl_days: Option<u64>,
    /// Location of the on-disk seller cache.
    pub cache_path: Option<PathBuf>,
    /// Whole-request timeout for seller and page fetches. Default: 30 s.
    pub http_timeout_secs: Option<u64>,
    /// How long to wait for product details to render. Default: 2000 ms.
    pub wait_timeout_ms: Option<u64>,
    /// Poll interval while waiting. Default: 100 ms.
    pub wait_interval_ms: Option<u64>,
    /// Keyed by marketplace domain, e.g. `"amazon.de"`.
    #[serde(default)]
    pub regions: HashMap<String, RegionOverride>,
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

impl ScoutConfig {
    /// Seller cache TTL: JSON field → `RETURN_SCOUT_CACHE_TTL_DAYS` → 7 days.
    pub fn resolve_cache_ttl(&self) -> Duration {
        let days = self
            .cache_ttl_days
            .or_else(|| env_u64(ENV_CACHE_TTL_DAYS))
            .unwrap_or(7);
        Duration::from_secs(days.saturating_mul(24 * 60 * 60))
    }

    /// Cache file: JSON field → `RETURN_SCOUT_CACHE_PATH` → `~/.return-scout/seller_cache.json`.
    pub fn resolve_cache_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.cache_path {
            return Some(p.clone());
        }
        if let Ok(p) = std::env::var(ENV_CACHE_PATH) {
            if !p.trim().is_empty() {
                return Some(PathBuf::from(p.trim()));
            }
        }
        dirs::home_dir().map(|h| h.join(".return-scout").join("seller_cache.json"))
    }

    /// HTTP timeout: JSON field → `HTTP_TIMEOUT_SECS` → 30 s.
    pub fn resolve_http_timeout(&self) -> Duration {
        let secs = self
            .http_timeout_secs
            .or_else(|| env_u64(ENV_HTTP_TIMEOUT_SECS))
            .unwrap_or(30);
        Duration::from_secs(secs)
    }

    /// Product-details wait: JSON field → `RETURN_SCOUT_WAIT_TIMEOUT_MS` → 2000 ms.
    pub fn resolve_wait_timeout(&self) -> Duration {
        let ms = self
            .wait_timeout_ms
            .or_else(|| env_u64(ENV_WAIT_TIMEOUT_MS))
            .unwrap_or(2000);
        Duration::from_millis(ms)
    }

    pub fn resolve_wait_interval(&self) -> Duration {
        Duration::from_millis(self.wait_interval_ms.unwrap_or(100).max(1))
    }

    pub fn region_override(&self, domain: &str) -> Option<&RegionOverride> {
        self.regions.get(domain)
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut v = vec![
        PathBuf::from("return-scout.json"),
        PathBuf::from("../return-scout.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        v.insert(0, PathBuf::from(env_path));
    }
    v
}

/// Load `return-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `RETURN_SCOUT_CONFIG` env var path
/// 2. `./return-scout.json`
/// 3. `../return-scout.json`
///
/// Missing file → `ScoutConfig::default()`. Parse error → warning, defaults.
pub fn load_scout_config() -> ScoutConfig {
    for path in candidate_paths() {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<ScoutConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("return-scout.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "return-scout.json parse error at {}: {}, using defaults",
                        path.display(),
                        e
                    );
                    return ScoutConfig::default();
                }
            },
            Err(_) => continue,
        }
    }

    ScoutConfig::default()
}
