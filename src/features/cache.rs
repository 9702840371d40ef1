//! Expiring store for seller verdicts.
//!
//! Entries are `{policy, timestamp}` keyed by `seller-{id}-{domain}`; an entry
//! is fresh while `now - timestamp < ttl`. Two backends: an in-process moka
//! cache and a JSON file under `~/.return-scout/`.

use crate::core::{ScoutError, ScoutResult};
use crate::types::ReturnPolicyVerdict;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub fn seller_cache_key(seller_id: &str, domain: &str) -> String {
    format!("seller-{}-{}", seller_id, domain)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPolicy {
    pub policy: ReturnPolicyVerdict,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
    /// TTL the entry was written with; absent entries use the store default.
    #[serde(default, rename = "ttlMs", skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<i64>,
}

impl CachedPolicy {
    pub fn new(policy: ReturnPolicyVerdict, ttl: Duration) -> Self {
        Self {
            policy,
            timestamp: Utc::now().timestamp_millis(),
            ttl_ms: Some(duration_ms(ttl)),
        }
    }

    pub fn is_fresh(&self, now_ms: i64, default_ttl: Duration) -> bool {
        let ttl = self.ttl_ms.unwrap_or_else(|| duration_ms(default_ttl));
        now_ms.saturating_sub(self.timestamp) < ttl
    }
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
pub trait PolicyCache: Send + Sync {
    /// Fresh verdict for `key`, if any.
    async fn get(&self, key: &str) -> Option<ReturnPolicyVerdict>;
    async fn put(&self, key: &str, policy: ReturnPolicyVerdict, ttl: Duration);
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ─────────────────────────────────────────────────────────────────────────────

struct EntryTtl;

impl moka::Expiry<String, CachedPolicy> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedPolicy,
        _created_at: Instant,
    ) -> Option<Duration> {
        value
            .ttl_ms
            .and_then(|ms| u64::try_from(ms).ok())
            .map(Duration::from_millis)
    }
}

#[derive(Clone)]
pub struct MemoryPolicyCache {
    inner: moka::future::Cache<String, CachedPolicy>,
    default_ttl: Duration,
}

impl MemoryPolicyCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(1_000)
                .expire_after(EntryTtl)
                .build(),
            default_ttl,
        }
    }

    /// Store a pre-built entry, timestamp included.
    pub async fn insert_entry(&self, key: &str, entry: CachedPolicy) {
        self.inner.insert(key.to_string(), entry).await;
    }
}

impl Default for MemoryPolicyCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl PolicyCache for MemoryPolicyCache {
    async fn get(&self, key: &str) -> Option<ReturnPolicyVerdict> {
        let entry = self.inner.get(key).await?;
        if entry.is_fresh(Utc::now().timestamp_millis(), self.default_ttl) {
            Some(entry.policy)
        } else {
            self.inner.invalidate(key).await;
            None
        }
    }

    async fn put(&self, key: &str, policy: ReturnPolicyVerdict, ttl: Duration) {
        self.inner
            .insert(key.to_string(), CachedPolicy::new(policy, ttl))
            .await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File backend
// ─────────────────────────────────────────────────────────────────────────────

/// JSON map of key → entry. Read on every lookup so several processes share
/// it; writes go to `{path}.tmp` and are renamed into place.
pub struct FilePolicyCache {
    path: PathBuf,
    default_ttl: Duration,
    write_lock: Mutex<()>,
}

impl FilePolicyCache {
    pub fn new(path: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self {
            path: path.into(),
            default_ttl,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> ScoutResult<HashMap<String, CachedPolicy>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(ScoutError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| ScoutError::Json {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, map: &HashMap<String, CachedPolicy>) -> ScoutResult<()> {
        let io_err = |source: std::io::Error| ScoutError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(map).map_err(|source| ScoutError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl PolicyCache for FilePolicyCache {
    async fn get(&self, key: &str) -> Option<ReturnPolicyVerdict> {
        let map = match self.load().await {
            Ok(m) => m,
            Err(e) => {
                warn!("cache: {}, treating as empty", e);
                return None;
            }
        };
        let entry = map.get(key)?;
        if entry.is_fresh(Utc::now().timestamp_millis(), self.default_ttl) {
            debug!("cache: hit {}", key);
            Some(entry.policy.clone())
        } else {
            debug!("cache: stale {}", key);
            None
        }
    }

    async fn put(&self, key: &str, policy: ReturnPolicyVerdict, ttl: Duration) {
        let _guard = self.write_lock.lock().await;
        let mut map = match self.load().await {
            Ok(m) => m,
            Err(e) => {
                warn!("cache: {}, starting a fresh cache file", e);
                HashMap::new()
            }
        };
        let now = Utc::now().timestamp_millis();
        map.retain(|_, entry| entry.is_fresh(now, self.default_ttl));
        map.insert(key.to_string(), CachedPolicy::new(policy, ttl));
        match self.save(&map).await {
            Ok(()) => info!("cache: stored {} ({} entries)", key, map.len()),
            Err(e) => warn!("cache: write failed: {}", e),
        }
    }
}
