//! Type-detection cache
//!
//! Column datatypes are detected by probing one row of a table's base
//! query. The result only depends on the descriptor configuration, so it is
//! stored under the descriptor checksum and shared by every later request.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

use gridline_core::{DataSource, Result};

use crate::descriptor::TableDescriptor;

/// Detected type information for one output alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTypeEntry {
    /// Position of the matching column in the descriptor
    pub rank: Option<usize>,
    pub datatype: String,
    pub is_enum: bool,
    pub is_translatable_enum: bool,
}

/// Detected types keyed by output alias
pub type TypeMap = BTreeMap<String, CachedTypeEntry>;

/// Eviction policy of a [`TypeCache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCacheConfig {
    /// Key prefix; caches with different namespaces never share entries
    pub namespace: String,
    /// Entry lifetime, `None` keeps entries until evicted for capacity
    pub ttl_secs: Option<u64>,
    pub max_entries: usize,
}

impl Default for TypeCacheConfig {
    fn default() -> Self {
        Self {
            namespace: "gridline.types".to_string(),
            ttl_secs: None,
            max_entries: 256,
        }
    }
}

struct Slot {
    created_at: Instant,
    cell: OnceCell<Arc<TypeMap>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            created_at: Instant::now(),
            cell: OnceCell::new(),
        }
    }
}

/// Process-wide store of detected column types.
///
/// Each key owns a `OnceCell`, so concurrent misses on the same checksum
/// run the builder once and all await its result. A failed build leaves the
/// cell empty and the next request retries.
pub struct TypeCache {
    config: TypeCacheConfig,
    slots: Mutex<HashMap<String, Arc<Slot>>>,
}

impl TypeCache {
    pub fn new(config: TypeCacheConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TypeCacheConfig {
        &self.config
    }

    fn key(&self, checksum: &str) -> String {
        format!("{}:{}", self.config.namespace, checksum)
    }

    fn ttl(&self) -> Option<Duration> {
        self.config.ttl_secs.map(Duration::from_secs)
    }

    /// Return the cached map for `checksum`, running `builder` on a miss
    pub async fn get_or_build<F, Fut>(&self, checksum: &str, builder: F) -> Result<Arc<TypeMap>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TypeMap>>,
    {
        let slot = self.slot(checksum);
        let map = slot
            .cell
            .get_or_try_init(|| async move {
                tracing::debug!(checksum = %checksum, "type cache miss, detecting column types");
                builder().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(map))
    }

    /// Cached map for `checksum` without building it
    pub fn get(&self, checksum: &str) -> Option<Arc<TypeMap>> {
        let key = self.key(checksum);
        let ttl = self.ttl();
        let slots = self.slots.lock();
        slots
            .get(&key)
            .filter(|slot| !is_expired(slot, ttl))
            .and_then(|slot| slot.cell.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, checksum: &str) -> Arc<Slot> {
        let key = self.key(checksum);
        let ttl = self.ttl();
        let mut slots = self.slots.lock();

        if let Some(slot) = slots.get(&key) {
            if !is_expired(slot, ttl) {
                return Arc::clone(slot);
            }
            tracing::trace!(key = %key, "type cache entry expired");
        }

        let slot = Arc::new(Slot::new());
        slots.insert(key, Arc::clone(&slot));

        while slots.len() > self.config.max_entries.max(1) {
            let Some(oldest) = slots
                .iter()
                .min_by_key(|(_, slot)| slot.created_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            tracing::trace!(key = %oldest, "evicting type cache entry");
            slots.remove(&oldest);
        }

        slot
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(TypeCacheConfig::default())
    }
}

fn is_expired(slot: &Slot, ttl: Option<Duration>) -> bool {
    ttl.is_some_and(|ttl| slot.created_at.elapsed() >= ttl)
}

/// Probe one row of the descriptor's base query and record each value's type.
///
/// An empty probe yields an empty map.
pub async fn detect_types(
    source: &dyn DataSource,
    descriptor: &TableDescriptor,
) -> Result<TypeMap> {
    let probe = descriptor.base_query().clone().without_pagination().with_limit(1);
    let result = source.fetch(&probe).await?;

    let Some(row) = result.rows.first() else {
        tracing::debug!(table = %descriptor.name(), "type probe returned no rows");
        return Ok(TypeMap::new());
    };

    let mut types = TypeMap::new();
    for (alias, value) in row.columns().iter().zip(&row.values) {
        let rank = descriptor
            .columns()
            .iter()
            .position(|column| &column.output_alias == alias);
        types.insert(
            alias.clone(),
            CachedTypeEntry {
                rank,
                datatype: value.type_name(),
                is_enum: value.as_enum().is_some(),
                is_translatable_enum: value.as_labeled().is_some(),
            },
        );
    }

    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridline_core::GridlineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(datatype: &str) -> CachedTypeEntry {
        CachedTypeEntry {
            rank: Some(0),
            datatype: datatype.to_string(),
            is_enum: false,
            is_translatable_enum: false,
        }
    }

    fn map_of(datatype: &str) -> TypeMap {
        let mut map = TypeMap::new();
        map.insert("id".to_string(), entry(datatype));
        map
    }

    #[tokio::test]
    async fn test_builder_runs_once_per_checksum() {
        let cache = TypeCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let map = cache
                .get_or_build("abc", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(map_of("integer"))
                })
                .await
                .unwrap();
            assert_eq!(map["id"].datatype, "integer");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("abc").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_misses_converge() {
        let cache = Arc::new(TypeCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build("shared", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(map_of("string"))
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_build_is_retried() {
        let cache = TypeCache::default();

        let err = cache
            .get_or_build("k", || async { Err(GridlineError::Query("boom".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, GridlineError::Query(_)));
        assert!(cache.get("k").is_none());

        let map = cache
            .get_or_build("k", || async { Ok(map_of("float")) })
            .await
            .unwrap();
        assert_eq!(map["id"].datatype, "float");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = TypeCache::new(TypeCacheConfig {
            max_entries: 2,
            ..TypeCacheConfig::default()
        });

        for key in ["a", "b", "c"] {
            cache
                .get_or_build(key, || async { Ok(TypeMap::new()) })
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = TypeCache::new(TypeCacheConfig {
            ttl_secs: Some(0),
            ..TypeCacheConfig::default()
        });
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_build("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(TypeMap::new())
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated_in_keys() {
        let cache = TypeCache::new(TypeCacheConfig {
            namespace: "tenant-a".into(),
            ..TypeCacheConfig::default()
        });
        assert_eq!(cache.key("123"), "tenant-a:123");
    }
}
