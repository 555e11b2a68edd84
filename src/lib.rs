#![doc = include_str!("../README.md")]

/// Fixed key and expiration representation shared by every layer.
pub mod key;

/// Fallible-operation error types.
pub mod error;

/// Cache configuration.
pub mod config;

/// Approximate frequency counting (Count-Min Sketch).
pub mod sketch;

/// Fixed-capacity membership filter, used standalone and as a TinyLFU
/// doorkeeper.
pub mod bloom;

/// TinyLFU admission estimator wrapping a sketch and optional doorkeeper.
pub mod tinylfu;

/// SIMD key search over a small page's key array.
pub mod simd;

/// Small page: the innermost fixed-size, frequency-ordered key array.
pub mod small_page;

/// Large page: a fixed fan-out of small pages.
pub mod large_page;

/// Large-page provider: bounded resident pool over an on-disk directory.
pub mod provider;

/// Doubly linked list with in-place editing, used by the LRU window.
///
/// **Note**: internal infrastructure exposing unsafe raw-pointer
/// operations; use [`lru::LruWindow`] instead of this module directly.
pub(crate) mod list;

/// Recency window in front of the page store.
pub mod lru;

/// Operational counters.
pub mod metrics;

use std::path::Path;

use log::debug;

pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use key::{Expiration, Key, SENTINEL};
pub use metrics::CacheMetrics;

use large_page::LargePage;
use lru::LruWindow;
use provider::{AccessMode, LargePageProvider};
use tinylfu::TinyLfu;

/// An admission-controlled, frequency-aware, page-structured cache.
///
/// Composes an optional LRU recency window in front of a TinyLFU-admitted
/// page store backed by a bounded-resident, on-disk directory of large
/// pages. See the crate-level docs for the full design.
#[derive(Debug)]
pub struct Cache {
    lru: Option<LruWindow>,
    tiny_lfu: TinyLfu,
    provider: LargePageProvider,
    metrics: CacheMetrics,
}

impl Cache {
    /// Opens (or creates) a cache backed by `dir`, using `config`.
    ///
    /// Validates `config`, creates `dir` if missing, and reads any existing
    /// `header.bin`/`page*.bin` files to restore prior state.
    pub fn new(dir: impl AsRef<Path>, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let doorkeeper_capacity = config.use_door_keeper.then_some(config.tlfu_size);
        let tiny_lfu = TinyLfu::new(config.tlfu_size, config.sample_size, doorkeeper_capacity);
        let lru = (config.lru_size > 0).then(|| {
            LruWindow::new(config.lru_size, config.ttl_eviction_prob, config.bernoulli_seed)
        });
        let provider = LargePageProvider::new(dir.as_ref(), &config)?;

        debug!("opened cache at {:?}", dir.as_ref());

        Ok(Cache {
            lru,
            tiny_lfu,
            provider,
            metrics: CacheMetrics::default(),
        })
    }

    /// Looks up `key` as of time `now`.
    ///
    /// Checks the LRU window first (if enabled); on a miss there, falls
    /// through to the page store, which may trigger a large-page swap (disk
    /// I/O). Returns `false` for a cold page, an admission rejection never
    /// having occurred, or an expired entry.
    pub fn get(&mut self, key: Key, now: Expiration) -> bool {
        if let Some(lru) = &mut self.lru {
            if lru.get(key, now) {
                self.metrics.hits += 1;
                return true;
            }
        }

        let hit = match self.access_page(key, AccessMode::Read) {
            Some(page) => page.get(key, now, &mut self.tiny_lfu),
            None => false,
        };

        if hit {
            self.metrics.hits += 1;
        } else {
            self.metrics.misses += 1;
        }
        hit
    }

    /// Records `(key, exp)`.
    ///
    /// With the LRU enabled, a key freshly inserted or refreshed in the
    /// window does not yet reach the page store; only a key evicted from
    /// the window is forwarded for page-level admission. Without the LRU,
    /// every update goes straight to the page store.
    pub fn update(&mut self, key: Key, exp: Expiration) {
        let forwarded = match &mut self.lru {
            Some(lru) => match lru.update(key, exp) {
                Some(evicted) => evicted,
                None => return,
            },
            None => key,
        };

        match self.access_page(forwarded, AccessMode::Update) {
            Some(page) => {
                if page.update(forwarded, exp, &mut self.tiny_lfu) {
                    self.metrics.admissions += 1;
                } else {
                    self.metrics.rejections += 1;
                }
            }
            None => self.metrics.dropped_updates += 1,
        }
    }

    /// Persists `header.bin` and every resident `page<i>.bin`.
    pub fn store(&self) -> Result<()> {
        self.provider.store()
    }

    /// Snapshot of the counters accumulated so far.
    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            swaps: self.provider.swaps(),
            ..self.metrics
        }
    }

    fn access_page(&mut self, key: Key, mode: AccessMode) -> Option<&mut LargePage> {
        // A genuine I/O failure here (anything but a missing file, which
        // `LargePageProvider` already maps to zero state) has no channel
        // to reach the caller through `get`/`update`'s non-`Result`
        // signatures; see `CacheError`'s docs for why this unwinds rather
        // than silently dropping the operation.
        match self.provider.access(key, mode) {
            Ok(page) => page,
            Err(e) => panic!("fatal I/O error during large-page access: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(dir: &std::path::Path, cfg: CacheConfig) -> Cache {
        Cache::new(dir, cfg).unwrap()
    }

    #[test]
    fn fresh_store_single_key() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CacheConfig {
            large_page_shift: 1,
            small_page_shift: 0,
            small_page_size_shift: 4,
            loaded_page_number: 1,
            lru_size: 0,
            ..CacheConfig::default()
        };
        let mut c = cache(dir.path(), cfg);
        assert!(!c.get(42, 0));
        c.update(42, 1000);
        assert!(c.get(42, 500));
        assert!(!c.get(42, 2000));
        assert!(!c.get(42, 2000));
    }

    #[test]
    fn lru_forwarding_delays_page_admission() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CacheConfig {
            large_page_shift: 1,
            small_page_shift: 0,
            small_page_size_shift: 4,
            loaded_page_number: 1,
            lru_size: 2,
            ..CacheConfig::default()
        };
        let mut c = cache(dir.path(), cfg);
        c.update(1, 100_000);
        c.update(2, 100_000);
        // Window at capacity (2): this forwards key 1 to the page store.
        c.update(3, 100_000);
        assert_eq!(c.metrics().admissions, 1);
    }

    #[test]
    fn store_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CacheConfig {
            large_page_shift: 1,
            small_page_shift: 0,
            small_page_size_shift: 4,
            loaded_page_number: 1,
            lru_size: 0,
            ..CacheConfig::default()
        };
        {
            let mut c = cache(dir.path(), cfg.clone());
            c.update(7, 100_000);
            c.store().unwrap();
        }
        let mut c2 = cache(dir.path(), cfg);
        assert!(c2.get(7, 0));
    }
}
