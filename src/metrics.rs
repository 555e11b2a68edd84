//! Operational counters for a [`crate::Cache`].
//!
//! A single flat struct rather than one type per eviction policy, since
//! this engine has exactly one policy. Counters are plain `u64`s updated on
//! the hot path with no allocation and no locking.

/// Hit/miss/admission counters accumulated over a cache's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheMetrics {
    /// `get` calls that found a live key, in the LRU window or a page.
    pub hits: u64,
    /// `get` calls that found nothing live.
    pub misses: u64,
    /// `update` calls that resulted in a key actually being admitted into
    /// a small page (as opposed to staying in the LRU window, or being
    /// rejected by admission control, or dropped for a cold large page).
    pub admissions: u64,
    /// `update` calls rejected by small-page admission control.
    pub rejections: u64,
    /// `update` calls dropped because the target large page was neither
    /// resident nor hot enough to swap in.
    pub dropped_updates: u64,
    /// Large-page swaps performed (resident page evicted, another loaded).
    pub swaps: u64,
}

impl CacheMetrics {
    /// Total `get` calls observed so far.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of `get` calls that hit, or `0.0` with no lookups yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
