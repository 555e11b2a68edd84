//! Cache configuration: every tunable constant enumerated in the engine's
//! external interface, as one flat struct of public fields (no builder,
//! just construct it and call `validate()`).

use crate::error::CacheError;

/// All tunable constants for a [`crate::Cache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Top bits of a key used to index the large-page directory;
    /// `D = 2^large_page_shift` total large pages.
    pub large_page_shift: u32,
    /// Sets the small-page fan-out per large page: `P = 2^small_page_shift + 1`.
    pub small_page_shift: u32,
    /// Sets the small-page slot count: `S = 2^small_page_size_shift`. Must
    /// be a multiple of 16 (the widest SIMD scan block).
    pub small_page_size_shift: u32,
    /// Capacity of the recency window. Zero disables the LRU entirely.
    pub lru_size: usize,
    /// Count-Min Sketch width before rounding to the next power of two.
    pub tlfu_size: u32,
    /// TinyLFU aging period, in additions. Typically `10 * tlfu_size`.
    pub sample_size: u32,
    /// Enables the doorkeeper Bloom filter in front of the CMS.
    pub use_door_keeper: bool,
    /// Resident large-page pool size `R`; must be `<= 2^large_page_shift`.
    pub loaded_page_number: usize,
    /// Directory-frequency aging period, in accesses.
    pub large_page_period: u32,
    /// Hysteresis gap a non-resident page's frequency must clear over the
    /// current worst resident before a swap occurs.
    pub frequency_threshold: u32,
    /// If `> 0.0`, LRU/page TTL checks use Bernoulli sampling at this
    /// probability instead of a deterministic expiration comparison.
    pub ttl_eviction_prob: f64,
    /// Seed for the Bernoulli sampler; `0` means use a random seed.
    pub bernoulli_seed: u64,
}

impl Default for CacheConfig {
    /// Mirrors the typical values from the reference implementation this
    /// engine's design was distilled from.
    fn default() -> Self {
        CacheConfig {
            large_page_shift: 13,
            small_page_shift: 8,
            small_page_size_shift: 10,
            lru_size: 50_000,
            tlfu_size: 1_000,
            sample_size: 10_000,
            use_door_keeper: false,
            loaded_page_number: 20,
            large_page_period: 2_000,
            frequency_threshold: 370,
            ttl_eviction_prob: 0.0,
            bernoulli_seed: 0,
        }
    }
}

impl CacheConfig {
    /// Directory size `D = 2^large_page_shift`.
    pub fn directory_size(&self) -> usize {
        1usize << self.large_page_shift
    }

    /// Small-page fan-out per large page.
    pub fn small_page_count(&self) -> usize {
        (1usize << self.small_page_shift) + 1
    }

    /// Slots per small page.
    pub fn small_page_size(&self) -> usize {
        1usize << self.small_page_size_shift
    }

    /// Checks every cross-field invariant from the engine's external
    /// interface contract, returning [`CacheError::InvalidConfig`] on the
    /// first violation.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.large_page_shift + self.small_page_shift + self.small_page_size_shift > 32 {
            return Err(CacheError::InvalidConfig(format!(
                "large_page_shift ({}) + small_page_shift ({}) + small_page_size_shift ({}) exceeds 32",
                self.large_page_shift, self.small_page_shift, self.small_page_size_shift
            )));
        }
        if self.loaded_page_number > self.directory_size() {
            return Err(CacheError::InvalidConfig(format!(
                "loaded_page_number ({}) exceeds directory size ({})",
                self.loaded_page_number,
                self.directory_size()
            )));
        }
        if self.small_page_size() % 16 != 0 {
            return Err(CacheError::InvalidConfig(format!(
                "small_page_size ({}) must be a multiple of 16",
                self.small_page_size()
            )));
        }
        if !(0.0..=1.0).contains(&self.ttl_eviction_prob) {
            return Err(CacheError::InvalidConfig(format!(
                "ttl_eviction_prob ({}) must be in [0, 1]",
                self.ttl_eviction_prob
            )));
        }
        Ok(())
    }
}
