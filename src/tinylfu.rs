//! TinyLFU admission estimator: a Count-Min Sketch with an optional
//! doorkeeper Bloom filter in front of it.
//!
//! The doorkeeper variant suppresses one-shot keys from polluting the
//! sketch: a key only reaches the CMS once the doorkeeper has already seen
//! it. Both variants age by halving the CMS (and, with a doorkeeper,
//! clearing it) once `sample_size` additions have been observed.

use crate::bloom::BloomFilter;
use crate::key::{Key, SENTINEL};
use crate::sketch::CountMinSketch;

/// Shared frequency estimator. One instance per cache; every small page
/// reads and writes through it via `&mut` access threaded from the facade.
#[derive(Debug)]
pub struct TinyLfu {
    cms: CountMinSketch,
    doorkeeper: Option<BloomFilter>,
    sample_size: u32,
    add_count: u32,
}

impl TinyLfu {
    /// Builds an estimator with CMS width `cms_width`, aging every
    /// `sample_size` additions. `doorkeeper_capacity` enables the doorkeeper
    /// variant when `Some`.
    pub fn new(cms_width: u32, sample_size: u32, doorkeeper_capacity: Option<u32>) -> Self {
        TinyLfu {
            cms: CountMinSketch::new(cms_width),
            doorkeeper: doorkeeper_capacity.map(|cap| BloomFilter::new(cap, 0.01)),
            sample_size: sample_size.max(1),
            add_count: 0,
        }
    }

    /// Records an observation of `key`. Ignores the sentinel key. Ages the
    /// estimator once `sample_size` additions have accumulated.
    pub fn add(&mut self, key: Key) {
        if key == SENTINEL {
            return;
        }
        match &mut self.doorkeeper {
            Some(bf) => {
                if bf.add(key) {
                    self.cms.add(key);
                }
            }
            None => self.cms.add(key),
        }
        self.add_count += 1;
        if self.add_count >= self.sample_size {
            self.age();
        }
    }

    /// Estimated frequency of `key`. Doorkeeper variant adds one when the
    /// doorkeeper currently reports the key present.
    pub fn estimate(&self, key: Key) -> u8 {
        if key == SENTINEL {
            return 0;
        }
        let base = self.cms.estimate(key);
        match &self.doorkeeper {
            Some(bf) => base.saturating_add(bf.test(key) as u8),
            None => base,
        }
    }

    fn age(&mut self) {
        self.cms.reset();
        if let Some(bf) = &mut self.doorkeeper {
            bf.clear();
        }
        self.add_count = 0;
    }
}
