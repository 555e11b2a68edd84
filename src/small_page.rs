//! Small page: the innermost fixed-size, frequency-ordered key array.
//!
//! Keys are kept in non-increasing order of their TinyLFU estimate, with
//! empty (sentinel) slots pushed to a contiguous tail. Frequency state is
//! never owned by the page — every lookup and bump goes through the shared
//! `TinyLfu` passed in by the caller (the large page, ultimately the
//! facade), per the ownership-strict threading this crate uses in place of
//! the original's non-owning back-reference.

use crate::key::{Expiration, Key, SENTINEL};
use crate::simd::find_key_index;
use crate::tinylfu::TinyLfu;

/// Fixed-size, SIMD-scanned, frequency-sorted array of keys.
#[derive(Debug, Clone)]
pub struct SmallPage {
    keys: Vec<Key>,
    expirations: Vec<Expiration>,
}

impl SmallPage {
    /// Builds an empty page of `size` slots. `size` should be a multiple of
    /// 16 for the AVX2 scan to stay on its fast path (the scalar tail
    /// handles any remainder correctly regardless).
    pub fn new(size: usize) -> Self {
        SmallPage {
            keys: vec![SENTINEL; size],
            expirations: vec![0; size],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current key order, highest estimated frequency first. Exposed for
    /// inspection (tests, diagnostics); not needed by the hot path.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Looks up `key`. A hit that has expired is evicted in place and
    /// reported as a miss. A live hit bumps the shared estimator and
    /// re-sorts the hit slot toward the head.
    pub fn get(&mut self, key: Key, now: Expiration, tinylfu: &mut TinyLfu) -> bool {
        let Some(i) = find_key_index(&self.keys, key) else {
            return false;
        };
        if self.expirations[i] < now {
            self.evict_at(i);
            return false;
        }
        tinylfu.add(key);
        self.bubble_up(i, tinylfu);
        true
    }

    /// Attempts to admit `(key, exp)`. Succeeds unconditionally into an
    /// empty slot; otherwise only if `key` is estimated strictly hotter than
    /// the current tail (lowest-frequency) occupant, which it then evicts.
    pub fn update(&mut self, key: Key, exp: Expiration, tinylfu: &mut TinyLfu) -> bool {
        let tail = self.len() - 1;
        if self.keys[tail] == SENTINEL {
            self.keys[tail] = key;
            self.expirations[tail] = exp;
            tinylfu.add(key);
            self.bubble_up(tail, tinylfu);
            return true;
        }
        let tail_key = self.keys[tail];
        if tinylfu.estimate(key) > tinylfu.estimate(tail_key) {
            self.keys[tail] = key;
            self.expirations[tail] = exp;
            tinylfu.add(key);
            self.bubble_up(tail, tinylfu);
            true
        } else {
            false
        }
    }

    /// Resets every slot to empty.
    pub fn clear(&mut self) {
        self.keys.iter_mut().for_each(|k| *k = SENTINEL);
        self.expirations.iter_mut().for_each(|e| *e = 0);
    }

    /// Bulk-loads from a flat buffer: all keys (4 bytes LE each), then all
    /// expirations (4 bytes LE each), matching [`Self::store_to`].
    pub fn load_from(&mut self, buf: &[u8]) {
        let n = self.keys.len();
        for (i, chunk) in buf[..n * 4].chunks_exact(4).enumerate() {
            self.keys[i] = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        for (i, chunk) in buf[n * 4..n * 8].chunks_exact(4).enumerate() {
            self.expirations[i] = u32::from_le_bytes(chunk.try_into().unwrap());
        }
    }

    /// Appends this page's flat byte image (all keys, then all
    /// expirations) to `out`.
    pub fn store_to(&self, out: &mut Vec<u8>) {
        for k in &self.keys {
            out.extend_from_slice(&k.to_le_bytes());
        }
        for e in &self.expirations {
            out.extend_from_slice(&e.to_le_bytes());
        }
    }

    fn evict_at(&mut self, i: usize) {
        self.keys[i] = SENTINEL;
        self.expirations[i] = 0;
        let mut j = i;
        while j + 1 < self.len() && self.keys[j + 1] != SENTINEL {
            self.keys.swap(j, j + 1);
            self.expirations.swap(j, j + 1);
            j += 1;
        }
    }

    fn bubble_up(&mut self, mut i: usize, tinylfu: &mut TinyLfu) {
        while i > 0 && tinylfu.estimate(self.keys[i - 1]) < tinylfu.estimate(self.keys[i]) {
            self.keys.swap(i - 1, i);
            self.expirations.swap(i - 1, i);
            i -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lfu() -> TinyLfu {
        TinyLfu::new(256, 100_000, None)
    }

    #[test]
    fn update_into_empty_page_then_get_hits() {
        let mut page = SmallPage::new(16);
        let mut t = lfu();
        assert!(page.update(5, 1000, &mut t));
        assert!(page.get(5, 500, &mut t));
    }

    #[test]
    fn expired_hit_evicts_and_reports_miss() {
        let mut page = SmallPage::new(16);
        let mut t = lfu();
        page.update(5, 100, &mut t);
        assert!(!page.get(5, 200, &mut t));
        assert!(!page.get(5, 200, &mut t));
    }

    #[test]
    fn full_page_rejects_cold_admission() {
        let mut page = SmallPage::new(8);
        let mut t = lfu();
        for k in 0..8 {
            assert!(page.update(k, 10_000, &mut t));
        }
        for k in 0..8 {
            for _ in 0..50 {
                page.get(k, 0, &mut t);
            }
        }
        assert!(!page.update(999, 10_000, &mut t));
        assert!(!page.get(999, 0, &mut t));
    }

    #[test]
    fn hot_key_bubbles_to_head() {
        let mut page = SmallPage::new(8);
        let mut t = lfu();
        for k in 1..=8 {
            page.update(k, 10_000, &mut t);
        }
        for _ in 0..10 {
            page.get(8, 0, &mut t);
        }
        assert_eq!(page.keys[0], 8);
    }

    #[test]
    fn sentinel_slots_stay_a_contiguous_suffix() {
        let mut page = SmallPage::new(8);
        let mut t = lfu();
        for k in 1..=4 {
            page.update(k, 10_000, &mut t);
        }
        page.get(2, 20_000, &mut t); // expires slot holding key 2
        let first_sentinel = page.keys.iter().position(|&k| k == SENTINEL);
        if let Some(idx) = first_sentinel {
            assert!(page.keys[idx..].iter().all(|&k| k == SENTINEL));
        }
    }

    #[test]
    fn round_trips_through_flat_buffer() {
        let mut page = SmallPage::new(8);
        let mut t = lfu();
        for k in 1..=4 {
            page.update(k, 5000 + k, &mut t);
        }
        let mut buf = Vec::new();
        page.store_to(&mut buf);
        let mut restored = SmallPage::new(8);
        restored.load_from(&buf);
        assert_eq!(restored.keys, page.keys);
        assert_eq!(restored.expirations, page.expirations);
    }
}
