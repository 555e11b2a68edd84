//! A capacity/false-positive-rate parameterized Bloom filter.
//!
//! Uses the classic double-hashing trick (Kirsch/Mitzenmacher): derive `h`
//! probe positions from the low and high 32-bit halves of a single 64-bit
//! hash of the key, rather than computing `h` independent hashes.

use crate::key::Key;

/// Fixed-capacity membership filter.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u32,
    num_hashes: u32,
}

impl BloomFilter {
    /// Sizes a filter for `capacity` expected insertions at false-positive
    /// rate `false_positive_rate`.
    pub fn new(capacity: u32, false_positive_rate: f64) -> Self {
        let capacity = capacity.max(1);
        let ideal_bits = (capacity as f64 * -false_positive_rate.ln() / (std::f64::consts::LN_2 * std::f64::consts::LN_2)).ceil();
        let num_bits = (1024u32).max((ideal_bits as u32).next_power_of_two());
        let num_hashes = (2u32).max((0.7 * num_bits as f64 / capacity as f64).ceil() as u32);
        let words = (num_bits as usize).div_ceil(64);
        BloomFilter {
            bits: vec![0u64; words],
            num_bits,
            num_hashes,
        }
    }

    fn probe(&self, key: Key) -> impl Iterator<Item = u32> + '_ {
        let hash = splitmix64(key as u64);
        let lo = (hash & 0xffff_ffff) as u32;
        let hi = (hash >> 32) as u32;
        let mask = self.num_bits - 1;
        (0..self.num_hashes).map(move |i| lo.wrapping_add(i.wrapping_mul(hi)) & mask)
    }

    fn get_bit(&self, pos: u32) -> bool {
        let (word, bit) = (pos as usize / 64, pos % 64);
        self.bits[word] & (1u64 << bit) != 0
    }

    fn set_bit(&mut self, pos: u32) {
        let (word, bit) = (pos as usize / 64, pos % 64);
        self.bits[word] |= 1u64 << bit;
    }

    /// Sets every probed bit for `key`. Returns `true` iff all of them were
    /// already set (i.e. the key was probably already present).
    pub fn add(&mut self, key: Key) -> bool {
        let positions: Vec<u32> = self.probe(key).collect();
        let already_present = positions.iter().all(|&p| self.get_bit(p));
        for p in positions {
            self.set_bit(p);
        }
        already_present
    }

    /// Tests whether `key` is probably present.
    pub fn test(&self, key: Key) -> bool {
        self.probe(key).all(|p| self.get_bit(p))
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_added_keys_present() {
        let mut bf = BloomFilter::new(1000, 0.01);
        bf.add(42);
        assert!(bf.test(42));
    }

    #[test]
    fn add_reports_first_insertion_as_new() {
        let mut bf = BloomFilter::new(1000, 0.01);
        assert!(!bf.add(42));
        assert!(bf.add(42));
    }

    #[test]
    fn clear_resets_membership() {
        let mut bf = BloomFilter::new(1000, 0.01);
        bf.add(1);
        bf.clear();
        assert!(!bf.test(1));
    }

    #[test]
    fn num_bits_is_power_of_two_and_at_least_1024() {
        let bf = BloomFilter::new(1, 0.01);
        assert_eq!(bf.num_bits, 1024);
        assert!(bf.num_bits.is_power_of_two());
    }
}
