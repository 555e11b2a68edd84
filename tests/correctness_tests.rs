//! End-to-end correctness tests for the cache facade and its supporting
//! structures.
//!
//! Mirrors the concrete scenarios in the design: small, deterministic
//! configurations with explicit assertions on hits, misses, and on-disk
//! layout after eviction/swap, rather than mechanical round-trip grids.

use tlfu_pagecache::sketch::CountMinSketch;
use tlfu_pagecache::small_page::SmallPage;
use tlfu_pagecache::tinylfu::TinyLfu;
use tlfu_pagecache::{Cache, CacheConfig};

fn open(dir: &std::path::Path, cfg: CacheConfig) -> Cache {
    let _ = env_logger::builder().is_test(true).try_init();
    Cache::new(dir, cfg).unwrap()
}

#[test]
fn fresh_store_single_key() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = CacheConfig {
        large_page_shift: 1,
        small_page_shift: 0,
        small_page_size_shift: 4, // S = 16
        loaded_page_number: 1,
        lru_size: 0,
        ..CacheConfig::default()
    };
    let mut c = open(dir.path(), cfg);

    assert!(!c.get(42, 0));
    c.update(42, 1000);
    assert!(c.get(42, 500));
    assert!(!c.get(42, 2000));
    assert!(!c.get(42, 2000));
}

#[test]
fn admission_rejection_loses_tail_contest() {
    // A large page fans out over 2 small pages (minimum fan-out); route 8
    // even keys to small page 0 (key parity selects the small page) to fill
    // its 8 slots exactly, heat every incumbent, then try to admit a cold
    // even newcomer that routes to the same small page.
    let dir = tempfile::tempdir().unwrap();
    let cfg = CacheConfig {
        large_page_shift: 1,
        small_page_shift: 0,
        small_page_size_shift: 3, // S = 8
        loaded_page_number: 1,
        lru_size: 0,
        ..CacheConfig::default()
    };
    let mut c = open(dir.path(), cfg);

    for k in (0u32..16).step_by(2) {
        c.update(k, 1_000_000);
        for _ in 0..100 {
            c.get(k, 0);
        }
    }

    c.update(20_000, 1_000_000);
    assert!(!c.get(20_000, 0));
}

#[test]
fn bubble_moves_hot_key_to_head() {
    let mut page = SmallPage::new(8);
    let mut est = TinyLfu::new(1024, 10_000, None);

    for k in 1u32..=8 {
        page.update(k, 1_000_000, &mut est);
    }
    for _ in 0..10 {
        assert!(page.get(8, 0, &mut est));
    }

    assert_eq!(page.keys()[0], 8);
}

#[test]
fn large_page_swap_persists_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = CacheConfig {
        large_page_shift: 2, // D = 4
        small_page_shift: 0,
        small_page_size_shift: 4,
        loaded_page_number: 2, // R = 2, residents are directory 0 and 1
        frequency_threshold: 3,
        large_page_period: 2_000,
        lru_size: 0,
        ..CacheConfig::default()
    };
    let mut c = open(dir.path(), cfg);

    // Warm the two resident pages once each so their frequency isn't zero.
    c.get(0u32, 0);
    c.get(1u32 << 30, 0);

    // Directory index 2 (non-resident): top two bits == 0b10.
    let key_in_page2 = 2u32 << 30;
    for _ in 0..5 {
        c.get(key_in_page2, 0);
    }

    let page0 = dir.path().join("page0.bin");
    let page1 = dir.path().join("page1.bin");
    assert!(page0.exists() || page1.exists());
}

#[test]
fn tinylfu_ages_after_sample_size_additions() {
    let mut est = TinyLfu::new(1024, 8, None);
    for _ in 0..4 {
        est.add(1);
    }
    let before = est.estimate(1);
    for k in 100u32..108 {
        est.add(k);
    }
    assert_eq!(est.estimate(1), before / 2);
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
    let mut c = open(dir.path(), cfg);

    c.update(1, 1_000_000);
    c.update(2, 1_000_000);
    c.update(3, 1_000_000); // forwards key 1, the LRU-end entry

    assert_eq!(c.metrics().admissions, 1);
}

#[test]
fn count_min_sketch_lower_bounds_true_count() {
    let mut cms = CountMinSketch::new(256);
    for _ in 0..10 {
        cms.add(7);
    }
    assert!(cms.estimate(7) >= 10 / 16);
    assert!(cms.estimate(7) <= 15);
}

#[test]
fn count_min_sketch_reset_halves_every_counter() {
    let mut cms = CountMinSketch::new(256);
    for _ in 0..10 {
        cms.add(7);
    }
    let before = cms.estimate(7);
    cms.reset();
    assert_eq!(cms.estimate(7), before / 2);
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
        let mut c = open(dir.path(), cfg.clone());
        c.update(7, 1_000_000);
        c.store().unwrap();
    }
    let mut c2 = open(dir.path(), cfg);
    assert!(c2.get(7, 0));
}
