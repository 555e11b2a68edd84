// Simple benchmarks using criterion instead of unstable test feature
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tlfu_pagecache::{Cache, CacheConfig};

// Benchmark configuration
const CACHE_SIZE: usize = 1_000;
const NUM_OPERATIONS: usize = 10_000;

fn make_cache(dir: &std::path::Path, lru_size: usize) -> Cache {
    let config = CacheConfig {
        large_page_shift: 4,
        small_page_shift: 3,
        small_page_size_shift: 6,
        lru_size,
        tlfu_size: CACHE_SIZE as u32,
        sample_size: (CACHE_SIZE as u32) * 10,
        use_door_keeper: false,
        loaded_page_number: 8,
        large_page_period: 2_000,
        frequency_threshold: 8,
        ttl_eviction_prob: 0.0,
        bernoulli_seed: 0,
    };
    Cache::new(dir, config).unwrap()
}

// Simple linear congruential generator for reproducible benchmarks
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345) & 0x7fffffff;
        self.state
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (0x7fffffff as f64)
    }
}

// Helper function to generate Zipf-like distribution
fn zipf_sample(n: usize, skew: f64) -> Vec<u32> {
    let mut rng = SimpleRng::new(42);

    let mut norm: f64 = 0.0;
    for i in 1..=n {
        norm += 1.0 / (i as f64).powf(skew);
    }

    let mut samples = Vec::with_capacity(NUM_OPERATIONS);
    for _ in 0..NUM_OPERATIONS {
        let u: f64 = rng.next_f64();
        let mut sum: f64 = 0.0;
        let mut sample: usize = 1;

        while sample <= n {
            sum += 1.0 / (sample as f64).powf(skew) / norm;
            if sum >= u {
                break;
            }
            sample += 1;
        }

        samples.push((sample.saturating_sub(1) % n) as u32);
    }

    samples
}

fn benchmark_cache_mixed_access(c: &mut Criterion) {
    let samples = zipf_sample(CACHE_SIZE * 2, 0.8);

    let mut group = c.benchmark_group("Cache Mixed Access");

    group.bench_function("with LRU window", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            let mut cache = make_cache(dir.path(), CACHE_SIZE / 10);
            for &key in &samples {
                if key % 4 == 0 {
                    // 25% updates
                    black_box(cache.update(key, 1_000_000));
                } else {
                    // 75% gets
                    black_box(cache.get(key, 0));
                }
            }
        });
    });

    group.bench_function("no LRU window", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            let mut cache = make_cache(dir.path(), 0);
            for &key in &samples {
                if key % 4 == 0 {
                    black_box(cache.update(key, 1_000_000));
                } else {
                    black_box(cache.get(key, 0));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_small_page_scan(c: &mut Criterion) {
    use tlfu_pagecache::small_page::SmallPage;
    use tlfu_pagecache::tinylfu::TinyLfu;

    let mut page = SmallPage::new(1024);
    let mut t = TinyLfu::new(1024, 100_000, None);
    for k in 0..1024u32 {
        page.update(k, 1_000_000, &mut t);
    }

    let mut group = c.benchmark_group("Small Page Scan");
    group.bench_function("get hit near tail", |b| {
        b.iter(|| black_box(page.get(1023, 0, &mut t)));
    });
    group.bench_function("get miss", |b| {
        b.iter(|| black_box(page.get(999_999, 0, &mut t)));
    });
    group.finish();
}

criterion_group!(benches, benchmark_cache_mixed_access, benchmark_small_page_scan);
criterion_main!(benches);
