#![allow(dead_code)]

use std::{sync::Mutex, time::Duration};

use once_cell::sync::Lazy;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rankset::RankedSet;

static BASE_SEED: Lazy<u64> = Lazy::new(|| {
    std::env::var("RANKSET_BENCH_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x7d11_5eed_f065_cafe)
});

static RNG_COUNTER: Lazy<Mutex<u64>> = Lazy::new(|| Mutex::new(0));

pub fn usize_env(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

pub fn duration_env(name: &str, default_secs: f64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(default_secs);
    Duration::from_secs_f64(secs)
}

/// Default number of members per benchmark set.
pub fn set_size() -> usize {
    usize_env("RANKSET_BENCH_SIZE", 200_000)
}

#[inline]
pub fn seeded_rng() -> StdRng {
    let mut guard = RNG_COUNTER.lock().unwrap();
    let seed = BASE_SEED.wrapping_add(*guard);
    *guard = guard.wrapping_add(1);
    StdRng::seed_from_u64(seed)
}

pub fn unique_increasing(n: usize) -> Vec<(u32, f32)> {
    (0..n as u32).map(|i| (i, i as f32)).collect()
}

pub fn uniform_random(n: usize, id_range: u32) -> Vec<(u32, f32)> {
    let mut rng = seeded_rng();
    (0..n)
        .map(|_| (rng.gen_range(0..id_range), rng.gen::<f32>()))
        .collect()
}

pub fn same_score(n: usize, score: f32) -> Vec<(u32, f32)> {
    (0..n as u32).map(|i| (i, score)).collect()
}

/// Ids packed into `clusters` dense runs spread over the id space.
pub fn clustered(n: usize, clusters: usize) -> Vec<(u32, f32)> {
    assert!(clusters > 0, "clusters must be > 0");
    let mut rng = seeded_rng();
    let per = n.div_ceil(clusters);
    let gap = (u32::MAX / clusters as u32).max(1);
    let mut out = Vec::with_capacity(n);
    for c in 0..clusters {
        let base = c as u32 * gap;
        for local in 0..per {
            if out.len() >= n {
                break;
            }
            out.push((base + local as u32, rng.gen_range(-1.0..1.0)));
        }
    }
    out
}

pub fn build_set(entries: &[(u32, f32)]) -> RankedSet {
    let set = RankedSet::new();
    for &(id, score) in entries {
        set.insert(id, score);
    }
    set
}

pub fn build_unscored(entries: &[(u32, f32)]) -> RankedSet {
    let set = RankedSet::new();
    set.add(entries.iter().map(|&(id, _)| id));
    set
}

pub fn shuffle(entries: &mut [(u32, f32)]) {
    let mut rng = seeded_rng();
    entries.shuffle(&mut rng);
}
