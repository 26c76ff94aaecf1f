//! Deterministic per-day random streams.
//!
//! Every draw in the simulation comes from a `SmallRng` derived from the master seed,
//! the calendar date, and a stream index. Nothing carries RNG state across days, so a
//! run resumed from a save draws exactly what an uninterrupted run would have drawn.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::model::SimDate;

/// SplitMix64 finalizer: spreads nearby inputs across the whole seed space.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed for one (date, stream) pair.
pub fn derive_seed(master_seed: u64, date: SimDate, stream: u64) -> u64 {
    let date_key = ((date.year as i64 as u64) << 16) ^ ((date.month as u64) << 8) ^ date.day as u64;
    mix(mix(master_seed ^ mix(date_key)) ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

pub fn day_rng(master_seed: u64, date: SimDate, stream: u64) -> SmallRng {
    SmallRng::seed_from_u64(derive_seed(master_seed, date, stream))
}
