//! Rarity tier roll.

use rand::Rng;
use wildlife_sync_core::RarityBucket;

/// Relative weight of each rarity bucket, most common first.
pub const RARITY_WEIGHTS: [u32; 5] = [40, 30, 20, 10, 5];

/// Sum of [`RARITY_WEIGHTS`].
pub const RARITY_WEIGHT_TOTAL: u32 = 105;

/// Maps a roll in `0..RARITY_WEIGHT_TOTAL` onto its bucket.
///
/// Rolls at or past the total land in the rarest bucket.
#[must_use]
pub fn bucket_for_roll(roll: u32) -> RarityBucket {
    let mut accumulated = 0;
    for (rank, weight) in RARITY_WEIGHTS.iter().enumerate() {
        accumulated += weight;
        if roll < accumulated {
            return RarityBucket::new(rank as i64);
        }
    }
    RarityBucket::new(i64::from(RarityBucket::MAX))
}

/// Rolls a weighted rarity bucket.
pub fn roll_bucket<R>(rng: &mut R) -> RarityBucket
where
    R: Rng + ?Sized,
{
    bucket_for_roll(rng.gen_range(0..RARITY_WEIGHT_TOTAL))
}
