//! Hot Filter: a fixed-size, hash-bucketed exact counter cache for the warm
//! head of the stream
//!
//! The filter holds `NB` buckets, each a small fixed-capacity array of
//! `(value, count)` entries. A value's bucket is chosen by hashing it with
//! [`splitmix64`](crate::common::hash::splitmix64); within a bucket, values
//! are found by linear scan (`B` is expected to be small). When a bucket is
//! full and a new value arrives, the filter "votes" on whether the
//! incoming value is hot enough to warrant evicting the bucket's coldest
//! entry: the vote count accumulates across misses and is compared, via
//! round-half-away-from-zero division against the minimum count currently
//! held, to an eviction threshold `E`. Below threshold the incoming value
//! (and its frequency) is rejected straight to the cold tier; at or above
//! threshold the coldest entry is evicted to the cold tier and the
//! incoming value takes its place.

use crate::common::hash::splitmix64;
use crate::common::validation::{validate_eviction_threshold, validate_positive_usize};
use crate::common::Result;

/// A fixed-capacity array of `(value, count)` entries sharing a hash bucket
struct Bucket {
    items: Vec<u64>,
    counts: Vec<u64>,
    vote: u64,
    capacity: usize,
}

impl Bucket {
    fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            vote: 0,
            capacity,
        }
    }

    /// Position of `value` in this bucket, if present
    fn find(&self, value: u64) -> Option<usize> {
        self.items.iter().position(|&v| v == value)
    }

    /// Index of the entry with the smallest count
    ///
    /// Only ever called on a full bucket, so `items` is never empty.
    fn find_minimum(&self) -> usize {
        self.counts
            .iter()
            .enumerate()
            .min_by_key(|&(_, &count)| count)
            .map(|(idx, _)| idx)
            .expect("find_minimum called on an empty bucket")
    }

    fn memory(&self) -> usize {
        self.items.len() * std::mem::size_of::<u64>() + self.counts.len() * std::mem::size_of::<u64>() + std::mem::size_of::<Self>()
    }
}

/// Outcome of a [`HotFilter::insert`] that could not be absorbed into the
/// hot tier as-is, and must be forwarded to the cold tier
pub struct Displaced {
    /// The value to forward to the cold tier
    pub value: u64,
    /// Its multiplicity
    pub frequency: u64,
}

/// The hash-bucketed exact counter cache
pub struct HotFilter {
    buckets: Vec<Bucket>,
    n_buckets: usize,
    eviction_threshold: u64,
}

impl HotFilter {
    /// Creates a new Hot Filter with `nb` buckets of capacity `b` each and
    /// eviction threshold `e`
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidParameter` if `nb == 0`, `b == 0`, or
    /// `e == 0`.
    pub fn new(nb: usize, b: usize, e: u64) -> Result<Self> {
        validate_positive_usize("NB", nb)?;
        validate_positive_usize("B", b)?;
        validate_eviction_threshold(e)?;

        Ok(Self {
            buckets: (0..nb).map(|_| Bucket::new(b)).collect(),
            n_buckets: nb,
            eviction_threshold: e,
        })
    }

    fn bucket_index(&self, value: u64) -> usize {
        (splitmix64(value) % self.n_buckets as u64) as usize
    }

    /// Inserts `value` with multiplicity `frequency`
    ///
    /// Returns `None` when the hot tier fully absorbed the insert (an
    /// existing entry's count grew, or an empty slot was filled). Returns
    /// `Some` carrying whichever `(value, frequency)` pair must now be
    /// routed to the cold tier: either the incoming value itself (vote
    /// below threshold) or the bucket's evicted coldest entry (vote at or
    /// above threshold).
    pub fn insert(&mut self, value: u64, frequency: u64) -> Option<Displaced> {
        let idx = self.bucket_index(value);
        let bucket = &mut self.buckets[idx];

        if let Some(pos) = bucket.find(value) {
            bucket.counts[pos] = bucket.counts[pos].saturating_add(frequency);
            return None;
        }

        if bucket.items.len() < bucket.capacity {
            bucket.items.push(value);
            bucket.counts.push(frequency);
            return None;
        }

        bucket.vote += 1;
        let lowest_idx = bucket.find_minimum();
        let min_count = bucket.counts[lowest_idx];
        // round(vote / min_count), "round half away from zero" on the
        // true rational quotient (both operands are non-negative, so this
        // is equivalent to round-half-up): (2*vote + min_count) / (2*min_count)
        let condition = (2 * bucket.vote + min_count) / (2 * min_count);

        if condition < self.eviction_threshold {
            Some(Displaced { value, frequency })
        } else {
            bucket.vote = 0;
            let evicted_value = bucket.items[lowest_idx];
            let evicted_count = bucket.counts[lowest_idx];
            bucket.items[lowest_idx] = value;
            bucket.counts[lowest_idx] = frequency;
            Some(Displaced {
                value: evicted_value,
                frequency: evicted_count,
            })
        }
    }

    /// Returns the number of resident elements less than or equal to `value`
    pub fn rank(&self, value: u64) -> u64 {
        let mut total = 0u64;
        for bucket in &self.buckets {
            for (i, &v) in bucket.items.iter().enumerate() {
                if v <= value {
                    total += bucket.counts[i];
                }
            }
        }
        total
    }

    /// Materializes every resident `(value, count)` pair, sorted by value
    pub fn snapshot(&self) -> Vec<(u64, u64)> {
        let mut data: Vec<(u64, u64)> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.items.iter().copied().zip(bucket.counts.iter().copied()))
            .collect();
        data.sort_unstable_by_key(|&(v, _)| v);
        data
    }

    /// Returns the bytes currently occupied by the filter's buckets
    pub fn memory(&self) -> usize {
        let mut mem = std::mem::size_of::<Self>();
        for bucket in &self.buckets {
            mem += bucket.memory() + std::mem::size_of::<Bucket>();
        }
        mem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invalid() {
        assert!(HotFilter::new(0, 2, 4).is_err());
        assert!(HotFilter::new(4, 0, 4).is_err());
        assert!(HotFilter::new(4, 2, 0).is_err());
    }

    #[test]
    fn test_insert_new_value_fills_empty_slot() {
        let mut filter = HotFilter::new(4, 2, 4).unwrap();
        assert!(filter.insert(10, 1).is_none());
        assert_eq!(filter.rank(10), 1);
    }

    #[test]
    fn test_insert_existing_value_increments_count() {
        let mut filter = HotFilter::new(4, 2, 4).unwrap();
        assert!(filter.insert(10, 1).is_none());
        assert!(filter.insert(10, 1).is_none());
        assert_eq!(filter.rank(10), 2);
    }

    #[test]
    fn test_low_vote_ratio_rejects_to_cold_tier() {
        // NB=1 forces every value into the same bucket; B=1 means the
        // single slot fills immediately and every later distinct value is
        // a miss. With E=1000 the vote/min ratio never reaches threshold.
        let mut filter = HotFilter::new(1, 1, 1000).unwrap();
        assert!(filter.insert(1, 1).is_none());
        let displaced = filter.insert(2, 1).expect("bucket is full, must displace");
        assert_eq!(displaced.value, 2);
        assert_eq!(displaced.frequency, 1);
        // the resident entry is untouched
        assert_eq!(filter.rank(1), 1);
    }

    #[test]
    fn test_high_vote_ratio_evicts_coldest_entry() {
        let mut filter = HotFilter::new(1, 1, 1).unwrap();
        assert!(filter.insert(1, 1).is_none());
        let displaced = filter.insert(2, 1).expect("must evict or reject");
        // threshold 1 evicts on the very first miss (vote=1, min=1, 1/1=1 >= 1)
        assert_eq!(displaced.value, 1);
        assert_eq!(displaced.frequency, 1);
        assert_eq!(filter.rank(2), 1);
        assert_eq!(filter.rank(1), 0);
    }

    #[test]
    fn test_cooling_ratio_rounds_half_away_from_zero() {
        // resident entry has count 4; threshold 2. vote/min == 1.5 (the
        // first half-integer quotient reachable) lands at vote=6. Floor
        // division would read 1.5 as 1 and keep rejecting; round-half-
        // away-from-zero reads it as 2, meeting E and evicting the
        // resident on the sixth miss rather than later.
        let mut filter = HotFilter::new(1, 1, 2).unwrap();
        assert!(filter.insert(1, 4).is_none());
        for (miss, v) in (2..=6u64).enumerate() {
            let displaced = filter.insert(v, 1).expect("bucket is full");
            assert_eq!(displaced.value, v, "miss #{miss}: newcomer should be rejected, not the resident");
        }
        assert_eq!(filter.rank(1), 4);

        // sixth miss: vote=6, min_count=4, round(6/4) = round(1.5) = 2 >= E=2.
        let displaced = filter.insert(7, 1).expect("bucket is full");
        assert_eq!(displaced.value, 1);
        assert_eq!(displaced.frequency, 4);
    }

    #[test]
    fn test_snapshot_sorted_by_value() {
        let mut filter = HotFilter::new(4, 4, 4).unwrap();
        for v in [30, 10, 20] {
            filter.insert(v, 1);
        }
        let snap = filter.snapshot();
        let values: Vec<u64> = snap.iter().map(|&(v, _)| v).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
    }
}
