//! Cooled Sketch: a two-tier facade pairing the Hot Filter with a Classic
//! KLL Compactor Stack
//!
//! Every insert first goes through the [`HotFilter`]. Only values the hot
//! tier displaces — rejected due to a cold vote ratio, or evicted as the
//! coldest entry in a full bucket — ever reach the [`CompactorStack`].
//! `rank` and `quantile` answer over both tiers combined.

use crate::common::validation::validate_quantile_delta;
use crate::common::{Result, SketchError};
use crate::hotfilter::HotFilter;
use crate::kll::CompactorStack;

/// Which tier a merged quantile scan most recently advanced through
enum LastPicked {
    Hot,
    Kll,
    None,
}

/// A quantile sketch combining an exact hot-value cache with a
/// probabilistic tail approximation
pub struct CooledSketch {
    hot: HotFilter,
    kll: CompactorStack,
}

impl CooledSketch {
    /// Creates a new Cooled Sketch
    ///
    /// # Arguments
    ///
    /// * `nb` - Number of Hot Filter buckets
    /// * `b` - Entries per bucket
    /// * `e` - Eviction threshold (vote/min-count ratio that triggers eviction)
    /// * `k` - Target capacity of the KLL stack's top compactor
    /// * `c` - KLL capacity decay factor, in (0.5, 1.0)
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidParameter` if any argument is outside
    /// its valid range.
    pub fn new(nb: usize, b: usize, e: u64, k: u32, c: f64) -> Result<Self> {
        Ok(Self {
            hot: HotFilter::new(nb, b, e)?,
            kll: CompactorStack::new(k, c)?,
        })
    }

    /// Inserts a single observation of `value`
    pub fn insert(&mut self, value: u64) {
        self.insert_with_frequency(value, 1);
    }

    /// Inserts `value` with multiplicity `frequency`
    ///
    /// A `frequency` of zero is a no-op.
    pub fn insert_with_frequency(&mut self, value: u64, frequency: u64) {
        if frequency == 0 {
            return;
        }
        if let Some(displaced) = self.hot.insert(value, frequency) {
            self.kll.insert_n(displaced.value, displaced.frequency);
        }
    }

    /// Returns the estimated number of observed elements less than or
    /// equal to `value`
    pub fn rank(&self, value: u64) -> u64 {
        self.hot.rank(value) + self.kll.rank(value)
    }

    /// Returns the estimated δ-quantile across both tiers
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidParameter` if `delta` is outside
    /// `[0, 1]` or the sketch has never received an insert.
    pub fn quantile(&mut self, delta: f64) -> Result<u64> {
        validate_quantile_delta(delta)?;

        let hot_data = self.hot.snapshot();
        let kll_data = self.kll.snapshot();
        let hot_total: u64 = hot_data.iter().map(|&(_, count)| count).sum();
        let total = hot_total + self.kll.total_weight();

        if total == 0 {
            return Err(SketchError::InvalidParameter {
                param: "delta".to_string(),
                value: delta.to_string(),
                constraint: "sketch is empty".to_string(),
            });
        }

        let target = (delta * total as f64).round() as u64;
        let (hn, kn) = (hot_data.len(), kll_data.len());
        let (mut i, mut j, mut count) = (0usize, 0usize, 0u64);
        let mut last = LastPicked::None;

        while i < hn || j < kn {
            if count <= target {
                if i < hn && j < kn {
                    if hot_data[i].0 <= kll_data[j].0 {
                        count += hot_data[i].1;
                        i += 1;
                        last = LastPicked::Hot;
                    } else {
                        count += kll_data[j].1;
                        j += 1;
                        last = LastPicked::Kll;
                    }
                } else if i >= hn {
                    count += kll_data[j].1;
                    j += 1;
                    last = LastPicked::Kll;
                } else {
                    count += hot_data[i].1;
                    i += 1;
                    last = LastPicked::Hot;
                }
            } else {
                return Ok(match last {
                    LastPicked::Hot => hot_data[i - 1].0,
                    LastPicked::Kll => kll_data[j - 1].0,
                    LastPicked::None => {
                        unreachable!("count starts at 0 and target is never negative")
                    }
                });
            }
        }

        Ok(match last {
            LastPicked::Hot => hot_data[hn - 1].0,
            LastPicked::Kll => kll_data[kn - 1].0,
            LastPicked::None => unreachable!("total > 0 implies at least one pick"),
        })
    }

    /// Returns the bytes currently occupied by both tiers
    pub fn memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.hot.memory() + self.kll.memory()
    }
}
