//! cooled_kll: a two-tier heavy-tail quantile sketch
//!
//! Approximates the distribution of 64-bit unsigned integer values observed
//! in a very large stream using sub-linear space, answering two queries
//! over the cumulative stream: [`CooledSketch::rank`] (how many observed
//! values are ≤ a given value) and [`CooledSketch::quantile`] (a value
//! whose rank is approximately the requested fraction of the stream).
//!
//! The stream is assumed heavy-tailed: a small fraction of values dominate
//! by frequency, the rest are long-tail singletons. Two tiers cooperate to
//! exploit that shape:
//!
//! - [`hotfilter::HotFilter`] — a fixed array of hash-bucketed exact
//!   counters holding the warm head of the distribution with no estimation
//!   error at all, as long as a value stays resident.
//! - [`kll::CompactorStack`] — a Classic KLL compactor stack (Karnin, Lang,
//!   Liberty 2016) giving an ε-approximate rank guarantee over whatever the
//!   Hot Filter cools off onto it.
//!
//! [`cooled::CooledSketch`] is the public facade: it routes every `insert`
//! through the Hot Filter and answers `rank`/`quantile` with a merged scan
//! across both tiers.
//!
//! # Choosing parameters
//!
//! `NB` (bucket count) and `B` (per-bucket capacity) bound how many
//! distinct values can stay exactly counted at once (`NB * B`); size them
//! to the expected number of genuinely hot values. `E` controls how
//! reluctant the filter is to evict a resident — larger `E` favors
//! incumbents, smaller `E` adapts faster to a shifting head. `k` and `c`
//! are the usual KLL accuracy/capacity-decay knobs: larger `k` and `c`
//! closer to 1 trade memory for a tighter ε on the cold tier.
//!
//! ```
//! use cooled_kll::CooledSketch;
//!
//! let mut sketch = CooledSketch::new(64, 4, 16, 200, 0.7).unwrap();
//! for v in 1..=10_000u64 {
//!     sketch.insert(v);
//! }
//! let median = sketch.quantile(0.5).unwrap();
//! assert!(median > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod common;
pub mod cooled;
pub mod hotfilter;
pub mod kll;

pub use common::{Result, SketchError};
pub use cooled::CooledSketch;
pub use hotfilter::HotFilter;
pub use kll::CompactorStack;

/// Error types and result aliases for sketch operations
pub mod error {
    pub use crate::common::{Result, SketchError};
}
