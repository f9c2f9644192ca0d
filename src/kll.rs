//! Classic KLL Compactor Stack: near-optimal quantile approximation for the
//! cooled-off tail of the stream
//!
//! The stack is a sequence of sorted buffers ("compactors"), indexed so
//! level 0 is the top (largest target capacity, highest per-element
//! weight) and level `h` is the bottom (smallest capacity, weight 1 — the
//! level raw inserts land on). Each level's capacity shrinks geometrically
//! from the top down by a factor `c`; when a level reaches capacity it is
//! sorted and thinned by a random parity bit, with the survivors promoted
//! toward the top. When the top level itself overflows, the stack grows
//! one level deeper instead, doubling the weight every element already at
//! the top represents.
//!
//! # Time Complexity
//!
//! - Insert: O(1) amortized, O(log N) worst case during a compaction cascade
//! - Bulk insert: O(log f) for multiplicity f
//! - Rank: O(k log(N/k))
//! - Quantile: O(k log(N/k)) (dominated by the snapshot sort)
//!
//! # Space Complexity
//!
//! O(k log(N/k))
//!
//! # References
//!
//! - Karnin, Lang, Liberty, "Optimal Quantile Approximation in Streams" (2016)

use crate::common::validation::{validate_compaction_factor, validate_quantile_delta, validate_top_capacity};
use crate::common::{Result, SketchError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A growable stack of sorted compactors approximating the cumulative
/// distribution of all values ever pushed onto it.
///
/// Level 0 is the top (largest capacity); level `height` is the bottom,
/// which receives every raw insert. `height` only grows over the life of
/// the stack.
pub struct CompactorStack {
    /// Target capacity of the top compactor
    k: u32,
    /// Decay factor shrinking capacities from top to bottom, 0.5 < c < 1
    c: f64,
    /// levels[0] is the top, levels[height] is the bottom
    levels: Vec<Vec<u64>>,
    /// Current height (index of the bottom level); only grows
    height: usize,
    /// Total weight recorded by the last `snapshot()` call
    total_weight: u64,
    /// Long-lived generator for compaction parity bits
    rng: SmallRng,
}

impl CompactorStack {
    /// Creates a new, empty compactor stack
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidParameter` if `k == 0` or `c` is not in
    /// the open interval (0.5, 1.0).
    pub fn new(k: u32, c: f64) -> Result<Self> {
        validate_top_capacity(k)?;
        validate_compaction_factor(c)?;

        Ok(Self {
            k,
            c,
            levels: vec![Vec::new()],
            height: 0,
            total_weight: 0,
            rng: SmallRng::from_os_rng(),
        })
    }

    /// Returns the current height `h` (index of the bottom level)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Inserts a single value, triggering a compaction cascade if needed
    pub fn insert(&mut self, v: u64) {
        self.levels[self.height].push(v);
        self.compact();
    }

    /// Inserts `v` with multiplicity `f` in O(log f) work
    ///
    /// Decomposes `f` by repeatedly taking the largest power of two that
    /// still divides the remaining multiplicity (clamped to a level whose
    /// weight actually exists in the stack) and pushing `v` that many
    /// times onto the matching level. A no-op when `f == 0`.
    pub fn insert_n(&mut self, v: u64, f: u64) {
        let mut rest = f;
        while rest > 0 {
            let mut exponent = (63 - rest.leading_zeros()) as usize;
            if exponent > self.height {
                exponent = self.height;
            }
            let w = 1u64 << exponent;
            let idx = self.height - exponent;
            while rest >= w {
                self.levels[idx].push(v);
                rest -= w;
            }
        }
        self.compact();
    }

    /// Returns the estimated number of observed elements less than or
    /// equal to `v`
    pub fn rank(&self, v: u64) -> u64 {
        let mut total = 0u64;
        for (idx, level) in self.levels.iter().enumerate() {
            let weight = 1u64 << (self.height - idx);
            let count = level.iter().filter(|&&x| x <= v).count() as u64;
            total += count * weight;
        }
        total
    }

    /// Materializes the entire stack as a sorted sequence of (value,
    /// weight) pairs and records the total weight for `total_weight()`
    pub fn snapshot(&mut self) -> Vec<(u64, u64)> {
        let mut data = Vec::new();
        let mut total = 0u64;
        for (idx, level) in self.levels.iter().enumerate() {
            let weight = 1u64 << (self.height - idx);
            for &v in level {
                data.push((v, weight));
                total += weight;
            }
        }
        data.sort_unstable_by_key(|&(v, _)| v);
        self.total_weight = total;
        data
    }

    /// Returns N, the estimated number of observed elements, as recorded
    /// by the last `snapshot()` call
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the estimated δ-quantile
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidParameter` if `delta` is outside
    /// `[0, 1]` or the stack is empty.
    pub fn quantile(&mut self, delta: f64) -> Result<u64> {
        validate_quantile_delta(delta)?;
        let data = self.snapshot();
        if data.is_empty() {
            return Err(SketchError::InvalidParameter {
                param: "delta".to_string(),
                value: delta.to_string(),
                constraint: "sketch is empty".to_string(),
            });
        }

        let target = (delta * self.total_weight as f64).round() as u64;
        let mut cumulative = 0u64;
        for (i, &(v, weight)) in data.iter().enumerate() {
            cumulative += weight;
            if cumulative > target {
                return Ok(if i == 0 { v } else { data[i - 1].0 });
            }
        }
        Ok(data.last().unwrap().0)
    }

    /// Returns the bytes currently occupied by the stack's buffers
    pub fn memory(&self) -> usize {
        let mut mem = std::mem::size_of::<Self>();
        for level in &self.levels {
            mem += level.len() * std::mem::size_of::<u64>();
            mem += std::mem::size_of::<Vec<u64>>();
        }
        mem
    }

    /// Capacity of the compactor at array index `idx` (0 = top)
    fn capacity(&self, idx: usize) -> u64 {
        let cap = (self.k as f64) * self.c.powi(idx as i32);
        (cap.round() as u64).max(2)
    }

    /// Walks the stack bottom to top, compacting any level at or beyond
    /// capacity. `height` may grow mid-scan (when the top overflows), so
    /// the index is re-derived from the live height on every step.
    fn compact(&mut self) {
        let mut distance_from_bottom = 0usize;
        loop {
            if distance_from_bottom > self.height {
                break;
            }
            let idx = self.height - distance_from_bottom;
            if (self.levels[idx].len() as u64) >= self.capacity(idx) {
                self.levels[idx].sort_unstable();
                if idx == 0 {
                    let survivors = self.select_survivors(0);
                    self.levels[0] = survivors;
                    self.height += 1;
                    self.levels.push(Vec::new());
                } else {
                    let survivors = self.select_survivors(idx);
                    self.levels[idx].clear();
                    self.levels[idx - 1].extend(survivors);
                }
            }
            distance_from_bottom += 1;
        }
    }

    /// Selects roughly half of the elements at `idx` via a fresh parity
    /// bit, discarding the rest
    fn select_survivors(&mut self, idx: usize) -> Vec<u64> {
        let keep_odd = self.rng.random::<bool>();
        let start = usize::from(keep_odd);
        self.levels[idx].iter().copied().skip(start).step_by(2).collect()
    }
}
