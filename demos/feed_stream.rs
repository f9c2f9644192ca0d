//! Feeds a synthetic heavy-tailed stream through a [`CooledSketch`] and
//! prints rank/quantile comparisons against the exact answer computed from
//! an in-memory reference multiset.
//!
//! This mirrors the role the source repository's FASTA/k-mer ingestion and
//! CSV experiment driver play for the core sketch: an external collaborator
//! that feeds `insert(value, multiplicity)` and reads back `rank`/
//! `quantile`. It is not part of the crate's public API — run it with:
//!
//! ```text
//! cargo run --example feed_stream
//! ```

use cooled_kll::CooledSketch;

/// A small fraction of distinct values get a large multiplicity (the
/// "head"); the rest are long-tail singletons, mirroring §1's described
/// stream shape.
fn synthetic_heavy_tail_stream(hot_values: u64, hot_multiplicity: u64, tail_values: u64) -> Vec<(u64, u64)> {
    let mut stream = Vec::with_capacity((hot_values + tail_values) as usize);
    for v in 0..hot_values {
        stream.push((v, hot_multiplicity));
    }
    for v in hot_values..(hot_values + tail_values) {
        stream.push((v, 1));
    }
    stream
}

/// Exact rank over the reference multiset: number of (value, count) pairs
/// with value <= target, weighted by count.
fn exact_rank(stream: &[(u64, u64)], target: u64) -> u64 {
    stream.iter().filter(|&&(v, _)| v <= target).map(|&(_, f)| f).sum()
}

/// Exact delta-quantile over the reference multiset.
fn exact_quantile(stream: &[(u64, u64)], delta: f64) -> u64 {
    let mut sorted = stream.to_vec();
    sorted.sort_unstable_by_key(|&(v, _)| v);
    let total: u64 = sorted.iter().map(|&(_, f)| f).sum();
    let target = (delta * total as f64).round() as u64;
    let mut cumulative = 0u64;
    for &(v, f) in &sorted {
        cumulative += f;
        if cumulative > target {
            return v;
        }
    }
    sorted.last().map(|&(v, _)| v).unwrap_or(0)
}

fn main() {
    println!("Cooled KLL demo: synthetic heavy-tailed stream");
    println!("===============================================\n");

    let stream = synthetic_heavy_tail_stream(200, 5_000, 2_000_000);
    println!(
        "stream: {} hot values x {} each, {} long-tail singletons ({} total elements)",
        200,
        5_000,
        2_000_000,
        stream.iter().map(|&(_, f)| f).sum::<u64>()
    );

    let mut sketch = CooledSketch::new(256, 8, 16, 200, 0.7).unwrap();
    for &(v, f) in &stream {
        sketch.insert_with_frequency(v, f);
    }
    println!("sketch memory: {} bytes\n", sketch.memory());

    println!("{:>8} {:>14} {:>14} {:>10}", "delta", "real_q", "est_q", "rank_err");
    for i in 0..=10 {
        let delta = f64::from(i) / 10.0;
        let real_q = exact_quantile(&stream, delta);
        let est_q = sketch.quantile(delta).unwrap();
        let real_rank = exact_rank(&stream, real_q);
        let est_rank = sketch.rank(est_q);
        let rank_err = (real_rank as i128 - est_rank as i128).unsigned_abs();
        println!("{delta:>8.2} {real_q:>14} {est_q:>14} {rank_err:>10}");
    }

    println!("\nhot value rank check (value 0, exactly {} observations):", 5_000);
    println!("  exact rank(0)     = {}", exact_rank(&stream, 0));
    println!("  estimated rank(0) = {}", sketch.rank(0));
}
