//! Validation utilities for construction and query parameter bounds checking

use crate::common::{Result, SketchError};

/// Validate that a `usize` parameter (bucket count `NB` or bucket capacity `B`) is positive
pub fn validate_positive_usize(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(SketchError::InvalidParameter {
            param: name.to_string(),
            value: value.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate the Hot Filter eviction threshold `E` (must be positive)
pub fn validate_eviction_threshold(e: u64) -> Result<()> {
    if e == 0 {
        return Err(SketchError::InvalidParameter {
            param: "eviction_threshold".to_string(),
            value: e.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate the KLL compaction decay factor `c` (must be in the open interval (0.5, 1))
pub fn validate_compaction_factor(c: f64) -> Result<()> {
    if !(c > 0.5 && c < 1.0) {
        return Err(SketchError::InvalidParameter {
            param: "c".to_string(),
            value: c.to_string(),
            constraint: "must be in range (0.5, 1.0) (exclusive)".to_string(),
        });
    }
    Ok(())
}

/// Validate the KLL top-compactor target capacity `k` (must be positive)
pub fn validate_top_capacity(k: u32) -> Result<()> {
    if k == 0 {
        return Err(SketchError::InvalidParameter {
            param: "k".to_string(),
            value: k.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate a quantile target `delta` (must be in the closed interval [0, 1])
pub fn validate_quantile_delta(delta: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&delta) {
        return Err(SketchError::InvalidParameter {
            param: "delta".to_string(),
            value: delta.to_string(),
            constraint: "must be in range [0.0, 1.0] (inclusive)".to_string(),
        });
    }
    Ok(())
}
