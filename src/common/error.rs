//! Error types for sketch operations

use std::fmt;

/// Errors that can occur during sketch operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// Invalid parameter provided to sketch constructor or operation
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Invalid value provided
        value: String,
        /// Constraint that was violated
        constraint: String,
    },

    /// A 64-bit counter would have overflowed under adversarial multiplicities
    Overflow {
        /// Parameter or counter that would have overflowed
        param: String,
        /// Description of the operation that triggered the overflow
        detail: String,
    },
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}': value '{}' {}",
                    param, value, constraint
                )
            }
            SketchError::Overflow { param, detail } => {
                write!(f, "Overflow in '{}': {}", param, detail)
            }
        }
    }
}

impl std::error::Error for SketchError {}

/// Result type alias for sketch operations
pub type Result<T> = std::result::Result<T, SketchError>;
