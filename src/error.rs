//! Error types.
//!
//! Building a cache is the only fallible step. Every operation on a live
//! cache is total: a missing key is reported as `None` or `false`.

use thiserror::Error;

/// Errors raised while constructing a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The supplied configuration cannot produce a working cache.
    #[error("invalid cache configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the configuration.
        reason: &'static str,
    },
}

/// Result alias used by cache constructors.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_message() {
        let err = Error::InvalidConfiguration {
            reason: "capacity must be positive",
        };
        assert_eq!(
            err.to_string(),
            "invalid cache configuration: capacity must be positive"
        );
    }
}
