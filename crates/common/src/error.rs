//! Decode errors for binary genomes.

use thiserror::Error;

/// Errors that occur while decoding a binary genome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte stream length is not a multiple of 8.
    #[error("invalid byte stream length: {0} (must be multiple of 8)")]
    InvalidLength(usize),
}
