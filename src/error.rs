//! Error type shared by all encoding operations.
use thiserror::Error;

/// A list specifying general encoding errors.
///
/// None of them is recoverable inside the encoder: the current frame encoding has to be
/// abandoned and, if desired, restarted by the caller with corrected parameters.
#[derive(Debug,Clone,Copy,PartialEq,Error)]
pub enum EncoderError {
    /// Caller provided input that violates the operation contract (sizes, ranges, probabilities).
    #[error("contract violation: {0}")]
    ContractViolation(&'static str),
    /// Output would exceed the buffer bound set for the partition.
    #[error("output exceeds partition limit of {limit} bytes")]
    StreamOverrun {
        /// Partition size limit in bytes.
        limit: usize,
    },
    /// Some bug in encoder. It should not happen yet it might.
    #[error("internal encoder error")]
    Bug,
}

/// A specialised `Result` type for encoding operations.
pub type EncoderResult<T> = Result<T, EncoderError>;
