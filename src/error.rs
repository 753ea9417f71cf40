//! DistMatmulError: unified error type for dist-matmul public APIs.
//!
//! Every fallible operation in the crate surfaces one of these variants;
//! nothing is retried and nothing degrades to a partial result.

use thiserror::Error;

/// Unified error type for dist-matmul operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistMatmulError {
    /// The participant group must contain at least one process.
    #[error("participant group is empty (group size must be at least 1)")]
    EmptyGroup,
    /// Square matrices need at least one row.
    #[error("matrix dimension must be at least 1")]
    ZeroDimension,
    /// The encoded readiness announcement exceeds the wire cap.
    #[error("announcement payload is {len} bytes, exceeding the {max}-byte cap")]
    AnnouncementTooLong { len: usize, max: usize },
    /// The message-passing environment could not be brought up.
    #[error("message-passing environment failed to initialize")]
    BootstrapFailed,
    /// Addressed a participant outside the group.
    #[error("no transfer path to participant {peer}")]
    PeerUnreachable { peer: usize },
    /// The peer went away mid-transfer.
    #[error("participant {peer} disconnected during a transfer")]
    Disconnected { peer: usize },
    /// A received payload did not match the expected fixed size.
    #[error("payload from participant {peer} was {found} bytes, expected {expected}")]
    PayloadSizeMismatch {
        peer: usize,
        expected: usize,
        found: usize,
    },
    /// A readiness announcement could not be decoded.
    #[error("announcement from participant {peer} could not be decoded: {reason}")]
    MalformedAnnouncement { peer: usize, reason: String },
    /// Operand or scratch shapes are incompatible.
    #[error("matrix shapes are incompatible: {context}")]
    ShapeMismatch { context: &'static str },
    /// A row block reaches past the matrix boundary.
    #[error("row block [{start}, {end}) extends past a matrix of {rows} rows")]
    BlockOutOfBounds {
        start: usize,
        end: usize,
        rows: usize,
    },
    /// A row index reaches past the matrix boundary.
    #[error("row {row} out of bounds for a matrix of {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },
}
