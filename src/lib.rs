//! # dist-matmul
//!
//! dist-matmul multiplies two dense square matrices across a fixed-size
//! group of cooperating processes using row-block partitioning and a
//! coordinator/worker message-passing protocol.
//!
//! ## Features
//! - Contiguous row-major matrix storage that travels as one typed transfer
//! - Pure partition scheduling: every participant derives its clipped row
//!   block from the matrix size and group size alone, with no negotiation
//! - Pluggable communication backends (single-participant, in-process
//!   threads, MPI) behind one blocking trait
//! - Boundary-clipped result assembly that stays correct when the row count
//!   does not divide evenly across the group
//!
//! ## Determinism
//!
//! Inputs are seeded with a fixed row-major ramp, the local multiplier is
//! pure, and results are collected in increasing rank order, so a run's
//! output depends only on the matrix dimension and the group size.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! dist-matmul = "0.1"
//! # For real process groups:
//! # features = ["mpi-support"]
//! ```
//!
//! With `mpi-support` enabled the crate ships a binary:
//! `mpiexec -n 4 dist-matmul 400`.

pub mod comm;
pub mod config;
pub mod coordinator;
pub mod dense;
pub mod error;
pub mod multiply;
pub mod partition;
pub mod wire;
pub mod worker;

/// A convenient prelude to import the most-used traits and types.
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::comm::MpiComm;
    pub use crate::comm::{Communicator, LocalComm, LocalExchange, NoComm};
    pub use crate::config::JobConfig;
    pub use crate::coordinator::{COORDINATOR_RANK, RunReport};
    pub use crate::dense::{Acc, DenseMatrix, Elem};
    pub use crate::error::DistMatmulError;
    pub use crate::multiply::multiply_block;
    pub use crate::partition::{RowBlock, block_height, owned_block};
}
