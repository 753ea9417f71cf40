//! Worker-side orchestration (every participant other than rank 0).

use log::debug;

use crate::comm::Communicator;
use crate::config::JobConfig;
use crate::coordinator::COORDINATOR_RANK;
use crate::dense::{Acc, DenseMatrix, Elem};
use crate::error::DistMatmulError;
use crate::multiply::multiply_block;
use crate::partition::{block_height, owned_block};
use crate::wire::{
    self, Announcement, TAG_ANNOUNCE, TAG_MATRIX_A, TAG_MATRIX_B, TAG_RESULT_BLOCK,
};

/// Run the worker side of the protocol: announce, receive both inputs,
/// multiply the owned row block, send the block back. A fixed four-step
/// sequence with no retries; any transfer failure aborts the participant.
pub fn run<C: Communicator>(comm: &C, cfg: JobConfig) -> Result<(), DistMatmulError> {
    let dim = cfg.dim;
    if dim == 0 {
        return Err(DistMatmulError::ZeroDimension);
    }
    let parts = comm.size();
    let rank = comm.rank();
    let height = block_height(dim, parts)?;

    let hello = Announcement {
        rank,
        host: comm.processor_name(),
    };
    comm.send(COORDINATOR_RANK, TAG_ANNOUNCE, &hello.encode()?)?;

    let mut a = DenseMatrix::<Elem>::zeros(dim, dim);
    let mut b = DenseMatrix::<Elem>::zeros(dim, dim);
    wire::recv_elems_into(comm, COORDINATOR_RANK, TAG_MATRIX_A, a.as_mut_slice())?;
    wire::recv_elems_into(comm, COORDINATOR_RANK, TAG_MATRIX_B, b.as_mut_slice())?;

    let mut d = DenseMatrix::<Acc>::zeros(height, dim);
    let own = owned_block(dim, parts, rank)?;
    multiply_block(&a, &b, own, &mut d)?;
    debug!(
        "participant {rank} multiplied rows [{}, {})",
        own.start, own.end
    );

    // The whole scratch goes back, trailing padding rows included, so the
    // payload size is uniform across ranks.
    wire::send_elems(comm, COORDINATOR_RANK, TAG_RESULT_BLOCK, d.as_slice())
}
