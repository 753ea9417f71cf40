//! Coordinator-side orchestration (the participant with rank 0).

use std::time::{Duration, Instant};

use log::debug;

use crate::comm::Communicator;
use crate::config::JobConfig;
use crate::dense::{Acc, DenseMatrix, Elem};
use crate::error::DistMatmulError;
use crate::multiply::multiply_block;
use crate::partition::{block_height, owned_block};
use crate::wire::{
    self, Announcement, TAG_ANNOUNCE, TAG_MATRIX_A, TAG_MATRIX_B, TAG_RESULT_BLOCK,
};

/// The coordinator is always the participant with rank 0.
pub const COORDINATOR_RANK: usize = 0;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Side length of the multiplied matrices.
    pub dim: usize,
    /// Number of participants, coordinator included.
    pub participants: usize,
    /// Wall-clock time of the distributed phase: seeding through assembly.
    pub elapsed: Duration,
    /// The assembled product.
    pub result: DenseMatrix<Acc>,
}

/// Run the coordinator side of the protocol and return the assembled
/// product.
///
/// Seeds both inputs, distributes them, multiplies its own row block,
/// collects every worker's block in increasing rank order, and assembles
/// the result with boundary clipping. Any transfer failure aborts the run;
/// there is no retry and no partial result.
pub fn run<C: Communicator>(comm: &C, cfg: JobConfig) -> Result<RunReport, DistMatmulError> {
    let dim = cfg.dim;
    if dim == 0 {
        return Err(DistMatmulError::ZeroDimension);
    }
    let parts = comm.size();
    let height = block_height(dim, parts)?;

    println!(
        "### Process {} from {} ###",
        COORDINATOR_RANK,
        comm.processor_name()
    );

    // Connectivity handshake: one blocking receive per worker, in rank order.
    for peer in 1..parts {
        let raw = comm.recv(peer, TAG_ANNOUNCE)?;
        let hello = Announcement::decode(peer, &raw)?;
        println!("### Process {} from {} ###", hello.rank, hello.host);
    }

    let clock = Instant::now();

    let a = DenseMatrix::<Elem>::ramp(dim);
    let b = DenseMatrix::<Elem>::ramp(dim);

    // Full copies of both inputs go out before anyone starts computing.
    for peer in 1..parts {
        wire::send_elems(comm, peer, TAG_MATRIX_A, a.as_slice())?;
        wire::send_elems(comm, peer, TAG_MATRIX_B, b.as_slice())?;
        debug!("inputs sent to participant {peer}");
    }

    // Own shard, through the same clipped path the workers use.
    let mut d = DenseMatrix::<Acc>::zeros(height, dim);
    let own = owned_block(dim, parts, COORDINATOR_RANK)?;
    multiply_block(&a, &b, own, &mut d)?;

    // Ordered, boundary-clipped assembly. Collecting in increasing rank
    // order is what lets one scratch block serve every worker in turn.
    let mut c = DenseMatrix::<Acc>::zeros(dim, dim);
    for rank in 0..parts {
        let block = owned_block(dim, parts, rank)?;
        if rank >= 1 {
            wire::recv_elems_into(comm, rank, TAG_RESULT_BLOCK, d.as_mut_slice())?;
        }
        c.copy_rows_from(&d, 0, block.start, block.len())?;
        debug!(
            "rows [{}, {}) assembled from participant {rank}",
            block.start, block.end
        );
    }

    let elapsed = clock.elapsed();
    println!("------------ ------------ ------------");
    println!("Multiplication using {parts} processes is done.");
    println!("Execute time: {:.6} sec", elapsed.as_secs_f64());

    Ok(RunReport {
        dim,
        participants: parts,
        elapsed,
        result: c,
    })
}
