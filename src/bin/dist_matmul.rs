//! MPI entry point: `mpiexec -n <P> dist-matmul [dim]`.
//!
//! Rank 0 coordinates; every other rank works its row block. The dimension
//! defaults to 400 when not given on the command line.

use std::process::ExitCode;

use dist_matmul::comm::{Communicator, MpiComm};
use dist_matmul::config::JobConfig;
use dist_matmul::coordinator::{self, COORDINATOR_RANK};
use dist_matmul::worker;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let dim = match args.get(1) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("usage: {} [dim]", args[0]);
                return ExitCode::from(2);
            }
        },
        None => JobConfig::default().dim,
    };

    let cfg = match JobConfig::new(dim) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("dist-matmul: {e}");
            return ExitCode::from(2);
        }
    };

    let comm = match MpiComm::new() {
        Ok(comm) => comm,
        Err(e) => {
            eprintln!("dist-matmul: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = if comm.rank() == COORDINATOR_RANK {
        coordinator::run(&comm, cfg).map(|_| ())
    } else {
        worker::run(&comm, cfg)
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dist-matmul: rank {} failed: {e}", comm.rank());
            ExitCode::FAILURE
        }
    }
}
