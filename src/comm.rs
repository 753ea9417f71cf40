//! Blocking point-to-point message passing between participants.
//!
//! Three backends behind one façade: [`NoComm`] for a single-participant
//! group, [`LocalExchange`]/[`LocalComm`] for running every rank as a thread
//! of one process (what the integration tests use), and [`MpiComm`] for real
//! process groups (feature `mpi-support`).
//!
//! Messages are contiguous byte slices; typed payloads are cast at the call
//! site (see `wire`). Every call blocks the caller until the transfer
//! completes, which is what serializes the protocol per sender-receiver pair.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use crate::error::DistMatmulError;

/// Blocking communication interface (minimal by design).
pub trait Communicator {
    /// Zero-based identifier of this participant.
    fn rank(&self) -> usize;
    /// Total number of participants in the group.
    fn size(&self) -> usize;
    /// Host label used in the readiness handshake.
    fn processor_name(&self) -> String;
    /// Block until `buf` has been handed off to `peer`.
    fn send(&self, peer: usize, tag: u16, buf: &[u8]) -> Result<(), DistMatmulError>;
    /// Block until a message from `peer` fills `buf` exactly.
    fn recv_into(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Result<(), DistMatmulError>;
    /// Block until a message from `peer` arrives, whatever its size.
    fn recv(&self, peer: usize, tag: u16) -> Result<Vec<u8>, DistMatmulError>;
}

/// Single-participant group; any transfer attempt is an error.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn processor_name(&self) -> String {
        "local".into()
    }

    fn send(&self, peer: usize, _tag: u16, _buf: &[u8]) -> Result<(), DistMatmulError> {
        Err(DistMatmulError::PeerUnreachable { peer })
    }

    fn recv_into(&self, peer: usize, _tag: u16, _buf: &mut [u8]) -> Result<(), DistMatmulError> {
        Err(DistMatmulError::PeerUnreachable { peer })
    }

    fn recv(&self, peer: usize, _tag: u16) -> Result<Vec<u8>, DistMatmulError> {
        Err(DistMatmulError::PeerUnreachable { peer })
    }
}

// --- LocalExchange: every rank is a thread of this process ---

/// Mailbox key: (source rank, destination rank, tag).
type Key = (usize, usize, u16);

/// Shared in-process mailbox. One instance per simulated group, so
/// concurrently running groups (e.g. parallel tests) cannot cross-talk.
#[derive(Debug)]
pub struct LocalExchange {
    size: usize,
    mail: DashMap<Key, VecDeque<Bytes>>,
}

impl LocalExchange {
    /// Mailbox for a group of `size` ranks.
    pub fn new(size: usize) -> Result<Arc<Self>, DistMatmulError> {
        if size == 0 {
            return Err(DistMatmulError::EmptyGroup);
        }
        Ok(Arc::new(Self {
            size,
            mail: DashMap::new(),
        }))
    }

    /// Endpoint acting as `rank` within this group.
    pub fn endpoint(self: &Arc<Self>, rank: usize) -> LocalComm {
        LocalComm {
            rank,
            exchange: Arc::clone(self),
        }
    }
}

/// One rank's view of a [`LocalExchange`].
#[derive(Clone, Debug)]
pub struct LocalComm {
    rank: usize,
    exchange: Arc<LocalExchange>,
}

impl LocalComm {
    fn check_peer(&self, peer: usize) -> Result<(), DistMatmulError> {
        if peer >= self.exchange.size {
            return Err(DistMatmulError::PeerUnreachable { peer });
        }
        Ok(())
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.exchange.size
    }

    fn processor_name(&self) -> String {
        format!("local-{}", self.rank)
    }

    fn send(&self, peer: usize, tag: u16, buf: &[u8]) -> Result<(), DistMatmulError> {
        self.check_peer(peer)?;
        self.exchange
            .mail
            .entry((self.rank, peer, tag))
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
        Ok(())
    }

    fn recv(&self, peer: usize, tag: u16) -> Result<Vec<u8>, DistMatmulError> {
        self.check_peer(peer)?;
        let key = (peer, self.rank, tag);
        loop {
            if let Some(mut queue) = self.exchange.mail.get_mut(&key) {
                if let Some(bytes) = queue.pop_front() {
                    return Ok(bytes.to_vec());
                }
            }
            std::thread::yield_now();
        }
    }

    fn recv_into(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Result<(), DistMatmulError> {
        let data = self.recv(peer, tag)?;
        if data.len() != buf.len() {
            return Err(DistMatmulError::PayloadSizeMismatch {
                peer,
                expected: buf.len(),
                found: data.len(),
            });
        }
        buf.copy_from_slice(&data);
        Ok(())
    }
}

// --- MPI backend (feature = "mpi-support") ---

#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use mpi::datatype::Equivalence;
    use mpi::environment::Universe;
    use mpi::point_to_point::{Destination, Source};
    use mpi::topology::{Communicator as _, SimpleCommunicator};

    use super::Communicator;
    use crate::error::DistMatmulError;

    /// MPI-backed communicator. Owns the universe; dropping it finalizes
    /// the environment.
    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialize the MPI environment; call once per process.
        pub fn new() -> Result<Self, DistMatmulError> {
            let universe = mpi::initialize().ok_or(DistMatmulError::BootstrapFailed)?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn processor_name(&self) -> String {
            mpi::environment::processor_name().unwrap_or_else(|_| "unknown".into())
        }

        fn send(&self, peer: usize, tag: u16, buf: &[u8]) -> Result<(), DistMatmulError> {
            if peer >= self.size {
                return Err(DistMatmulError::PeerUnreachable { peer });
            }
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
            Ok(())
        }

        fn recv_into(
            &self,
            peer: usize,
            tag: u16,
            buf: &mut [u8],
        ) -> Result<(), DistMatmulError> {
            if peer >= self.size {
                return Err(DistMatmulError::PeerUnreachable { peer });
            }
            let status = self
                .world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(buf, i32::from(tag));
            let found = status.count(u8::equivalent_datatype()) as usize;
            if found != buf.len() {
                return Err(DistMatmulError::PayloadSizeMismatch {
                    peer,
                    expected: buf.len(),
                    found,
                });
            }
            Ok(())
        }

        fn recv(&self, peer: usize, tag: u16) -> Result<Vec<u8>, DistMatmulError> {
            if peer >= self.size {
                return Err(DistMatmulError::PeerUnreachable { peer });
            }
            let (data, _status) = self
                .world
                .process_at_rank(peer as i32)
                .receive_vec_with_tag::<u8>(i32::from(tag));
            Ok(data)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_roundtrip_two_ranks() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        comm0.send(1, 7, &[1, 2, 3, 4]).unwrap();

        let mut buf = [0u8; 4];
        comm1.recv_into(0, 7, &mut buf).unwrap();
        assert_eq!(&buf, &[1, 2, 3, 4]);
    }

    #[test]
    fn local_messages_queue_in_order_per_pair() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        comm0.send(1, 3, b"first").unwrap();
        comm0.send(1, 3, b"second").unwrap();
        assert_eq!(comm1.recv(0, 3).unwrap(), b"first");
        assert_eq!(comm1.recv(0, 3).unwrap(), b"second");
    }

    #[test]
    fn local_tags_keep_streams_apart() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        comm0.send(1, 1, b"one").unwrap();
        comm0.send(1, 2, b"two").unwrap();
        // receive in the opposite order of sending
        assert_eq!(comm1.recv(0, 2).unwrap(), b"two");
        assert_eq!(comm1.recv(0, 1).unwrap(), b"one");
    }

    #[test]
    fn local_blocking_recv_waits_for_the_sender() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm1 = exchange.endpoint(1);

        let sender = {
            let comm0 = exchange.endpoint(0);
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                comm0.send(1, 9, &[42]).unwrap();
            })
        };
        assert_eq!(comm1.recv(0, 9).unwrap(), vec![42]);
        sender.join().unwrap();
    }

    #[test]
    fn local_size_mismatch_is_an_error() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        comm0.send(1, 5, &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(
            comm1.recv_into(0, 5, &mut buf),
            Err(DistMatmulError::PayloadSizeMismatch {
                peer: 0,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn unknown_peer_is_unreachable() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        assert_eq!(
            comm0.send(5, 0, &[]),
            Err(DistMatmulError::PeerUnreachable { peer: 5 })
        );
        assert_eq!(
            NoComm.send(1, 0, &[]),
            Err(DistMatmulError::PeerUnreachable { peer: 1 })
        );
    }
}
