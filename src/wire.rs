//! Wire payloads and tags for the coordinator/worker protocol.
//!
//! Matrices and result blocks travel as raw typed buffers cast to bytes;
//! the group is assumed architecture-homogeneous, so buffers stay
//! native-endian. The readiness announcement is the one variable-size
//! payload and is serialized with serde, capped on the sending side.

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::comm::Communicator;
use crate::config::MAX_ANNOUNCEMENT_BYTES;
use crate::error::DistMatmulError;

/// Readiness handshake, worker to coordinator.
pub const TAG_ANNOUNCE: u16 = 1;
/// Full copy of the left input matrix, coordinator to worker.
pub const TAG_MATRIX_A: u16 = 2;
/// Full copy of the right input matrix, coordinator to worker.
pub const TAG_MATRIX_B: u16 = 3;
/// Computed row block, worker to coordinator.
pub const TAG_RESULT_BLOCK: u16 = 4;

/// Readiness announcement sent by every worker before the compute phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Sender's rank.
    pub rank: usize,
    /// Sender's host label.
    pub host: String,
}

impl Announcement {
    /// Serialize for the wire. An encoding larger than
    /// [`MAX_ANNOUNCEMENT_BYTES`] is a configuration error, not something
    /// to truncate.
    pub fn encode(&self) -> Result<Vec<u8>, DistMatmulError> {
        let buf = serde_json::to_vec(self).map_err(|e| DistMatmulError::MalformedAnnouncement {
            peer: self.rank,
            reason: e.to_string(),
        })?;
        if buf.len() > MAX_ANNOUNCEMENT_BYTES {
            return Err(DistMatmulError::AnnouncementTooLong {
                len: buf.len(),
                max: MAX_ANNOUNCEMENT_BYTES,
            });
        }
        Ok(buf)
    }

    /// Decode an announcement received from `peer`.
    pub fn decode(peer: usize, bytes: &[u8]) -> Result<Self, DistMatmulError> {
        serde_json::from_slice(bytes).map_err(|e| DistMatmulError::MalformedAnnouncement {
            peer,
            reason: e.to_string(),
        })
    }
}

/// Send a typed element buffer to `peer` as one contiguous transfer.
pub fn send_elems<T: Pod, C: Communicator>(
    comm: &C,
    peer: usize,
    tag: u16,
    elems: &[T],
) -> Result<(), DistMatmulError> {
    comm.send(peer, tag, bytemuck::cast_slice(elems))
}

/// Receive exactly `buf.len()` typed elements from `peer` into `buf`.
pub fn recv_elems_into<T: Pod, C: Communicator>(
    comm: &C,
    peer: usize,
    tag: u16,
    buf: &mut [T],
) -> Result<(), DistMatmulError> {
    comm.recv_into(peer, tag, bytemuck::cast_slice_mut(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::LocalExchange;

    #[test]
    fn announcement_roundtrip() {
        let hello = Announcement {
            rank: 3,
            host: "node-03".into(),
        };
        let bytes = hello.encode().unwrap();
        assert_eq!(Announcement::decode(3, &bytes).unwrap(), hello);
    }

    #[test]
    fn oversized_announcement_is_rejected_before_sending() {
        let hello = Announcement {
            rank: 1,
            host: "x".repeat(MAX_ANNOUNCEMENT_BYTES),
        };
        assert!(matches!(
            hello.encode(),
            Err(DistMatmulError::AnnouncementTooLong { .. })
        ));
    }

    #[test]
    fn garbage_bytes_are_a_malformed_announcement() {
        assert!(matches!(
            Announcement::decode(2, b"not json"),
            Err(DistMatmulError::MalformedAnnouncement { peer: 2, .. })
        ));
    }

    #[test]
    fn typed_buffers_survive_the_byte_cast() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        let sent: Vec<u64> = vec![0, 1, u64::from(u32::MAX) + 7, u64::MAX];
        send_elems(&comm0, 1, TAG_RESULT_BLOCK, &sent).unwrap();

        let mut got = vec![0u64; 4];
        recv_elems_into(&comm1, 0, TAG_RESULT_BLOCK, &mut got).unwrap();
        assert_eq!(got, sent);
    }

    #[test]
    fn element_count_mismatch_surfaces_as_size_error() {
        let exchange = LocalExchange::new(2).unwrap();
        let comm0 = exchange.endpoint(0);
        let comm1 = exchange.endpoint(1);

        send_elems(&comm0, 1, TAG_MATRIX_A, &[1u32, 2, 3]).unwrap();
        let mut got = vec![0u32; 5];
        assert!(matches!(
            recv_elems_into(&comm1, 0, TAG_MATRIX_A, &mut got),
            Err(DistMatmulError::PayloadSizeMismatch { .. })
        ));
    }
}
