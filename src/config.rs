//! Job-level configuration, passed explicitly into every entry point.

use serde::{Deserialize, Serialize};

use crate::error::DistMatmulError;

/// Upper bound on the encoded readiness announcement. Hostnames comfortably
/// fit; anything larger is a misconfigured label, rejected before sending.
pub const MAX_ANNOUNCEMENT_BYTES: usize = 256;

/// Parameters of one multiplication job.
///
/// The group size and participant rank come from the communicator at
/// bootstrap; everything the job itself decides lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Side length of the square input matrices.
    pub dim: usize,
}

impl JobConfig {
    /// Validate and build a configuration. `dim == 0` fails fast.
    pub fn new(dim: usize) -> Result<Self, DistMatmulError> {
        if dim == 0 {
            return Err(DistMatmulError::ZeroDimension);
        }
        Ok(Self { dim })
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self { dim: 400 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(JobConfig::new(0), Err(DistMatmulError::ZeroDimension));
    }

    #[test]
    fn default_is_valid() {
        let cfg = JobConfig::default();
        assert_eq!(JobConfig::new(cfg.dim), Ok(cfg));
    }
}
