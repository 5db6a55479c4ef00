//! Error taxonomy shared by graph construction, batch layout and validation backends.
use thiserror::Error;

/// Largest vertex count whose neighbor sets fit in one `u64` word each.
pub const MAX_VERTICES: usize = 63;

#[derive(Debug, Error)]
pub enum ColoringError {
    #[error("vertex count {0} is outside [1, {max}]", max = MAX_VERTICES)]
    InvalidSize(usize),
    #[error("invalid edge ({u}, {v})")]
    InvalidEdge { u: usize, v: usize },
    #[error("adjacency is not symmetric at ({u}, {v})")]
    Asymmetric { u: usize, v: usize },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("execution device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("dispatch failed: {0}")]
    DispatchFailure(String),
}

impl ColoringError {
    /// Failures of the execution substrate rather than of the inputs. The same
    /// pass can be retried on the sequential backend.
    pub fn is_substrate_failure(&self) -> bool {
        matches!(
            self,
            ColoringError::DeviceUnavailable(_) | ColoringError::DispatchFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ColoringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substrate_failures_are_classified() {
        assert!(ColoringError::DeviceUnavailable("no gpu".into()).is_substrate_failure());
        assert!(ColoringError::DispatchFailure("lane panic".into()).is_substrate_failure());
        assert!(!ColoringError::InvalidSize(64).is_substrate_failure());
        assert!(!ColoringError::ShapeMismatch("stride".into()).is_substrate_failure());
    }

    #[test]
    fn messages_name_the_offending_values() {
        assert_eq!(
            ColoringError::InvalidSize(64).to_string(),
            "vertex count 64 is outside [1, 63]"
        );
        assert_eq!(
            ColoringError::InvalidEdge { u: 2, v: 2 }.to_string(),
            "invalid edge (2, 2)"
        );
    }
}
