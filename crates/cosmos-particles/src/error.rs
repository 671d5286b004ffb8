//! Error types for particle field construction.

/// Errors raised while building point clouds or resolving device profiles.
///
/// All variants are reported synchronously at construction time; a failed
/// generator never hands back a partially populated buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParticleError {
    /// A count or index argument was outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A velocity set does not line up with the positions it animates.
    #[error("velocity count {velocities} does not match point count {points}")]
    MisalignedVelocities {
        /// Number of points in the cloud.
        points: usize,
        /// Number of velocity vectors supplied.
        velocities: usize,
    },

    /// A device class name could not be parsed.
    #[error("unknown device class: {0}")]
    UnknownDeviceClass(String),
}

/// Reject zero counts before any allocation happens.
pub(crate) fn require_positive(name: &str, count: usize) -> Result<(), ParticleError> {
    if count == 0 {
        return Err(ParticleError::InvalidArgument(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(())
}
