/// Errors surfaced by wheel configuration and control.
///
/// A re-entrant `spin()` is not an error; see [`crate::SpinStatus::Ignored`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WheelError {
    /// The wheel was asked to spin with no segments configured.
    #[error("wheel has no segments")]
    EmptySegments,

    /// Two segments share the same label.
    #[error("duplicate segment label: {0}")]
    DuplicateLabel(String),

    /// A segment index does not exist in the current segment set.
    #[error("segment index {index} out of range for {count} segments")]
    IndexOutOfRange { index: usize, count: usize },

    /// Reconfiguration was attempted while a spin session is alive.
    #[error("cannot reconfigure while a spin is in progress")]
    SpinInProgress,

    /// Spin physics parameters cannot produce a terminating spin.
    #[error("invalid physics: {0}")]
    InvalidPhysics(String),

    /// A configuration document could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The wheel has been torn down.
    #[error("wheel has been disposed")]
    Disposed,
}

impl From<serde_json::Error> for WheelError {
    fn from(err: serde_json::Error) -> Self {
        WheelError::InvalidConfig(err.to_string())
    }
}

/// Convenience result type for wheel operations.
pub type WheelResult<T> = Result<T, WheelError>;

/// Failure reported by an audio/haptics backend while delivering a cue.
///
/// Never propagated past the cue dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CueError {
    /// The backend is missing, suspended, or refused playback.
    #[error("cue backend unavailable: {0}")]
    Backend(String),

    /// The asset bound to this cue could not be found.
    #[error("missing cue asset: {0}")]
    MissingAsset(String),
}
