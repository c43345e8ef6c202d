use serde::{Deserialize, Serialize};

/// The winning segment of one completed spin.
/// Delivered exactly once per accepted spin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinResult {
    pub index: usize,
    pub label: String,
}

/// Animator state. `Idle → Spinning → Settling → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    #[default]
    Idle,
    Spinning,
    Settling,
}

impl SpinPhase {
    /// Whether a spin session is alive.
    pub fn is_active(self) -> bool {
        !matches!(self, SpinPhase::Idle)
    }
}

/// What happened to a `spin()` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStatus {
    /// A session started; the result arrives on a later frame.
    Started,
    /// Reduced motion: the session resolved inside the call.
    Resolved,
    /// A session was already alive; the request was dropped.
    Ignored,
}

/// An advisory signal for the audio/haptics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A segment boundary passed the pointer; `index` is the segment now under it.
    Tick { index: usize },
    /// The wheel came to rest on `index`.
    Win { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_is_inactive() {
        assert!(!SpinPhase::Idle.is_active());
        assert!(SpinPhase::Spinning.is_active());
        assert!(SpinPhase::Settling.is_active());
        assert_eq!(SpinPhase::default(), SpinPhase::Idle);
    }

    #[test]
    fn result_serializes_for_history_subscribers() {
        let result = SpinResult { index: 2, label: "C".into() };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"index":2,"label":"C"}"#);
    }
}
