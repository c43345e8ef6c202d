pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::wheel::Wheel;
pub use api::config::{WheelConfig, SpinPhysics, CueConfig, REFERENCE_FRAME_MS, MAX_SPIN_STEPS, MAX_SPIN_TRAVEL};
pub use api::types::{SpinResult, SpinPhase, SpinStatus, Cue};
pub use core::angle::{AngleMapper, normalize_degrees, nearest_congruent};
pub use core::segments::SegmentSet;
pub use core::selector::pick_winner;
pub use core::time::FixedTimestep;
pub use systems::spin::{Animator, SpinSession, FrameOutcome};
pub use systems::cues::{CueDispatcher, CueSink, CueStats};
pub use renderer::traits::{WheelFrame, WheelRenderer};
pub use bridge::protocol::{WheelEvent, FrameBuffer, FrameHeader, ProtocolLayout};
pub use error::{WheelError, WheelResult, CueError};

// Callers seeding their own generator need the same rand version.
pub use rand;
