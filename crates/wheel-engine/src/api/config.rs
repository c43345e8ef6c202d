use serde::{Deserialize, Serialize};

use crate::core::segments::SegmentSet;
use crate::error::{WheelError, WheelResult};

/// Reference frame the physics constants are expressed against (60 Hz).
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Longest spin physics may describe, in reference-frame steps.
/// Default physics settles in 368.
pub const MAX_SPIN_STEPS: u32 = 100_000;

/// Furthest one spin may travel, in degrees. Keeps accumulated rotation
/// small enough that snapping to a segment centre stays exact.
pub const MAX_SPIN_TRAVEL: f64 = 1.0e7;

/// Configuration for one wheel, provided by the caller.
/// Loadable from JSON; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Segment labels in clockwise order.
    pub segments: Vec<String>,
    /// Skip the animated spin and resolve immediately.
    pub reduced_motion: bool,
    /// Pointer position in degrees clockwise from the top of the wheel.
    pub pointer_offset: f64,
    pub physics: SpinPhysics,
    pub cues: CueConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            reduced_motion: false,
            pointer_offset: 0.0,
            physics: SpinPhysics::default(),
            cues: CueConfig::default(),
        }
    }
}

impl WheelConfig {
    /// Config for the given labels with every other field defaulted.
    pub fn with_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn reduced_motion(mut self, enabled: bool) -> Self {
        self.reduced_motion = enabled;
        self
    }

    pub fn with_physics(mut self, physics: SpinPhysics) -> Self {
        self.physics = physics;
        self
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> WheelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every constraint and build the segment set.
    pub fn validate(&self) -> WheelResult<SegmentSet> {
        self.physics.validate()?;
        self.cues.validate()?;
        if !self.pointer_offset.is_finite() {
            return Err(WheelError::InvalidConfig("pointer_offset must be finite".into()));
        }
        SegmentSet::new(self.segments.iter().cloned())
    }
}

/// Spin-down physics, in reference-frame units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinPhysics {
    /// Initial angular velocity, degrees per reference frame.
    pub start_velocity: f64,
    /// Velocity multiplier applied after every reference frame.
    pub decay: f64,
    /// Below this velocity the wheel settles.
    pub min_velocity: f64,
    /// Length of one simulated step.
    pub reference_frame_ms: f64,
    /// Most steps a single display frame may run.
    pub max_steps_per_frame: u32,
    /// Scale the coast so the wheel physically stops on the winner.
    pub aim_landing: bool,
}

impl Default for SpinPhysics {
    fn default() -> Self {
        Self {
            start_velocity: 20.0,
            decay: 0.99,
            min_velocity: 0.5,
            reference_frame_ms: REFERENCE_FRAME_MS,
            max_steps_per_frame: 10,
            aim_landing: true,
        }
    }
}

impl SpinPhysics {
    pub fn validate(&self) -> WheelResult<()> {
        let invalid = |msg: &str| Err(WheelError::InvalidPhysics(msg.to_string()));
        if !(self.start_velocity.is_finite() && self.start_velocity > 0.0) {
            return invalid("start_velocity must be positive");
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return invalid("decay must be in (0, 1)");
        }
        if !(self.min_velocity.is_finite() && self.min_velocity > 0.0) {
            return invalid("min_velocity must be positive");
        }
        if !(self.reference_frame_ms.is_finite() && self.reference_frame_ms > 0.0) {
            return invalid("reference_frame_ms must be positive");
        }
        if self.max_steps_per_frame == 0 {
            return invalid("max_steps_per_frame must be at least 1");
        }
        // Bound the step count before running the step loop.
        if self.start_velocity >= self.min_velocity {
            let estimate = ((self.min_velocity / self.start_velocity).ln() / self.decay.ln()).ceil();
            if !(estimate < MAX_SPIN_STEPS as f64) {
                return invalid("spin would not settle within the step limit");
            }
        }
        let (travel, steps) = self.predict_travel();
        if steps >= MAX_SPIN_STEPS {
            return invalid("spin would not settle within the step limit");
        }
        if !(travel.is_finite() && travel <= MAX_SPIN_TRAVEL) {
            return invalid("spin travel is too large");
        }
        Ok(())
    }

    /// Free-decay travel and step count of a spin, without landing scale.
    ///
    /// Mirrors the animator's step exactly: advance, decay, then test the
    /// threshold. Gives up at [`MAX_SPIN_STEPS`].
    pub fn predict_travel(&self) -> (f64, u32) {
        let mut velocity = self.start_velocity;
        let mut travel = 0.0;
        let mut steps = 0;
        loop {
            travel += velocity;
            velocity *= self.decay;
            steps += 1;
            if velocity < self.min_velocity || steps >= MAX_SPIN_STEPS {
                return (travel, steps);
            }
        }
    }
}

/// Cue rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Minimum simulated time between two delivered ticks.
    pub min_tick_interval_ms: f64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            min_tick_interval_ms: 50.0,
        }
    }
}

impl CueConfig {
    pub fn validate(&self) -> WheelResult<()> {
        if !(self.min_tick_interval_ms.is_finite() && self.min_tick_interval_ms >= 0.0) {
            return Err(WheelError::InvalidConfig(
                "min_tick_interval_ms must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}
