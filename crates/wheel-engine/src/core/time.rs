/// Fixed timestep accumulator, in milliseconds.
/// Converts variable frame deltas into a whole number of reference-frame
/// steps so a spin traces the same trajectory at any display refresh rate.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Length of one simulated step.
    step_ms: f64,
    /// Upper bound on steps run for a single frame.
    max_steps: u32,
    /// Simulated time not yet consumed by a step.
    accumulator: f64,
}

impl FixedTimestep {
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self {
            step_ms,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    ///
    /// Non-finite or non-positive deltas contribute nothing.
    pub fn accumulate(&mut self, frame_ms: f64) -> u32 {
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return 0;
        }
        self.accumulator += frame_ms;
        let steps = (self.accumulator / self.step_ms) as u32;
        if steps > self.max_steps {
            // A stalled tab must not replay seconds of spin in one frame.
            self.accumulator = 0.0;
            return self.max_steps;
        }
        self.accumulator -= steps as f64 * self.step_ms;
        steps
    }

    /// Drop any partial step, e.g. when a new spin begins.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Interpolation alpha between the last step and the next (0.0 to 1.0).
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step_ms
    }

    /// The fixed step length.
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }
}
