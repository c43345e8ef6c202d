use rand::rngs::StdRng;
use rand::Rng;

use crate::api::config::WheelConfig;
use crate::api::types::{SpinPhase, SpinResult, SpinStatus};
use crate::core::angle::{normalize_degrees, AngleMapper};
use crate::core::segments::SegmentSet;
use crate::core::selector::pick_winner;
use crate::error::{WheelError, WheelResult};
use crate::renderer::traits::{WheelFrame, WheelRenderer};
use crate::systems::cues::{CueDispatcher, CueSink, CueStats};
use crate::systems::spin::{Animator, FrameOutcome};

type ResultCallback = Box<dyn FnMut(&SpinResult)>;

/// Wheel controller: owns the rotation, accepts spins, and reports each
/// accepted spin's result exactly once.
///
/// Single-threaded and frame-driven. Call [`Wheel::tick`] from the host's
/// animation-frame callback with the elapsed milliseconds; independent
/// wheels share nothing.
pub struct Wheel<R: Rng = StdRng> {
    config: WheelConfig,
    segments: SegmentSet,
    mapper: AngleMapper,
    /// Accumulated rotation in degrees. Written only by the animator.
    rotation: f64,
    animator: Animator,
    cues: CueDispatcher,
    rng: R,
    on_result: Option<ResultCallback>,
    last_result: Option<SpinResult>,
    /// Cleared by `dispose`; every entry point checks it first.
    alive: bool,
}

#[cfg(feature = "os-rng")]
impl Wheel<StdRng> {
    /// Create a wheel seeded from the operating system.
    pub fn new(config: WheelConfig) -> WheelResult<Self> {
        use rand::SeedableRng;
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> Wheel<R> {
    /// Create a wheel drawing outcomes from `rng`.
    pub fn with_rng(config: WheelConfig, rng: R) -> WheelResult<Self> {
        let segments = config.validate()?;
        let mapper = AngleMapper::new(segments.len(), config.pointer_offset);
        Ok(Self {
            animator: Animator::new(config.physics),
            cues: CueDispatcher::new(config.cues),
            rotation: mapper.angle_for_index(0),
            segments,
            mapper,
            config,
            rng,
            on_result: None,
            last_result: None,
            alive: true,
        })
    }

    /// Register the result subscriber, replacing any previous one.
    pub fn on_result(&mut self, callback: impl FnMut(&SpinResult) + 'static) {
        if self.alive {
            self.on_result = Some(Box::new(callback));
        }
    }

    /// Attach the audio/haptics backend.
    pub fn set_cue_sink(&mut self, sink: impl CueSink + 'static) {
        if self.alive {
            self.cues.set_sink(Box::new(sink));
        }
    }

    /// Request a spin.
    ///
    /// Dropped (not queued) while a session is alive. The winner is drawn
    /// here, before any frame runs; with reduced motion the session also
    /// resolves here.
    pub fn spin(&mut self) -> WheelResult<SpinStatus> {
        if !self.alive {
            return Err(WheelError::Disposed);
        }
        if self.animator.phase().is_active() {
            log::debug!("spin ignored: session already active");
            return Ok(SpinStatus::Ignored);
        }
        let winner = pick_winner(self.segments.len(), &mut self.rng)?;

        if self.config.reduced_motion {
            self.animator.start_settled(winner, self.rotation, &self.mapper);
            if let Some(index) = self.animator.settle(&mut self.rotation) {
                self.emit_result(index);
            }
            return Ok(SpinStatus::Resolved);
        }

        self.animator.start(winner, self.rotation, &self.mapper);
        Ok(SpinStatus::Started)
    }

    /// Advance by one display frame of `dt_ms` milliseconds.
    pub fn tick(&mut self, dt_ms: f64) -> FrameOutcome {
        if !self.alive {
            return FrameOutcome::Idle;
        }
        let outcome = self
            .animator
            .advance(dt_ms, &mut self.rotation, &self.mapper, &mut self.cues);
        if let FrameOutcome::Settled { winning_index } = outcome {
            self.emit_result(winning_index);
        }
        outcome
    }

    /// Tear down. Safe from any phase and idempotent; afterwards no frame
    /// moves the wheel and no cue or result is delivered.
    pub fn dispose(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.animator.cancel();
        self.cues.detach();
        self.on_result = None;
        log::debug!("wheel disposed at {:.2}°", self.rotation);
    }

    pub fn is_disposed(&self) -> bool {
        !self.alive
    }

    /// Replace the whole configuration. Rejected while spinning.
    /// Rotation carries over.
    pub fn reconfigure(&mut self, config: WheelConfig) -> WheelResult<()> {
        self.ensure_idle()?;
        let segments = config.validate()?;
        self.mapper = AngleMapper::new(segments.len(), config.pointer_offset);
        self.segments = segments;
        self.animator.set_physics(config.physics);
        self.cues.set_config(config.cues);
        self.config = config;
        Ok(())
    }

    /// Swap in a new segment set. Rejected while spinning.
    pub fn set_segments(&mut self, segments: SegmentSet) -> WheelResult<()> {
        self.ensure_idle()?;
        self.mapper = AngleMapper::new(segments.len(), self.config.pointer_offset);
        self.config.segments = segments.as_slice().to_vec();
        self.segments = segments;
        Ok(())
    }

    /// Takes effect from the next spin.
    pub fn set_reduced_motion(&mut self, enabled: bool) -> WheelResult<()> {
        if !self.alive {
            return Err(WheelError::Disposed);
        }
        self.config.reduced_motion = enabled;
        Ok(())
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn normalized_rotation(&self) -> f64 {
        normalize_degrees(self.rotation)
    }

    pub fn phase(&self) -> SpinPhase {
        self.animator.phase()
    }

    pub fn is_spinning(&self) -> bool {
        self.animator.phase().is_active()
    }

    /// Segment currently under the pointer.
    pub fn pointer_index(&self) -> usize {
        self.mapper.index_for_angle(self.rotation)
    }

    pub fn segments(&self) -> &SegmentSet {
        &self.segments
    }

    pub fn mapper(&self) -> &AngleMapper {
        &self.mapper
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// Most recent result, kept for late readers.
    pub fn last_result(&self) -> Option<&SpinResult> {
        self.last_result.as_ref()
    }

    pub fn cue_stats(&self) -> CueStats {
        self.cues.stats()
    }

    /// Snapshot for the renderer.
    pub fn frame(&self) -> WheelFrame<'_> {
        WheelFrame {
            rotation: self.rotation,
            phase: self.phase(),
            pointer_index: self.pointer_index(),
            segments: &self.segments,
            mapper: self.mapper,
        }
    }

    /// Hand the current frame to `renderer`. Nothing is drawn once disposed.
    pub fn render<W: WheelRenderer + ?Sized>(&self, renderer: &mut W) {
        if self.alive {
            renderer.draw(&self.frame());
        }
    }

    fn ensure_idle(&self) -> WheelResult<()> {
        if !self.alive {
            return Err(WheelError::Disposed);
        }
        if self.animator.phase().is_active() {
            log::warn!("reconfiguration rejected: spin in progress");
            return Err(WheelError::SpinInProgress);
        }
        Ok(())
    }

    fn emit_result(&mut self, index: usize) {
        let label = match self.segments.try_label(index) {
            Ok(label) => label.to_string(),
            Err(err) => {
                log::error!("settled on a segment that does not exist: {err}");
                return;
            }
        };
        let result = SpinResult { index, label };
        self.cues.win(index);
        if let Some(callback) = self.on_result.as_mut() {
            callback(&result);
        }
        self.last_result = Some(result);
    }
}
