//! Deceleration animator. Advances the wheel toward a pre-chosen winner.
//!
//! The animator never decides who wins. It is handed `winning_index` at
//! start and its only job is to present a plausible spin-down that ends
//! exactly on that segment.
//!
//! Each simulated step (one reference frame) does:
//!   rotation += velocity * landing_scale
//!   velocity *= decay
//!   if velocity < min_velocity -> Settling
//!
//! `landing_scale` stretches the coast so that the free-decay stop lands on
//! the target; the threshold test uses the unscaled velocity so the step
//! count is exactly the one `SpinPhysics::predict_travel` reports.

use crate::api::config::SpinPhysics;
use crate::api::types::SpinPhase;
use crate::core::angle::{nearest_congruent, normalize_degrees, AngleMapper};
use crate::core::time::FixedTimestep;
use crate::systems::cues::CueDispatcher;

/// One spin request's ephemeral state. Never outlives its spin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSession {
    /// Chosen before the first frame; never re-derived.
    pub winning_index: usize,
    /// `angle_for_index(winning_index)`, in `[0, 360)`.
    pub target_angle: f64,
    /// Simulated clock when the session started.
    pub start_ms: f64,
    /// Unscaled angular velocity, degrees per reference frame.
    pub velocity: f64,
    /// Multiplier on each step's advance (1.0 when not aiming).
    pub landing_scale: f64,
    /// Simulated time of the last delivered tick.
    pub last_tick_ms: Option<f64>,
    /// Segment under the pointer after the previous step.
    pub last_index: usize,
    /// Steps simulated so far.
    pub steps: u32,
}

/// What a call to [`Animator::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing to animate.
    Idle,
    /// Simulated `steps` reference frames (possibly zero).
    Spinning { steps: u32 },
    /// Snapped onto the winner; the session is gone.
    Settled { winning_index: usize },
}

#[derive(Debug)]
pub struct Animator {
    physics: SpinPhysics,
    timestep: FixedTimestep,
    phase: SpinPhase,
    session: Option<SpinSession>,
    /// Simulated milliseconds since the animator was created.
    clock_ms: f64,
}

impl Animator {
    pub fn new(physics: SpinPhysics) -> Self {
        Self {
            physics,
            timestep: FixedTimestep::new(physics.reference_frame_ms, physics.max_steps_per_frame),
            phase: SpinPhase::Idle,
            session: None,
            clock_ms: 0.0,
        }
    }

    /// Swap physics. Only legal while idle; the caller enforces that.
    pub fn set_physics(&mut self, physics: SpinPhysics) {
        debug_assert!(!self.phase.is_active());
        self.physics = physics;
        self.timestep = FixedTimestep::new(physics.reference_frame_ms, physics.max_steps_per_frame);
    }

    pub fn physics(&self) -> &SpinPhysics {
        &self.physics
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Idle → Spinning, continuing from `rotation`.
    ///
    /// Returns `false` without touching anything if a session is alive.
    pub fn start(&mut self, winning_index: usize, rotation: f64, mapper: &AngleMapper) -> bool {
        if self.phase.is_active() {
            return false;
        }
        let target_angle = mapper.angle_for_index(winning_index);
        let landing_scale = if self.physics.aim_landing {
            self.landing_scale(rotation, target_angle)
        } else {
            1.0
        };
        log::debug!(
            "spin start: winner {winning_index}, target {target_angle:.2}°, from {rotation:.2}°, scale {landing_scale:.4}"
        );
        self.timestep.reset();
        self.session = Some(SpinSession {
            winning_index,
            target_angle,
            start_ms: self.clock_ms,
            velocity: self.physics.start_velocity,
            landing_scale,
            last_tick_ms: None,
            last_index: mapper.index_for_angle(rotation),
            steps: 0,
        });
        self.phase = SpinPhase::Spinning;
        true
    }

    /// Idle → Settling with no animated frames (reduced motion).
    pub fn start_settled(&mut self, winning_index: usize, rotation: f64, mapper: &AngleMapper) -> bool {
        if self.phase.is_active() {
            return false;
        }
        self.session = Some(SpinSession {
            winning_index,
            target_angle: mapper.angle_for_index(winning_index),
            start_ms: self.clock_ms,
            velocity: 0.0,
            landing_scale: 1.0,
            last_tick_ms: None,
            last_index: mapper.index_for_angle(rotation),
            steps: 0,
        });
        self.phase = SpinPhase::Settling;
        true
    }

    /// Run one display frame of `dt_ms`.
    ///
    /// While spinning, boundary crossings are offered to `cues` as ticks,
    /// at most one delivered per call however many steps it runs. In Settling, the frame snaps `rotation` to the winner and ends the
    /// session.
    pub fn advance(
        &mut self,
        dt_ms: f64,
        rotation: &mut f64,
        mapper: &AngleMapper,
        cues: &mut CueDispatcher,
    ) -> FrameOutcome {
        match self.phase {
            SpinPhase::Idle => FrameOutcome::Idle,
            SpinPhase::Settling => match self.settle(rotation) {
                Some(winning_index) => FrameOutcome::Settled { winning_index },
                None => FrameOutcome::Idle,
            },
            SpinPhase::Spinning => {
                let steps = self.timestep.accumulate(dt_ms);
                let mut ran = 0;
                let mut ticked = false;
                for _ in 0..steps {
                    ran += 1;
                    if self.step(rotation, mapper, cues, &mut ticked) {
                        self.phase = SpinPhase::Settling;
                        // Leftover frame time belongs to no spin.
                        self.timestep.reset();
                        break;
                    }
                }
                FrameOutcome::Spinning { steps: ran }
            }
        }
    }

    /// Settling → Idle: write the exact target and drop the session.
    /// Returns the winner, or `None` if there was nothing to settle.
    pub fn settle(&mut self, rotation: &mut f64) -> Option<usize> {
        let Some(session) = self.session.take() else {
            self.phase = SpinPhase::Idle;
            return None;
        };
        *rotation = nearest_congruent(*rotation, session.target_angle);
        self.phase = SpinPhase::Idle;
        log::debug!(
            "spin settled on {} at {:.2}° after {} steps",
            session.winning_index,
            *rotation,
            session.steps
        );
        Some(session.winning_index)
    }

    /// Abandon any session immediately. Rotation is left where it is.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            log::debug!("spin cancelled");
        }
        self.phase = SpinPhase::Idle;
        self.timestep.reset();
    }

    /// One reference frame of physics. Returns true when the velocity has
    /// dropped below the settle threshold.
    ///
    /// `ticked` is shared by all steps of one display frame.
    fn step(
        &mut self,
        rotation: &mut f64,
        mapper: &AngleMapper,
        cues: &mut CueDispatcher,
        ticked: &mut bool,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return true;
        };
        *rotation += session.velocity * session.landing_scale;
        session.velocity *= self.physics.decay;
        session.steps += 1;
        self.clock_ms += self.physics.reference_frame_ms;

        let index = mapper.index_for_angle(*rotation);
        if index != session.last_index {
            session.last_index = index;
            if *ticked {
                cues.throttle();
            } else {
                *ticked = cues.tick(&mut session.last_tick_ms, self.clock_ms, index);
            }
        }
        session.velocity < self.physics.min_velocity
    }

    /// Scale that turns the free-decay stop into a stop on `target`.
    fn landing_scale(&self, rotation: f64, target: f64) -> f64 {
        let (travel, _) = self.physics.predict_travel();
        if travel <= 0.0 {
            return 1.0;
        }
        let correction = normalize_degrees(target - (rotation + travel));
        (travel + correction) / travel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::CueConfig;

    const FRAME: f64 = 1000.0 / 60.0;

    fn run_to_rest(
        animator: &mut Animator,
        rotation: &mut f64,
        mapper: &AngleMapper,
        dt: f64,
    ) -> (usize, u32) {
        let mut cues = CueDispatcher::new(CueConfig::default());
        let mut frames = 0;
        loop {
            frames += 1;
            assert!(frames < 100_000, "spin never settled");
            if let FrameOutcome::Settled { winning_index } =
                animator.advance(dt, rotation, mapper, &mut cues)
            {
                return (winning_index, frames);
            }
        }
    }

    #[test]
    fn lands_exactly_on_winner() {
        let mapper = AngleMapper::new(4, 0.0);
        for winner in 0..4 {
            let mut animator = Animator::new(SpinPhysics::default());
            let mut rotation = 0.0;
            assert!(animator.start(winner, rotation, &mapper));
            let (settled, _) = run_to_rest(&mut animator, &mut rotation, &mapper, FRAME);
            assert_eq!(settled, winner);
            assert_eq!(rotation.rem_euclid(90.0), 0.0);
            assert_eq!(mapper.index_for_angle(rotation), winner);
            assert_eq!(animator.phase(), SpinPhase::Idle);
            assert!(animator.session().is_none());
        }
    }

    #[test]
    fn aimed_spin_needs_no_visible_snap() {
        let mapper = AngleMapper::new(7, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut rotation = 123.0;
        let mut cues = CueDispatcher::new(CueConfig::default());
        animator.start(5, rotation, &mapper);
        while animator.phase() == SpinPhase::Spinning {
            animator.advance(FRAME, &mut rotation, &mapper, &mut cues);
        }
        let coasted = rotation;
        animator.advance(FRAME, &mut rotation, &mapper, &mut cues);
        assert!((rotation - coasted).abs() < 1e-6, "snap moved {}", rotation - coasted);
        assert!(rotation > 123.0);
    }

    #[test]
    fn unaimed_spin_snaps_to_nearest_congruent() {
        let physics = SpinPhysics { aim_landing: false, ..SpinPhysics::default() };
        let mapper = AngleMapper::new(5, 0.0);
        let mut animator = Animator::new(physics);
        let mut rotation = 0.0;
        animator.start(2, rotation, &mapper);
        let (winner, _) = run_to_rest(&mut animator, &mut rotation, &mapper, FRAME);
        assert_eq!(winner, 2);
        assert_eq!(mapper.index_for_angle(rotation), 2);
        let (travel, _) = physics.predict_travel();
        assert!((rotation - travel).abs() <= 180.0);
    }

    #[test]
    fn trajectory_is_frame_rate_independent() {
        let mapper = AngleMapper::new(12, 0.0);
        let mut finals = Vec::new();
        for hz in [30.0, 60.0, 144.0] {
            let mut animator = Animator::new(SpinPhysics::default());
            let mut rotation = 40.0;
            animator.start(9, rotation, &mapper);
            run_to_rest(&mut animator, &mut rotation, &mapper, 1000.0 / hz);
            finals.push((rotation, animator.clock_ms()));
        }
        let (rotation, _) = finals[0];
        for &(r, _) in &finals {
            assert_eq!(r, rotation);
        }
        // Same number of simulated steps regardless of display rate.
        let steps = SpinPhysics::default().predict_travel().1 as f64;
        for &(_, clock) in &finals {
            assert!((clock - steps * FRAME).abs() < 1e-6);
        }
    }

    #[test]
    fn settling_is_its_own_frame() {
        let physics = SpinPhysics { start_velocity: 0.6, ..SpinPhysics::default() };
        let mapper = AngleMapper::new(3, 0.0);
        let mut animator = Animator::new(physics);
        let mut cues = CueDispatcher::new(CueConfig::default());
        let mut rotation = 0.0;
        animator.start(1, rotation, &mapper);
        // 0.6 → 0.594 → ... crosses 0.5 on step 19.
        let mut outcome = FrameOutcome::Idle;
        for _ in 0..19 {
            outcome = animator.advance(FRAME, &mut rotation, &mapper, &mut cues);
        }
        assert_eq!(outcome, FrameOutcome::Spinning { steps: 1 });
        assert_eq!(animator.phase(), SpinPhase::Settling);
        let outcome = animator.advance(FRAME, &mut rotation, &mapper, &mut cues);
        assert_eq!(outcome, FrameOutcome::Settled { winning_index: 1 });
        assert_eq!(rotation.rem_euclid(360.0), 240.0);
    }

    #[test]
    fn start_is_rejected_while_active() {
        let mapper = AngleMapper::new(4, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        assert!(animator.start(1, 0.0, &mapper));
        assert!(!animator.start(2, 0.0, &mapper));
        assert!(!animator.start_settled(3, 0.0, &mapper));
        assert_eq!(animator.session().map(|s| s.winning_index), Some(1));
    }

    #[test]
    fn reduced_motion_settles_without_steps() {
        let mapper = AngleMapper::new(4, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut rotation = 1000.0;
        assert!(animator.start_settled(3, rotation, &mapper));
        assert_eq!(animator.settle(&mut rotation), Some(3));
        assert_eq!(rotation, 1170.0);
        assert_eq!(animator.clock_ms(), 0.0);
    }

    #[test]
    fn single_segment_settles() {
        let mapper = AngleMapper::new(1, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut rotation = 0.0;
        animator.start(0, rotation, &mapper);
        let (winner, _) = run_to_rest(&mut animator, &mut rotation, &mapper, FRAME);
        assert_eq!(winner, 0);
        assert_eq!(rotation.rem_euclid(360.0), 0.0);
    }

    #[test]
    fn cancel_leaves_rotation_alone() {
        let mapper = AngleMapper::new(4, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut cues = CueDispatcher::new(CueConfig::default());
        let mut rotation = 0.0;
        animator.start(2, rotation, &mapper);
        animator.advance(FRAME * 3.0, &mut rotation, &mapper, &mut cues);
        let frozen = rotation;
        animator.cancel();
        assert_eq!(animator.advance(FRAME, &mut rotation, &mapper, &mut cues), FrameOutcome::Idle);
        assert_eq!(rotation, frozen);
        assert!(animator.session().is_none());
    }

    #[test]
    fn long_frame_delivers_one_tick() {
        let mapper = AngleMapper::new(26, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut cues = CueDispatcher::new(CueConfig::default());
        let mut rotation = 0.0;
        animator.start(4, rotation, &mapper);
        // Ten steps of ~20° cross a 13.8° boundary on nearly every step.
        assert_eq!(
            animator.advance(1000.0, &mut rotation, &mapper, &mut cues),
            FrameOutcome::Spinning { steps: 10 }
        );
        let stats = cues.stats();
        assert_eq!(stats.ticks, 1, "{stats:?}");
        assert!(stats.throttled >= 5, "{stats:?}");
    }

    #[test]
    fn boundary_crossings_tick() {
        let mapper = AngleMapper::new(26, 0.0);
        let mut animator = Animator::new(SpinPhysics::default());
        let mut cues = CueDispatcher::new(CueConfig::default());
        let mut rotation = 0.0;
        animator.start(13, rotation, &mapper);
        while animator.phase().is_active() {
            animator.advance(FRAME, &mut rotation, &mapper, &mut cues);
        }
        let stats = cues.stats();
        assert!(stats.ticks > 10, "ticks: {stats:?}");
        // Fast early segments pass faster than the limit allows.
        assert!(stats.throttled > 0, "ticks: {stats:?}");
        assert_eq!(stats.wins, 0);
    }
}
