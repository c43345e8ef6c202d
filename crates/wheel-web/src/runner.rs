use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use wheel_engine::bridge::protocol::phase_code;
use wheel_engine::{
    Cue, CueError, FrameBuffer, FrameHeader, FrameOutcome, ProtocolLayout, SegmentSet,
    SpinStatus, Wheel, WheelConfig, WheelError, WheelEvent, WheelResult,
};

/// Events a single frame can carry before overflow is dropped.
pub const DEFAULT_MAX_EVENTS: usize = 32;

/// Status codes returned to JavaScript by `spin`.
pub const SPIN_IGNORED: i32 = 0;
pub const SPIN_STARTED: i32 = 1;
pub const SPIN_RESOLVED: i32 = 2;

/// Negative status code for an engine error.
pub fn error_code(err: &WheelError) -> i32 {
    match err {
        WheelError::EmptySegments => -1,
        WheelError::Disposed => -2,
        WheelError::SpinInProgress => -3,
        WheelError::DuplicateLabel(_) => -4,
        WheelError::IndexOutOfRange { .. } => -5,
        WheelError::InvalidPhysics(_) | WheelError::InvalidConfig(_) => -6,
    }
}

/// Drives one wheel from the browser frame loop and publishes each frame
/// into a flat buffer JavaScript reads in place.
///
/// wasm-bindgen cannot export the generic engine types directly, so the
/// exports in `lib.rs` look runners up by handle and forward here.
pub struct WheelRunner {
    wheel: Wheel<StdRng>,
    frame: FrameBuffer,
    /// Filled by the cue sink while the engine runs a frame.
    pending: Rc<RefCell<Vec<WheelEvent>>>,
}

impl WheelRunner {
    pub fn new(config: WheelConfig, rng: StdRng) -> WheelResult<Self> {
        let mut wheel = Wheel::with_rng(config, rng)?;
        let pending = Rc::new(RefCell::new(Vec::new()));
        let cue_queue = Rc::clone(&pending);
        wheel.set_cue_sink(move |cue: Cue| -> Result<(), CueError> {
            cue_queue.borrow_mut().push(WheelEvent::from_cue(cue));
            Ok(())
        });

        let mut runner = Self {
            wheel,
            frame: FrameBuffer::new(ProtocolLayout::new(DEFAULT_MAX_EVENTS)),
            pending,
        };
        // Readers see a valid header before the first tick.
        runner.publish();
        Ok(runner)
    }

    /// Parse a JSON config and build a runner for it.
    pub fn from_json(config_json: &str, rng: StdRng) -> WheelResult<Self> {
        Self::new(WheelConfig::from_json(config_json)?, rng)
    }

    /// Request a spin. Returns one of the `SPIN_*` codes, or a negative
    /// error code.
    pub fn spin(&mut self) -> i32 {
        match self.wheel.spin() {
            Ok(SpinStatus::Ignored) => SPIN_IGNORED,
            Ok(SpinStatus::Started) => SPIN_STARTED,
            Ok(SpinStatus::Resolved) => {
                self.queue_result();
                SPIN_RESOLVED
            }
            Err(err) => {
                log::warn!("spin rejected: {err}");
                error_code(&err)
            }
        }
    }

    /// Run one display frame and publish it.
    pub fn tick(&mut self, dt_ms: f64) -> FrameOutcome {
        let outcome = self.wheel.tick(dt_ms);
        if let FrameOutcome::Settled { .. } = outcome {
            self.queue_result();
        }
        self.publish();
        outcome
    }

    /// Replace the labels from a JSON array of strings.
    pub fn set_segments_json(&mut self, labels_json: &str) -> WheelResult<()> {
        let labels: Vec<String> = serde_json::from_str(labels_json)?;
        self.wheel.set_segments(SegmentSet::new(labels)?)?;
        self.publish();
        Ok(())
    }

    pub fn set_reduced_motion(&mut self, enabled: bool) -> WheelResult<()> {
        self.wheel.set_reduced_motion(enabled)
    }

    pub fn dispose(&mut self) {
        self.wheel.dispose();
        self.pending.borrow_mut().clear();
    }

    pub fn wheel(&self) -> &Wheel<StdRng> {
        &self.wheel
    }

    pub fn rotation(&self) -> f64 {
        self.wheel.rotation()
    }

    pub fn phase(&self) -> f32 {
        phase_code(self.wheel.phase())
    }

    pub fn label(&self, index: usize) -> Option<String> {
        self.wheel.segments().label(index).map(str::to_string)
    }

    /// Index of the last result, or -1 before the first one.
    pub fn result_index(&self) -> i32 {
        self.wheel.last_result().map_or(-1, |r| r.index as i32)
    }

    // ---- Pointer accessors for in-place buffer reads ----

    pub fn events_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn events_len(&self) -> u32 {
        self.frame.layout().buffer_total_floats as u32
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    fn queue_result(&mut self) {
        if let Some(result) = self.wheel.last_result() {
            let event = WheelEvent::from_result(result, self.wheel.normalized_rotation());
            self.pending.borrow_mut().push(event);
        }
    }

    fn publish(&mut self) {
        for event in self.pending.borrow_mut().drain(..) {
            if !self.frame.push_event(event) {
                log::warn!("frame event buffer full, dropped {:?}", event);
            }
        }
        self.frame.publish(FrameHeader {
            normalized_rotation: self.wheel.normalized_rotation(),
            phase: self.wheel.phase(),
            pointer_index: self.wheel.pointer_index(),
            segment_count: self.wheel.segments().len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use wheel_engine::bridge::protocol::{
        EVENT_RESULT, EVENT_TICK, EVENT_WIN, HEADER_EVENT_COUNT, HEADER_PHASE, HEADER_ROTATION,
        HEADER_SEGMENT_COUNT,
    };

    const FRAME: f64 = 1000.0 / 60.0;

    fn runner(json: &str, seed: u64) -> WheelRunner {
        WheelRunner::from_json(json, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn publishes_header_before_first_tick() {
        let r = runner(r#"{ "segments": ["A", "B", "C"] }"#, 1);
        let data = r.frame().as_slice();
        assert_eq!(data[HEADER_SEGMENT_COUNT], 3.0);
        assert_eq!(data[HEADER_PHASE], 0.0);
        assert_eq!(r.events_len() as usize, data.len());
    }

    #[test]
    fn animated_spin_publishes_ticks_then_win_then_result() {
        let mut r = runner(r#"{ "segments": ["A", "B", "C", "D", "E", "F", "G", "H"] }"#, 7);
        assert_eq!(r.spin(), SPIN_STARTED);
        assert_eq!(r.spin(), SPIN_IGNORED);

        let mut kinds = Vec::new();
        let mut final_frame = None;
        for _ in 0..1_000 {
            let outcome = r.tick(FRAME);
            kinds.extend(r.frame().published_events().iter().map(|e| e.kind));
            if let FrameOutcome::Settled { winning_index } = outcome {
                final_frame = Some((winning_index, r.frame().published_events().to_vec()));
                break;
            }
        }
        let (winner, events) = final_frame.expect("spin never settled");
        assert!(kinds.contains(&EVENT_TICK));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EVENT_WIN);
        assert_eq!(events[1].kind, EVENT_RESULT);
        assert_eq!(events[1].a, winner as f32);
        assert_eq!(r.result_index(), winner as i32);
        assert_eq!(
            r.frame().as_slice()[HEADER_ROTATION],
            r.wheel().normalized_rotation() as f32
        );
        assert!(r.label(winner).is_some());
    }

    #[test]
    fn reduced_motion_result_surfaces_on_next_tick() {
        let mut r = runner(r#"{ "segments": ["A", "B"], "reduced_motion": true }"#, 3);
        assert_eq!(r.spin(), SPIN_RESOLVED);
        assert_eq!(r.tick(FRAME), FrameOutcome::Idle);
        let events = r.frame().published_events();
        assert_eq!(events.iter().map(|e| e.kind).collect::<Vec<_>>(), vec![EVENT_WIN, EVENT_RESULT]);
        r.tick(FRAME);
        assert_eq!(r.frame().as_slice()[HEADER_EVENT_COUNT], 0.0);
    }

    #[test]
    fn errors_map_to_negative_codes() {
        let mut empty = runner(r#"{ "segments": [] }"#, 1);
        assert_eq!(empty.spin(), -1);

        let mut r = runner(r#"{ "segments": ["A"] }"#, 1);
        r.dispose();
        assert_eq!(r.spin(), -2);
        assert_eq!(r.tick(FRAME), FrameOutcome::Idle);
    }

    #[test]
    fn bad_config_is_rejected() {
        let err = WheelRunner::from_json("not json", StdRng::seed_from_u64(0)).err();
        assert!(matches!(err, Some(WheelError::InvalidConfig(_))));
        let err = WheelRunner::from_json(r#"{ "segments": ["A", "A"] }"#, StdRng::seed_from_u64(0)).err();
        assert_eq!(err, Some(WheelError::DuplicateLabel("A".into())));
    }

    #[test]
    fn segments_swap_only_when_idle() {
        let mut r = runner(r#"{ "segments": ["A", "B"] }"#, 5);
        r.spin();
        assert_eq!(r.set_segments_json(r#"["x", "y", "z"]"#), Err(WheelError::SpinInProgress));
        while r.wheel().is_spinning() {
            r.tick(FRAME);
        }
        r.set_segments_json(r#"["x", "y", "z"]"#).unwrap();
        assert_eq!(r.frame().as_slice()[HEADER_SEGMENT_COUNT], 3.0);
        assert_eq!(r.label(2).as_deref(), Some("z"));
        assert!(matches!(r.set_segments_json("[1, 2]"), Err(WheelError::InvalidConfig(_))));
    }
}
