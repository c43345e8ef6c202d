//! Cue dispatcher: rate-limited ticks and the single win cue.
//!
//! Delivery is fire-and-forget: a sink that fails or is absent never changes
//! the rotation or delays the result.

use crate::api::config::CueConfig;
use crate::api::types::Cue;
use crate::error::CueError;

/// Audio/haptics backend contract.
///
/// `play` must not block; a backend that plays asynchronously should start
/// playback and return.
pub trait CueSink {
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;
}

impl<F> CueSink for F
where
    F: FnMut(Cue) -> Result<(), CueError>,
{
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        self(cue)
    }
}

/// Delivery counters, mostly for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CueStats {
    pub ticks: u64,
    /// Tick candidates dropped by the rate limit.
    pub throttled: u64,
    pub wins: u64,
    pub failures: u64,
}

pub struct CueDispatcher {
    min_tick_interval_ms: f64,
    sink: Option<Box<dyn CueSink>>,
    stats: CueStats,
}

impl CueDispatcher {
    pub fn new(config: CueConfig) -> Self {
        Self {
            min_tick_interval_ms: config.min_tick_interval_ms,
            sink: None,
            stats: CueStats::default(),
        }
    }

    pub fn set_config(&mut self, config: CueConfig) {
        self.min_tick_interval_ms = config.min_tick_interval_ms;
    }

    pub fn set_sink(&mut self, sink: Box<dyn CueSink>) {
        self.sink = Some(sink);
    }

    /// Drop the sink; later cues go nowhere.
    pub fn detach(&mut self) {
        self.sink = None;
    }

    pub fn stats(&self) -> CueStats {
        self.stats
    }

    /// Offer a tick at simulated time `now_ms`. `last_tick_ms` belongs to the
    /// spin session and is advanced only when the tick is let through.
    /// Returns whether the tick was let through.
    pub fn tick(&mut self, last_tick_ms: &mut Option<f64>, now_ms: f64, index: usize) -> bool {
        if let Some(last) = *last_tick_ms {
            if now_ms - last < self.min_tick_interval_ms {
                self.stats.throttled += 1;
                return false;
            }
        }
        *last_tick_ms = Some(now_ms);
        self.stats.ticks += 1;
        log::trace!("tick cue at {now_ms:.1}ms, segment {index}");
        self.deliver(Cue::Tick { index });
        true
    }

    /// Count a tick candidate that was dropped before reaching the limiter.
    pub fn throttle(&mut self) {
        self.stats.throttled += 1;
    }

    /// The wheel came to rest.
    pub fn win(&mut self, index: usize) {
        self.stats.wins += 1;
        self.deliver(Cue::Win { index });
    }

    fn deliver(&mut self, cue: Cue) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(err) = sink.play(cue) {
            self.stats.failures += 1;
            log::warn!("cue {cue:?} not delivered: {err}");
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("min_tick_interval_ms", &self.min_tick_interval_ms)
            .field("has_sink", &self.sink.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}
