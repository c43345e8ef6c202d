use bytemuck::{Pod, Zeroable};

use crate::api::types::{Cue, SpinPhase, SpinResult};

/// Flat frame buffer layout shared with JavaScript.
/// Must stay in sync with the page-side reader.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// The header is rewritten every frame. Events are the cues and results
/// produced since the previous frame; overflow beyond `max_events` is
/// dropped and counted.
///
/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_ROTATION: usize = 2;
pub const HEADER_PHASE: usize = 3;
pub const HEADER_POINTER_INDEX: usize = 4;
pub const HEADER_SEGMENT_COUNT: usize = 5;
pub const HEADER_EVENT_COUNT: usize = 6;
pub const HEADER_MAX_EVENTS: usize = 7;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per event: kind, a, b, c. Fixed by the wire format.
pub const EVENT_FLOATS: usize = 4;

/// Event kinds.
pub const EVENT_TICK: f32 = 1.0;
pub const EVENT_WIN: f32 = 2.0;
pub const EVENT_RESULT: f32 = 3.0;

/// Phase codes written into `HEADER_PHASE`.
pub fn phase_code(phase: SpinPhase) -> f32 {
    match phase {
        SpinPhase::Idle => 0.0,
        SpinPhase::Spinning => 1.0,
        SpinPhase::Settling => 2.0,
    }
}

/// One event on the wire. `kind` identifies it, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WheelEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl WheelEvent {
    pub const FLOATS: usize = EVENT_FLOATS;

    /// `a` = segment index.
    pub fn from_cue(cue: Cue) -> Self {
        match cue {
            Cue::Tick { index } => Self { kind: EVENT_TICK, a: index as f32, ..Self::default() },
            Cue::Win { index } => Self { kind: EVENT_WIN, a: index as f32, ..Self::default() },
        }
    }

    /// `a` = winning index, `b` = settled rotation in `[0, 360)`.
    /// The label is read separately by index.
    pub fn from_result(result: &SpinResult, normalized_rotation: f64) -> Self {
        Self {
            kind: EVENT_RESULT,
            a: result.index as f32,
            b: normalized_rotation as f32,
            c: 0.0,
        }
    }
}

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolLayout {
    pub max_events: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,
    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_events: usize) -> Self {
        let event_data_offset = HEADER_FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;
        Self {
            max_events,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }
}

/// Header values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    pub normalized_rotation: f64,
    pub phase: SpinPhase,
    pub pointer_index: usize,
    pub segment_count: usize,
}

/// Fixed-size frame buffer: header plus a bounded event list.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    events: Vec<WheelEvent>,
    frame_counter: u32,
    dropped: u64,
    data: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let mut header = [0.0; HEADER_FLOATS];
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_MAX_EVENTS] = layout.max_events as f32;
        Self {
            layout,
            header,
            events: Vec::with_capacity(layout.max_events),
            frame_counter: 0,
            dropped: 0,
            data: vec![0.0; layout.buffer_total_floats],
        }
    }

    pub fn layout(&self) -> ProtocolLayout {
        self.layout
    }

    /// Queue an event for the next published frame. Returns false if full.
    pub fn push_event(&mut self, event: WheelEvent) -> bool {
        if self.events.len() >= self.layout.max_events {
            self.dropped += 1;
            return false;
        }
        self.events.push(event);
        true
    }

    /// Write the header and queued events into the flat buffer and clear the
    /// queue for the next frame.
    pub fn publish(&mut self, frame: FrameHeader) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.header[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        self.header[HEADER_ROTATION] = frame.normalized_rotation as f32;
        self.header[HEADER_PHASE] = phase_code(frame.phase);
        self.header[HEADER_POINTER_INDEX] = frame.pointer_index as f32;
        self.header[HEADER_SEGMENT_COUNT] = frame.segment_count as f32;
        self.header[HEADER_EVENT_COUNT] = self.events.len() as f32;

        self.data[..HEADER_FLOATS].copy_from_slice(&self.header);
        let start = self.layout.event_data_offset;
        let floats: &[f32] = bytemuck::cast_slice(&self.events);
        self.data[start..start + floats.len()].copy_from_slice(floats);
        self.events.clear();
    }

    /// Events in the last published frame.
    pub fn published_events(&self) -> &[WheelEvent] {
        let count = self.data[HEADER_EVENT_COUNT] as usize;
        let start = self.layout.event_data_offset;
        bytemuck::cast_slice(&self.data[start..start + count * EVENT_FLOATS])
    }

    /// Number of events dropped because a frame overflowed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }
}
