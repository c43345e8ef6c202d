//! Renderer contract.
//!
//! The engine never draws. Each frame it exposes a [`WheelFrame`] and the
//! renderer decides how to paint segment geometry and the fixed pointer
//! (canvas, SVG, CSS transform, a terminal...).

use glam::Vec2;

use crate::api::types::SpinPhase;
use crate::core::angle::{normalize_degrees, AngleMapper};
use crate::core::segments::SegmentSet;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct WheelFrame<'a> {
    /// Accumulated rotation, degrees clockwise. Unbounded.
    pub rotation: f64,
    pub phase: SpinPhase,
    /// Segment currently under the pointer.
    pub pointer_index: usize,
    pub segments: &'a SegmentSet,
    pub mapper: AngleMapper,
}

impl WheelFrame<'_> {
    /// Rotation reduced into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        normalize_degrees(self.rotation)
    }

    /// Screen angle of a segment's centre, degrees clockwise from the top.
    pub fn segment_screen_angle(&self, index: usize) -> f64 {
        normalize_degrees(self.mapper.segment_center(index) + self.rotation)
    }

    /// Where to place a segment's label: `radius` out from the wheel centre
    /// along the segment's centre line. Y points down.
    pub fn label_anchor(&self, index: usize, radius: f32) -> Vec2 {
        let theta = self.segment_screen_angle(index).to_radians() as f32;
        Vec2::new(theta.sin(), -theta.cos()) * radius
    }

    /// Label under the pointer.
    pub fn pointer_label(&self) -> Option<&str> {
        self.segments.label(self.pointer_index)
    }
}

/// Presentation backend. Called with the current frame after each engine tick.
pub trait WheelRenderer {
    fn draw(&mut self, frame: &WheelFrame<'_>);
}
