/// Full turn in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Normalise an angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= FULL_TURN {
        0.0
    } else {
        r
    }
}

/// The rotation congruent to `target` (mod 360) that is nearest `current`.
///
/// Integer turns are added to `target` rather than deltas to `current`, so
/// the result carries no drift from the spin that led here.
pub fn nearest_congruent(current: f64, target: f64) -> f64 {
    let turns = ((current - target) / FULL_TURN).round();
    target + turns * FULL_TURN
}

/// Bidirectional segment index ⇄ rotation mapping for a wheel of
/// `segment_count` equal segments.
///
/// Angles are degrees, positive clockwise. Segment `i` is centred at
/// `i * width` in the wheel's own frame, so with the pointer at the top the
/// resting angle of every winner is a whole multiple of the segment width.
/// The pointer offset is the only place a renderer's zero-angle convention
/// may enter the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleMapper {
    segment_count: usize,
    pointer_offset: f64,
}

impl AngleMapper {
    /// `pointer_offset` is where the pointer sits, in degrees clockwise from
    /// the top of the wheel.
    pub fn new(segment_count: usize, pointer_offset: f64) -> Self {
        Self {
            segment_count,
            pointer_offset: normalize_degrees(pointer_offset),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn pointer_offset(&self) -> f64 {
        self.pointer_offset
    }

    /// Angular width of one segment. A full turn when there are no segments.
    pub fn segment_width(&self) -> f64 {
        FULL_TURN / self.segment_count.max(1) as f64
    }

    /// Centre of segment `index` in the wheel's own frame.
    pub fn segment_center(&self, index: usize) -> f64 {
        index as f64 * self.segment_width()
    }

    /// Rotation in `[0, 360)` that puts the centre of `index` under the pointer.
    pub fn angle_for_index(&self, index: usize) -> f64 {
        normalize_degrees(self.pointer_offset - self.segment_center(index))
    }

    /// Index of the segment under the pointer at `rotation`.
    ///
    /// Always 0 for a wheel with zero or one segment.
    pub fn index_for_angle(&self, rotation: f64) -> usize {
        if self.segment_count <= 1 {
            return 0;
        }
        let under_pointer = normalize_degrees(self.pointer_offset - rotation);
        let slot = (under_pointer / self.segment_width()).round() as usize;
        slot % self.segment_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn four_segments_land_on_quarter_turns() {
        let m = AngleMapper::new(4, 0.0);
        assert_eq!(m.angle_for_index(0), 0.0);
        assert_eq!(m.angle_for_index(1), 270.0);
        assert_eq!(m.angle_for_index(2), 180.0);
        assert_eq!(m.angle_for_index(3), 90.0);
    }

    #[test]
    fn index_is_read_at_the_pointer() {
        let m = AngleMapper::new(4, 0.0);
        // Segment 0 stays under the pointer for a quarter turn around 0.
        assert_eq!(m.index_for_angle(44.0), 0);
        assert_eq!(m.index_for_angle(-44.0), 0);
        assert_eq!(m.index_for_angle(46.0), 3);
        assert_eq!(m.index_for_angle(-46.0), 1);
        assert_eq!(m.index_for_angle(0.0), 0);
        assert_eq!(m.index_for_angle(720.0 + 270.0), 1);
    }

    #[test]
    fn single_segment_is_always_zero() {
        let m = AngleMapper::new(1, 0.0);
        assert_eq!(m.segment_width(), 360.0);
        assert_eq!(m.angle_for_index(0), 0.0);
        for deg in [-720.5, -1.0, 0.0, 179.9, 359.99, 12345.0] {
            assert_eq!(m.index_for_angle(deg), 0);
        }
    }

    #[test]
    fn pointer_offset_shifts_targets_only() {
        let top = AngleMapper::new(4, 0.0);
        let right = AngleMapper::new(4, -90.0);
        assert_eq!(right.pointer_offset(), 270.0);
        for i in 0..4 {
            assert_eq!(right.index_for_angle(right.angle_for_index(i)), i);
            assert_eq!(
                normalize_degrees(right.angle_for_index(i) - top.angle_for_index(i)),
                270.0
            );
        }
    }

    #[test]
    fn nearest_congruent_picks_closest_turn() {
        assert_eq!(nearest_congruent(1085.0, 0.0), 1080.0);
        assert_eq!(nearest_congruent(1275.0, 90.0), 1170.0);
        assert_eq!(nearest_congruent(-10.0, 270.0), -90.0);
    }

    #[test]
    fn normalize_handles_negative_zero_edge() {
        assert_eq!(normalize_degrees(-1e-18), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
    }

    proptest! {
        #[test]
        fn round_trip_every_index(n in 1usize..=360, offset in -720.0f64..720.0) {
            let m = AngleMapper::new(n, offset);
            for i in 0..n {
                prop_assert_eq!(m.index_for_angle(m.angle_for_index(i)), i);
            }
        }

        #[test]
        fn round_trip_survives_extra_turns(n in 1usize..=64, index in 0usize..64, turns in -50i32..50) {
            let m = AngleMapper::new(n, 0.0);
            let index = index % n;
            let rotation = m.angle_for_index(index) + turns as f64 * FULL_TURN;
            prop_assert_eq!(m.index_for_angle(rotation), index);
        }

        #[test]
        fn index_is_always_in_range(n in 1usize..=100, rotation in -1.0e6f64..1.0e6) {
            let m = AngleMapper::new(n, 0.0);
            prop_assert!(m.index_for_angle(rotation) < n);
        }
    }
}
