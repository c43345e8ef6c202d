use rand::Rng;

use crate::error::{WheelError, WheelResult};

/// Draw a winning segment index uniformly from `[0, segment_count)`.
///
/// Called before any frame is animated. Every call consumes fresh output
/// from `rng`; nothing about the spin's physics feeds into the draw.
pub fn pick_winner<R: Rng>(segment_count: usize, rng: &mut R) -> WheelResult<usize> {
    if segment_count == 0 {
        return Err(WheelError::EmptySegments);
    }
    Ok(rng.random_range(0..segment_count))
}
