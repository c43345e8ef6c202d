pub mod traits;

pub use traits::{WheelFrame, WheelRenderer};
