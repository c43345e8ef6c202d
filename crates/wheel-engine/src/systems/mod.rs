pub mod cues;
pub mod spin;
