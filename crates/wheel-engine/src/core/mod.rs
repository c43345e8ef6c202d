pub mod angle;
pub mod segments;
pub mod selector;
pub mod time;
