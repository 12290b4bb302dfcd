pub mod reflow;

pub use reflow::{reflow, Reflow, SpacePolicy, DEFAULT_WIDTH};
