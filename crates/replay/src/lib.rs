//! Dashcam Replay
//!
//! Drives a generic event player through a finalized session in
//! timestamp order, intercepting canvas-snapshot envelopes to push
//! their encoded surfaces back onto the replay context's drawing
//! surfaces. At most one engine is live at a time; the controller
//! releases the previous player before mounting a new one.

pub mod engine;
pub mod player;

pub use engine::*;
pub use player::*;
