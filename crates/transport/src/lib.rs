//! Dashcam Transport
//!
//! Decision logic for moving session documents around the realtime
//! channel's byte ceiling. Documents small enough may cross the channel
//! inline; anything else stays local (file save or a held reference)
//! and only a fixed-size summary is transmitted. Data is never
//! silently dropped, and the ceiling is an operational parameter
//! supplied by the hosting environment, never hardcoded.

pub mod gate;
pub mod stage;

pub use gate::*;
pub use stage::*;
