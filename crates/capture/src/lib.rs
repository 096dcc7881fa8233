//! Dashcam Capture
//!
//! Accumulates interaction envelopes into a session while recording:
//!
//! - **Buffer:** The `{Idle, Recording}` state machine that owns the
//!   live session and serializes appends
//! - **Surfaces:** The drawing-surface seam and its registry, with
//!   explicit add/remove hooks (no readiness polling)
//! - **Sampler:** A cancellable periodic task that encodes registered
//!   surfaces and injects canvas-snapshot envelopes
//! - **Session:** Orchestration tying clock, buffer, and sampler to a
//!   single start/stop lifecycle
//!
//! Exactly one session may be recording per capture context; a second
//! start is a reported no-op, never an error.

pub mod buffer;
pub mod sampler;
pub mod session;
pub mod surface;

pub use buffer::*;
pub use sampler::*;
pub use session::*;
pub use surface::*;
