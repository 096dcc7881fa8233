//! Dashcam Session Model
//!
//! Defines the core data contracts for recorded sessions:
//! - **Envelopes:** Timestamped events in the upstream recorder's wire
//!   format (`{"type": <int>, "timestamp": <epoch ms>, "data": {...}}`)
//! - **Canvas snapshots:** The custom payload that carries per-surface
//!   image data URLs through the generic event stream
//! - **Session:** The ordered envelope container with capture metadata
//! - **Document:** Deterministic serialization to the interchange format
//!   (a single JSON array of envelopes)
//!
//! Payloads minted by foreign recorders are relayed as opaque JSON and
//! survive round-trips unchanged; only canvas snapshots get a typed
//! schema.

pub mod canvas;
pub mod document;
pub mod envelope;
pub mod session;

pub use canvas::*;
pub use document::*;
pub use envelope::*;
pub use session::*;
