//! Data contracts for the auto-zoom engine.
//!
//! - **event:** the wire-format input event stream (pointer, click, key).
//! - **session:** the normalized in-memory model (`MouseEvent`,
//!   `KeyboardEvent`, `Session`) the engine actually analyzes.
//! - **viewport:** normalized `[0,1]²` rectangle/point geometry.
//! - **timeline:** keyframes, settings, and sampled render state.
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the
//! capture region, top-left origin.

pub mod event;
pub mod session;
pub mod timeline;
pub mod viewport;

pub use event::*;
pub use session::*;
pub use timeline::*;
pub use viewport::*;
