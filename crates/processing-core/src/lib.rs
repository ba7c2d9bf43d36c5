//! GrabMe Processing Core — The Auto-Director
//!
//! Turns a recorded input [`Session`](grabme_project_model::session::Session)
//! into a [`Timeline`](grabme_project_model::timeline::Timeline) of camera
//! keyframes, and samples that timeline into per-frame
//! [`RenderParams`] a renderer can draw directly:
//!
//! - **spring** — critically/under/overdamped spring-mass-damper solver.
//! - **attention** — clusters cursor activity into scored regions.
//! - **aggregator** — folds clicks and activity regions into zoom anchors.
//! - **dynamic_scale** — edge/corner-aware scale boost.
//! - **state_machine** — the Idle/EaseIn/Hold/Follow/Pan/ZoomOutPanZoomIn/
//!   EaseOut camera state machine.
//! - **timeline_builder** — drives the state machine over a whole session.
//! - **sampler** — continuous interpolation of a built timeline.
//! - **highlight** — click-ring highlight lifetime and viewport remapping.
//! - **render_params** — the public composition entry point.
//!
//! This crate is pure computation: no I/O, no platform dependencies. All
//! inputs are data; all outputs are data.

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod attention;
pub mod dynamic_scale;
pub mod highlight;
#[cfg(test)]
mod proptests;
pub mod render_params;
pub mod sampler;
#[cfg(test)]
mod scenarios;
pub mod spring;
pub mod state_machine;
pub mod timeline_builder;

pub use render_params::{build_timeline, render_params, RenderParams};

use thiserror::Error;

/// Failures surfaced by the engine's public entry points.
///
/// Internal simulation (the state machine, sampler, aggregator) is total:
/// every input it accepts, however degenerate, produces a defined output.
/// The only way to fail is to hand the engine settings or a session it
/// cannot make sense of, which is what this enum captures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] grabme_project_model::timeline::SettingsError),

    #[error("invalid session: {0}")]
    InvalidSession(#[from] grabme_project_model::session::SessionError),
}
