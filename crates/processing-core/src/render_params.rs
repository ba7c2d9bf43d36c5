//! Public render-parameter API (§4.9): build a timeline once per session,
//! then sample it (plus highlights) at any number of frame times.

use grabme_project_model::session::Session;
use grabme_project_model::timeline::{Highlight, Phase, Settings, Timeline};
use grabme_project_model::viewport::Point2D;
use tracing::info;

use crate::highlight;
use crate::sampler;
use crate::timeline_builder;
use crate::EngineError;

/// Everything a renderer needs to draw a single frame at time `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub scale: f64,
    pub center: Point2D,
    pub phase: Phase,
    pub highlights: Vec<Highlight>,
}

/// Build the zoom timeline for a whole session.
///
/// Validates `settings` first (rejecting out-of-range fields and
/// inconsistent bounds like `hold_min > hold_max`) and fails the build
/// rather than guessing at intent. An empty session is not an error: it
/// produces an Idle-only timeline spanning the session's duration.
pub fn build_timeline(session: &Session, settings: &Settings) -> Result<Timeline, EngineError> {
    settings.validate()?;

    if !settings.auto_zoom_enabled {
        info!("build_timeline: auto_zoom_enabled is false, returning an idle timeline");
        return Ok(Timeline::idle(session.duration()));
    }

    info!(
        duration = session.duration(),
        mouse_events = session.mouse_events().len(),
        keyboard_events = session.keyboard_events().len(),
        "build_timeline: starting"
    );
    let timeline = timeline_builder::build_timeline(session, settings);
    info!(keyframes = timeline.keyframes().len(), "build_timeline: done");
    Ok(timeline)
}

/// Sample the render parameters for a single frame at time `t`.
pub fn render_params(timeline: &Timeline, session: &Session, settings: &Settings, t: f64) -> RenderParams {
    let state = sampler::sample(timeline, t);
    let highlights = highlight::highlights_at(session.mouse_events(), t, &state, settings);

    RenderParams {
        scale: state.scale,
        center: state.center,
        phase: state.phase,
        highlights,
    }
}
