//! Folds a session's events through the zoom state machine and records
//! keyframes per §4.6: on every state-transition boundary, at a minimum
//! cadence during continuous phases, and always a closing keyframe
//! bringing the camera back to scale 1.0.

use grabme_project_model::session::{KeyboardEventKind, Session};
use grabme_project_model::timeline::{Settings, Timeline, ZoomKeyframe};
use grabme_project_model::viewport::Point2D;
use tracing::debug;

use crate::aggregator::{self, AnchorPoint};
use crate::state_machine::ZoomMachine;

/// Internal simulation step. Finer than the recording cadence so that
/// transition boundaries are captured close to where they actually occur.
const SIM_DT: f64 = 1.0 / 120.0;
/// Minimum keyframe cadence during continuous phases (§4.6).
const RECORD_CADENCE: f64 = 1.0 / 30.0;
/// Emit a keyframe early if scale moves more than this since the last one.
const SCALE_DELTA_THRESHOLD: f64 = 0.01;
/// Emit a keyframe early if the center moves more than this since the last one.
const CENTER_DELTA_THRESHOLD: f64 = 0.02;

/// Build the full keyframe timeline for a session.
pub fn build_timeline(session: &Session, settings: &Settings) -> Timeline {
    let duration = session.duration();

    if session.is_empty() || duration <= 0.0 {
        return Timeline::idle(duration.max(0.0));
    }

    let anchors = aggregator::aggregate(session.mouse_events(), settings);
    let keyboard_downs: Vec<f64> = session
        .keyboard_events()
        .iter()
        .filter(|k| k.kind == KeyboardEventKind::Down)
        .map(|k| k.t)
        .collect();

    debug!(
        anchors = anchors.len(),
        keyboard_downs = keyboard_downs.len(),
        duration,
        "building zoom timeline"
    );

    let mut machine = ZoomMachine::new(settings.clone());
    let mut keyframes = vec![ZoomKeyframe::idle(0.0)];

    let mut last_t = 0.0;
    let mut last_scale = 1.0;
    let mut last_center = Point2D::new(0.5, 0.5);

    let mut anchor_cursor = 0usize;
    let mut keyboard_cursor = 0usize;

    let mut t = 0.0;
    while t < duration {
        let anchor_now = anchor_at_tick(&anchors, &mut anchor_cursor, t);
        let keyboard_now = keyboard_at_tick(&keyboard_downs, &mut keyboard_cursor, t);
        let cursor = session.position_at(t).map(|(x, y)| Point2D::new(x, y));

        let output = machine.step(t, SIM_DT, cursor, anchor_now.as_ref(), keyboard_now);

        let delta_scale = (output.scale - last_scale).abs();
        let delta_center = output.center.distance_to(&last_center);
        let due_for_cadence = (t - last_t) >= RECORD_CADENCE;

        if output.transitioned
            || due_for_cadence
            || delta_scale > SCALE_DELTA_THRESHOLD
            || delta_center > CENTER_DELTA_THRESHOLD
        {
            debug!(t, scale = output.scale, phase = ?output.phase, "recording keyframe");
            keyframes.push(ZoomKeyframe {
                t,
                scale: output.scale,
                center: output.center,
                easing: settings.easing,
            });
            last_t = t;
            last_scale = output.scale;
            last_center = output.center;
        }

        t += SIM_DT;
    }

    keyframes.push(ZoomKeyframe {
        t: duration,
        scale: 1.0,
        center: Point2D::new(0.5, 0.5),
        easing: settings.easing,
    });

    Timeline::new(keyframes, duration)
}

fn anchor_at_tick(anchors: &[AnchorPoint], cursor: &mut usize, t: f64) -> Option<AnchorPoint> {
    if *cursor < anchors.len() && anchors[*cursor].t_start <= t {
        let anchor = anchors[*cursor];
        *cursor += 1;
        Some(anchor)
    } else {
        None
    }
}

fn keyboard_at_tick(keyboard_downs: &[f64], cursor: &mut usize, t: f64) -> bool {
    let mut hit = false;
    while *cursor < keyboard_downs.len() && keyboard_downs[*cursor] <= t {
        hit = true;
        *cursor += 1;
    }
    hit
}
