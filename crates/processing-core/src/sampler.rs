//! Continuous per-frame sampling of a built [`Timeline`] (§4.7).
//!
//! Binary-search the bracketing keyframe pair, interpolate scale/center
//! with the upper keyframe's easing curve, and classify the phase from the
//! direction of travel between the two keyframes.

use grabme_project_model::timeline::{Phase, Timeline, ZoomKeyframe, ZoomState};
use grabme_project_model::viewport::Point2D;

/// Sample the zoom state at time `t`. Clamps to the first/last keyframe
/// outside the timeline's span.
pub fn sample(timeline: &Timeline, t: f64) -> ZoomState {
    let keyframes = timeline.keyframes();
    if keyframes.is_empty() {
        return ZoomState::idle();
    }
    if keyframes.len() == 1 || t <= keyframes[0].t {
        return state_at_keyframe(&keyframes[0]);
    }
    if t >= keyframes[keyframes.len() - 1].t {
        return state_at_keyframe(&keyframes[keyframes.len() - 1]);
    }

    let idx = bracket_index(keyframes, t);
    let a = &keyframes[idx];
    let b = &keyframes[idx + 1];

    let span = b.t - a.t;
    let u = if span > 0.0 { ((t - a.t) / span).clamp(0.0, 1.0) } else { 1.0 };
    let eased = b.easing.apply(u);

    let scale = a.scale + (b.scale - a.scale) * eased;
    let center = Point2D::lerp(&a.center, &b.center, eased);
    let phase = classify_phase(a, b);

    ZoomState::new(scale, center, phase)
}

fn state_at_keyframe(kf: &ZoomKeyframe) -> ZoomState {
    let phase = if kf.scale > 1.01 { Phase::Hold } else { Phase::Idle };
    ZoomState::new(kf.scale, kf.center, phase)
}

/// Binary search for the keyframe index `i` such that `keyframes[i].t <= t
/// < keyframes[i + 1].t`. Assumes `t` is strictly within the timeline span.
fn bracket_index(keyframes: &[ZoomKeyframe], t: f64) -> usize {
    let mut lo = 0usize;
    let mut hi = keyframes.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if keyframes[mid].t <= t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

fn classify_phase(a: &ZoomKeyframe, b: &ZoomKeyframe) -> Phase {
    let delta_scale = b.scale - a.scale;
    let delta_center = a.center.distance_to(&b.center);

    if b.scale <= 1.01 && a.scale <= 1.01 {
        Phase::Idle
    } else if delta_scale > 1e-6 {
        Phase::EaseIn
    } else if delta_scale < -1e-6 {
        Phase::EaseOut
    } else if delta_center > 1e-6 {
        Phase::Pan
    } else {
        Phase::Hold
    }
}
