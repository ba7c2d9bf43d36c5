//! Click-ring highlight evaluation (§4.8): lifetime windowing around each
//! click, remapped into the current zoomed viewport when the camera is
//! zoomed in.

use grabme_project_model::session::{MouseEvent, MouseEventKind};
use grabme_project_model::timeline::{Highlight, HighlightKind, Settings, ZoomState};
use grabme_project_model::viewport::Point2D;

fn highlight_kind(kind: MouseEventKind) -> Option<HighlightKind> {
    match kind {
        MouseEventKind::LeftClick | MouseEventKind::RightClick => Some(HighlightKind::Pulse),
        MouseEventKind::DoubleClick => Some(HighlightKind::DoubleRing),
        MouseEventKind::Move => None,
    }
}

fn color_for(kind: MouseEventKind) -> [f32; 4] {
    match kind {
        MouseEventKind::RightClick => [1.0, 0.7, 0.2, 1.0],
        _ => [0.2, 0.6, 1.0, 1.0],
    }
}

/// All click highlights alive at time `t`, remapped into the current
/// zoomed viewport described by `zoom`.
pub fn highlights_at(events: &[MouseEvent], t: f64, zoom: &ZoomState, settings: &Settings) -> Vec<Highlight> {
    if !settings.cursor_highlight_enabled {
        return Vec::new();
    }

    events
        .iter()
        .filter_map(|event| {
            let kind = highlight_kind(event.kind)?;
            let duration = kind.duration();
            let progress = (t - event.t) / duration;
            if !(0.0..=1.0).contains(&progress) {
                return None;
            }

            let position = Point2D::new(event.position.0, event.position.1);
            let (remapped, visible) = remap_into_viewport(position, zoom);
            if !visible {
                return None;
            }

            let radius_scale = if zoom.is_active {
                settings.highlight_scale_when_zoomed
            } else {
                1.0
            };

            Some(Highlight {
                position_normalized: remapped,
                kind,
                color: color_for(event.kind),
                progress,
                radius_scale,
            })
        })
        .collect()
}

/// Remap a capture-space point into the current viewport's local `[0,1]²`
/// space. Returns `(point, is_visible)`; a point outside the viewport while
/// zoomed in is not visible and should be dropped.
fn remap_into_viewport(position: Point2D, zoom: &ZoomState) -> (Point2D, bool) {
    if !zoom.is_active {
        return (position, true);
    }

    let half = 0.5 / zoom.scale;
    let origin = Point2D::new(zoom.center.x - half, zoom.center.y - half);
    let size = 2.0 * half;

    let visible = position.x >= origin.x
        && position.x <= origin.x + size
        && position.y >= origin.y
        && position.y <= origin.y + size;

    let local = Point2D::new((position.x - origin.x) / size, (position.y - origin.y) / size);
    (local, visible)
}
