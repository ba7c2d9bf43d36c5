//! Position-dependent zoom factor: pulls the scale down near screen edges
//! (where clipping the viewport would feel cramped) and boosts it in
//! corners (where content is usually densest — toolbars, menus).

use grabme_project_model::timeline::Settings;

/// `τ` in the corner test: a point within `τ` of an edge on both axes
/// counts as a corner.
const CORNER_TAU: f64 = 0.2;

/// Compute the zoom scale for a click/anchor landing at normalized `(x, y)`.
pub fn dynamic_scale(x: f64, y: f64, settings: &Settings) -> f64 {
    if !settings.dynamic_scale_enabled {
        return settings.base_scale.clamp(1.0, settings.max_scale);
    }

    let edge_dist = x.min(1.0 - x).min(y).min(1.0 - y);
    let norm = edge_dist / 0.5;
    let factor =
        settings.edge_factor_max - (settings.edge_factor_max - settings.edge_factor_min) * norm;

    let is_corner = (x < CORNER_TAU || x > 1.0 - CORNER_TAU) && (y < CORNER_TAU || y > 1.0 - CORNER_TAU);
    let corner_boost = if is_corner { settings.corner_boost } else { 1.0 };

    let scale = settings.base_scale * factor * corner_boost;
    scale.clamp(1.0, settings.max_scale)
}
