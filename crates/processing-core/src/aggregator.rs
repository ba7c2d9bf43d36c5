//! Event aggregator: folds chronologically sorted clicks into AnchorPoints.
//!
//! Two clicks merge into the same chain iff they are within
//! `click_merge_time` AND `d_merge` of each other; merging is greedy and
//! transitive along the chain (not pairwise against every prior click).
//! Moves never produce anchors on their own — they feed Follow mode instead.

use grabme_project_model::session::{MouseEvent, MouseEventKind};
use grabme_project_model::timeline::Settings;
use grabme_project_model::viewport::Point2D;

/// A small pre-buffer subtracted from a chain's first click time, giving the
/// ease-in a little lead time before the click itself lands.
const PRE_BUFFER_SECS: f64 = 0.05;

fn click_weight(kind: MouseEventKind) -> f64 {
    match kind {
        MouseEventKind::DoubleClick => 1.5,
        MouseEventKind::LeftClick | MouseEventKind::RightClick => 1.0,
        MouseEventKind::Move => 0.0,
    }
}

/// A merged cluster of one or more clicks representing one point of
/// sustained user attention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub center: Point2D,
    pub t_start: f64,
    pub t_end: f64,
    pub score: f64,
    pub is_hard_trigger: bool,
    pub event_count: u32,
}

/// Fold clicks (all kinds treated equivalently for merge purposes) into
/// [`AnchorPoint`]s. `events` must already be sorted by `t`.
pub fn aggregate(events: &[MouseEvent], settings: &Settings) -> Vec<AnchorPoint> {
    let d_merge = settings.click_merge_distance_normalized();
    let clicks: Vec<&MouseEvent> = events
        .iter()
        .filter(|e| e.kind != MouseEventKind::Move)
        .collect();

    let mut anchors = Vec::new();
    let mut chain: Vec<&MouseEvent> = Vec::new();

    for click in clicks {
        let merges_into_chain = chain.last().is_some_and(|prev| {
            (click.t - prev.t) <= settings.click_merge_time
                && distance(click.position, prev.position) <= d_merge
        });

        if !merges_into_chain && !chain.is_empty() {
            anchors.push(finalize_chain(&chain));
            chain.clear();
        }
        chain.push(click);
    }

    if !chain.is_empty() {
        anchors.push(finalize_chain(&chain));
    }

    anchors
}

fn finalize_chain(chain: &[&MouseEvent]) -> AnchorPoint {
    let total_weight: f64 = chain.iter().map(|e| click_weight(e.kind)).sum();
    let (mut cx, mut cy) = (0.0, 0.0);
    for event in chain {
        let w = if total_weight > 0.0 {
            click_weight(event.kind) / total_weight
        } else {
            1.0 / chain.len() as f64
        };
        cx += event.position.0 * w;
        cy += event.position.1 * w;
    }

    let t_start = chain.first().unwrap().t - PRE_BUFFER_SECS;
    let t_end = chain.last().unwrap().t;

    AnchorPoint {
        center: Point2D::new(cx, cy),
        t_start: t_start.max(0.0),
        t_end,
        score: total_weight.max(1.0),
        is_hard_trigger: true,
        event_count: chain.len() as u32,
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(x: f64, y: f64, t: f64) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::LeftClick,
            position: (x, y),
            t,
        }
    }

    #[test]
    fn lone_click_becomes_an_anchor() {
        let settings = Settings::default();
        let anchors = aggregate(&[click(0.5, 0.5, 1.0)], &settings);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].t_end, 1.0);
        assert!(anchors[0].is_hard_trigger);
    }

    #[test]
    fn moves_alone_produce_no_anchors() {
        let settings = Settings::default();
        let moves = vec![MouseEvent {
            kind: MouseEventKind::Move,
            position: (0.5, 0.5),
            t: 1.0,
        }];
        assert!(aggregate(&moves, &settings).is_empty());
    }

    #[test]
    fn two_near_clicks_merge_into_one_anchor() {
        let settings = Settings::default();
        let events = vec![click(0.50, 0.50, 1.00), click(0.52, 0.52, 1.20)];
        let anchors = aggregate(&events, &settings);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].event_count, 2);
        assert_eq!(anchors[0].t_end, 1.20);
    }

    #[test]
    fn distant_clicks_become_separate_anchors() {
        let settings = Settings::default();
        let events = vec![click(0.1, 0.1, 1.0), click(0.9, 0.9, 3.0)];
        let anchors = aggregate(&events, &settings);
        assert_eq!(anchors.len(), 2);
    }

    #[test]
    fn merge_is_inclusive_at_exact_time_threshold() {
        let mut settings = Settings::default();
        settings.click_merge_time = 0.35;
        let events = vec![click(0.5, 0.5, 1.0), click(0.5, 0.5, 1.35)];
        let anchors = aggregate(&events, &settings);
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn chain_merges_transitively_even_if_ends_are_far_apart() {
        let mut settings = Settings::default();
        settings.click_merge_distance_px = 500.0;
        let events = vec![
            click(0.1, 0.1, 1.0),
            click(0.13, 0.1, 1.1),
            click(0.16, 0.1, 1.2),
        ];
        let anchors = aggregate(&events, &settings);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].event_count, 3);
    }
}
