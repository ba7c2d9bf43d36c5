//! Attention scorer: spatial-proximity region clustering with exponential
//! score decay, used to decide when a new region should interrupt a Hold.

use grabme_project_model::session::{MouseEvent, MouseEventKind};
use grabme_project_model::viewport::Point2D;

/// Radius (normalized) within which a new event merges into an existing
/// region rather than opening a new one.
pub const MERGE_RADIUS: f64 = 0.08;
/// Score time constant for exponential decay (seconds).
pub const DECAY_TAU: f64 = 0.7;
/// Regions below this score are dropped.
pub const SCORE_MIN: f64 = 0.05;
/// Event-count dwell threshold for a soft (non-click) zoom trigger.
const N_DWELL: u32 = 6;
/// Click-weight equivalent for the hard-trigger threshold.
const HARD_THRESHOLD: f64 = 1.0;
/// Score multiplier a new region must beat to promote over the current one.
const PROMOTION_FACTOR: f64 = 1.2;
/// Distance beyond which a new region always interrupts Hold immediately.
const LARGE_INTERRUPT_DISTANCE: f64 = 0.6;

fn event_score(kind: MouseEventKind) -> f64 {
    match kind {
        MouseEventKind::DoubleClick => 1.5,
        MouseEventKind::LeftClick | MouseEventKind::RightClick => 1.0,
        MouseEventKind::Move => 0.15,
    }
}

/// A spatially-clustered region of recent user attention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionRegion {
    pub center: Point2D,
    pub score: f64,
    pub last_update: f64,
    pub event_count: u32,
}

impl AttentionRegion {
    fn new(center: Point2D, score: f64, t: f64) -> Self {
        Self {
            center,
            score,
            last_update: t,
            event_count: 1,
        }
    }

    fn absorb(&mut self, position: Point2D, score: f64, t: f64) {
        let total = self.score + score;
        let alpha = if total > 0.0 { score / total } else { 0.0 };
        self.center = Point2D::lerp(&self.center, &position, alpha);
        self.score = total;
        self.last_update = t;
        self.event_count += 1;
    }

    /// `true` if this region's score/dwell is enough to force a zoom on
    /// its own, independent of comparison to any currently-held region.
    pub fn should_trigger_zoom(&self) -> bool {
        self.score >= HARD_THRESHOLD || self.event_count >= N_DWELL
    }
}

/// Tracks a small active set of [`AttentionRegion`]s over time.
#[derive(Debug, Clone, Default)]
pub struct AttentionScorer {
    regions: Vec<AttentionRegion>,
}

impl AttentionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[AttentionRegion] {
        &self.regions
    }

    /// Fold a mouse event into the nearest region (within [`MERGE_RADIUS`])
    /// or open a new one.
    pub fn add_event(&mut self, event: &MouseEvent) {
        let position = Point2D::new(event.position.0, event.position.1);
        let score = event_score(event.kind);

        let nearest = self
            .regions
            .iter_mut()
            .filter(|r| r.center.distance_to(&position) <= MERGE_RADIUS)
            .min_by(|a, b| {
                a.center
                    .distance_to(&position)
                    .partial_cmp(&b.center.distance_to(&position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        match nearest {
            Some(region) => region.absorb(position, score, event.t),
            None => self.regions.push(AttentionRegion::new(position, score, event.t)),
        }
    }

    /// Exponentially decay every region's score toward the given time and
    /// drop any that fall below [`SCORE_MIN`].
    pub fn decay_scores(&mut self, t: f64) {
        for region in &mut self.regions {
            let dt = (t - region.last_update).max(0.0);
            region.score *= (-dt / DECAY_TAU).exp();
        }
        self.regions.retain(|r| r.score >= SCORE_MIN);
    }

    /// The anti-jitter policy deciding whether `new_region` should
    /// interrupt an active Hold centered on `current_region`.
    pub fn should_interrupt_hold(
        &self,
        new_region: &AttentionRegion,
        current_region: &AttentionRegion,
        hold_elapsed: f64,
        now: f64,
        hold_min: f64,
        t_confirm: f64,
    ) -> bool {
        let distance = new_region.center.distance_to(&current_region.center);
        if distance > LARGE_INTERRUPT_DISTANCE {
            return true;
        }

        let dwell_confirmed = (now - new_region.last_update) >= t_confirm
            && new_region.score >= current_region.score * PROMOTION_FACTOR;
        if dwell_confirmed {
            return true;
        }

        if hold_elapsed >= hold_min && new_region.should_trigger_zoom() {
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(kind: MouseEventKind, x: f64, y: f64, t: f64) -> MouseEvent {
        MouseEvent {
            kind,
            position: (x, y),
            t,
        }
    }

    #[test]
    fn nearby_events_merge_into_one_region() {
        let mut scorer = AttentionScorer::new();
        scorer.add_event(&mv(MouseEventKind::LeftClick, 0.5, 0.5, 0.0));
        scorer.add_event(&mv(MouseEventKind::LeftClick, 0.52, 0.51, 0.1));
        assert_eq!(scorer.regions().len(), 1);
        assert_eq!(scorer.regions()[0].event_count, 2);
    }

    #[test]
    fn distant_events_open_separate_regions() {
        let mut scorer = AttentionScorer::new();
        scorer.add_event(&mv(MouseEventKind::LeftClick, 0.1, 0.1, 0.0));
        scorer.add_event(&mv(MouseEventKind::LeftClick, 0.9, 0.9, 0.1));
        assert_eq!(scorer.regions().len(), 2);
    }

    #[test]
    fn score_decays_and_region_drops_below_min() {
        let mut scorer = AttentionScorer::new();
        scorer.add_event(&mv(MouseEventKind::Move, 0.5, 0.5, 0.0));
        scorer.decay_scores(10.0);
        assert!(scorer.regions().is_empty());
    }

    #[test]
    fn click_alone_reaches_hard_trigger() {
        let mut scorer = AttentionScorer::new();
        scorer.add_event(&mv(MouseEventKind::LeftClick, 0.5, 0.5, 0.0));
        assert!(scorer.regions()[0].should_trigger_zoom());
    }

    #[test]
    fn large_distance_always_interrupts() {
        let scorer = AttentionScorer::new();
        let current = AttentionRegion::new(Point2D::new(0.1, 0.1), 1.0, 0.0);
        let new_region = AttentionRegion::new(Point2D::new(0.9, 0.9), 0.1, 1.0);
        assert!(scorer.should_interrupt_hold(&new_region, &current, 0.0, 1.0, 0.6, 0.18));
    }

    #[test]
    fn small_transient_region_does_not_interrupt_before_hold_min() {
        let scorer = AttentionScorer::new();
        let current = AttentionRegion::new(Point2D::new(0.2, 0.2), 1.0, 0.0);
        let new_region = AttentionRegion::new(Point2D::new(0.25, 0.22), 0.15, 0.3);
        assert!(!scorer.should_interrupt_hold(&new_region, &current, 0.1, 0.3, 0.6, 0.18));
    }
}
