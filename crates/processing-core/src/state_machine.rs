//! The zoom state machine: Idle / EaseIn / Hold / Follow / Transition / EaseOut.
//!
//! This is driven tick-by-tick by the timeline builder, which also owns the
//! keyframe-recording cadence. The machine itself only tracks *what the
//! camera is doing right now* given elapsed time and the latest inputs.

use grabme_project_model::timeline::{Phase, Settings};
use grabme_project_model::viewport::Point2D;

use crate::aggregator::AnchorPoint;
use crate::attention::AttentionRegion;
use crate::dynamic_scale::dynamic_scale;
use crate::spring::SpringState2D;

/// Radius (normalized) the cursor must leave before Hold yields to Follow.
const FOLLOW_LEAVE_RADIUS: f64 = 0.03;
/// Re-entry radius for Follow→Hold hysteresis (smaller than the leave
/// radius, so the camera doesn't flicker at the boundary).
const FOLLOW_REENTER_RADIUS: f64 = FOLLOW_LEAVE_RADIUS * 0.8;
/// How long cursor speed must stay below threshold before Follow settles.
const FOLLOW_SETTLE_TIME: f64 = 0.25;
/// Speed (normalized units/sec) below which the cursor counts as "at rest".
const FOLLOW_SETTLE_VELOCITY: f64 = 0.05;
/// Cursor lookahead applied to the Follow spring's target (§4.5.1).
const FOLLOW_LOOKAHEAD_SECS: f64 = 0.1;

fn region_from_anchor(anchor: &AnchorPoint, now: f64) -> AttentionRegion {
    // AttentionRegion has no public constructor outside this crate's module;
    // go through the public API it exposes for scoring comparisons.
    let mut scorer = crate::attention::AttentionScorer::new();
    scorer.add_event(&grabme_project_model::session::MouseEvent {
        kind: grabme_project_model::session::MouseEventKind::LeftClick,
        position: (anchor.center.x, anchor.center.y),
        t: now,
    });
    let mut region = scorer.regions()[0];
    region.score = anchor.score;
    region.event_count = anchor.event_count;
    region.last_update = anchor.t_end;
    region
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MachineState {
    Idle,
    EaseIn {
        anchor: AnchorPoint,
        start_t: f64,
        from_center: Point2D,
        from_scale: f64,
        to_scale: f64,
    },
    Hold {
        anchor: AnchorPoint,
        since: f64,
        hold_until: f64,
    },
    Follow {
        anchor: AnchorPoint,
        scale: f64,
        spring: SpringState2D,
        rest_since: Option<f64>,
        last_cursor: Option<Point2D>,
    },
    Pan {
        to: AnchorPoint,
        start_t: f64,
        from_center: Point2D,
        from_scale: f64,
        to_scale: f64,
    },
    ZoomOut {
        to: AnchorPoint,
        start_t: f64,
        from_center: Point2D,
        from_scale: f64,
    },
    PanAtFloor {
        to: AnchorPoint,
        start_t: f64,
        from_center: Point2D,
    },
    EaseInAfterZoomOut {
        to: AnchorPoint,
        start_t: f64,
        to_scale: f64,
    },
    EaseOut {
        start_t: f64,
        from_center: Point2D,
        from_scale: f64,
    },
}

/// Drives the zoom state machine through time. Pure: no I/O, no wall-clock.
#[derive(Debug, Clone)]
pub struct ZoomMachine {
    settings: Settings,
    state: MachineState,
    last_keyboard_t: Option<f64>,
    last_activity_t: f64,
    prev_phase: Phase,
}

/// Result of advancing the machine by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineOutput {
    pub center: Point2D,
    pub scale: f64,
    pub phase: Phase,
    /// `true` iff this tick crossed a state-transition boundary — the
    /// timeline builder always records a keyframe on these ticks.
    pub transitioned: bool,
}

impl ZoomMachine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: MachineState::Idle,
            last_keyboard_t: None,
            last_activity_t: 0.0,
            prev_phase: Phase::Idle,
        }
    }

    fn hold_duration(&self, event_count: u32) -> f64 {
        let extended = self.settings.hold_base
            + self.settings.hold_extension_per_event * (event_count.saturating_sub(1)) as f64;
        extended.clamp(self.settings.hold_min, self.settings.hold_max)
    }

    fn enter_ease_in(&mut self, anchor: AnchorPoint, now: f64, from_center: Point2D, from_scale: f64) {
        let to_scale = dynamic_scale(anchor.center.x, anchor.center.y, &self.settings);
        self.state = MachineState::EaseIn {
            anchor,
            start_t: now,
            from_center,
            from_scale,
            to_scale,
        };
        self.last_activity_t = now;
    }

    fn enter_ease_out(&mut self, now: f64, from_center: Point2D, from_scale: f64) {
        self.state = MachineState::EaseOut {
            start_t: now,
            from_center,
            from_scale,
        };
    }

    fn enter_pan(&mut self, to: AnchorPoint, now: f64, from_center: Point2D, from_scale: f64) {
        let to_scale = dynamic_scale(to.center.x, to.center.y, &self.settings);
        self.state = MachineState::Pan {
            to,
            start_t: now,
            from_center,
            from_scale,
            to_scale,
        };
        self.last_activity_t = now;
    }

    fn enter_zoom_out_pan_zoom_in(&mut self, to: AnchorPoint, now: f64, from_center: Point2D, from_scale: f64) {
        self.state = MachineState::ZoomOut {
            to,
            start_t: now,
            from_center,
            from_scale,
        };
        self.last_activity_t = now;
    }

    fn enter_hold(&mut self, anchor: AnchorPoint, now: f64) {
        let hold_until = now + self.hold_duration(anchor.event_count);
        self.state = MachineState::Hold {
            anchor,
            since: now,
            hold_until,
        };
        self.last_activity_t = now;
    }

    /// §4.5 rule 7 / the "Protection window": while Hold is active and
    /// `zoom_out_on_keyboard` is set, a keydown extends `hold_until` out to
    /// `now + keyboard_hold_buffer` (never pulling it earlier) instead of
    /// interrupting Hold, so a typing burst keeps the camera in place.
    fn register_keyboard_activity(&mut self, now: f64) {
        self.last_keyboard_t = Some(now);
        if !self.settings.zoom_out_on_keyboard {
            return;
        }
        if let MachineState::Hold { anchor, since, hold_until } = self.state {
            let extended_until = (now + self.settings.keyboard_hold_buffer).max(hold_until);
            self.state = MachineState::Hold { anchor, since, hold_until: extended_until };
            self.last_activity_t = now;
        }
    }

    /// Decide what a newly arrived anchor should do to the current state.
    fn handle_anchor(&mut self, anchor: &AnchorPoint, now: f64) {
        self.last_activity_t = now;
        let state = self.state;
        match state {
            MachineState::Idle => {
                if anchor.is_hard_trigger {
                    self.enter_ease_in(*anchor, now, Point2D::new(0.5, 0.5), 1.0);
                }
            }
            MachineState::Hold {
                anchor: current,
                since,
                ..
            } => {
                let merges = current.center.distance_to(&anchor.center) <= crate::attention::MERGE_RADIUS;
                if merges {
                    let combined_count = current.event_count + anchor.event_count;
                    self.state = MachineState::Hold {
                        anchor: AnchorPoint {
                            event_count: combined_count,
                            t_end: anchor.t_end,
                            ..current
                        },
                        since,
                        hold_until: now + self.hold_duration(combined_count),
                    };
                    return;
                }

                let current_region = region_from_anchor(&current, now);
                let new_region = region_from_anchor(anchor, now);
                let scorer = crate::attention::AttentionScorer::new();
                let hold_elapsed = now - since;
                let interrupt = scorer.should_interrupt_hold(
                    &new_region,
                    &current_region,
                    hold_elapsed,
                    now,
                    self.settings.hold_min,
                    self.settings.t_confirm,
                );
                if !interrupt {
                    return;
                }

                let current_scale = dynamic_scale(current.center.x, current.center.y, &self.settings);
                let distance = current.center.distance_to(&anchor.center);
                if distance <= self.settings.large_distance_threshold {
                    self.enter_pan(*anchor, now, current.center, current_scale);
                } else {
                    self.enter_zoom_out_pan_zoom_in(*anchor, now, current.center, current_scale);
                }
            }
            MachineState::Follow { anchor: current, scale, .. } => {
                let current_region = region_from_anchor(&current, now);
                let new_region = region_from_anchor(anchor, now);
                let scorer = crate::attention::AttentionScorer::new();
                let interrupt = scorer.should_interrupt_hold(
                    &new_region,
                    &current_region,
                    self.settings.hold_min,
                    now,
                    self.settings.hold_min,
                    self.settings.t_confirm,
                );
                if interrupt {
                    let distance = current.center.distance_to(&anchor.center);
                    if distance <= self.settings.large_distance_threshold {
                        self.enter_pan(*anchor, now, current.center, scale);
                    } else {
                        self.enter_zoom_out_pan_zoom_in(*anchor, now, current.center, scale);
                    }
                }
            }
            // EaseIn/Transition/EaseOut: don't retarget mid-motion; the
            // anchor is dropped. This keeps the "no teleport while zoomed"
            // invariant trivially true and matches the anti-jitter intent
            // of the Hold interrupt policy.
            MachineState::EaseIn { .. }
            | MachineState::Pan { .. }
            | MachineState::ZoomOut { .. }
            | MachineState::PanAtFloor { .. }
            | MachineState::EaseInAfterZoomOut { .. }
            | MachineState::EaseOut { .. } => {}
        }
    }

    fn check_ease_out_triggers(&mut self, now: f64) {
        let active = !matches!(self.state, MachineState::Idle | MachineState::EaseOut { .. });
        if !active {
            return;
        }

        let idle_timeout_hit = now - self.last_activity_t > self.settings.idle_timeout;
        let keyboard_timeout_hit = self.settings.zoom_out_on_keyboard
            && self
                .last_keyboard_t
                .is_some_and(|tk| now - tk >= self.settings.keyboard_hold_buffer);
        let hold_expired = matches!(self.state, MachineState::Hold { hold_until, .. } if now >= hold_until);

        if idle_timeout_hit || keyboard_timeout_hit || hold_expired {
            let (center, scale) = self.current_center_scale(now);
            self.enter_ease_out(now, center, scale);
        }
    }

    fn current_center_scale(&self, now: f64) -> (Point2D, f64) {
        match self.state {
            MachineState::Idle => (Point2D::new(0.5, 0.5), 1.0),
            MachineState::EaseIn {
                start_t,
                from_center,
                from_scale,
                to_scale,
                anchor,
                ..
            } => {
                let u = progress(now, start_t, self.settings.ease_in_duration);
                let eased = self.settings.easing.apply(u);
                (
                    Point2D::lerp(&from_center, &anchor.center, eased),
                    lerp(from_scale, to_scale, eased),
                )
            }
            MachineState::Hold { anchor, .. } => {
                let scale = dynamic_scale(anchor.center.x, anchor.center.y, &self.settings);
                (anchor.center, scale)
            }
            MachineState::Follow { spring, scale, .. } => {
                let (x, y) = spring.value();
                (Point2D::new(x, y), scale)
            }
            MachineState::Pan {
                start_t,
                from_center,
                from_scale,
                to_scale,
                to,
            } => {
                let u = progress(now, start_t, self.settings.pan_duration);
                let eased = self.settings.easing.apply(u);
                (
                    Point2D::lerp(&from_center, &to.center, eased),
                    lerp(from_scale, to_scale, eased),
                )
            }
            MachineState::ZoomOut {
                start_t,
                from_center,
                from_scale,
                ..
            } => {
                let u = progress(now, start_t, self.settings.ease_out_duration);
                let eased = self.settings.easing.apply(u);
                (from_center, lerp(from_scale, 1.0, eased))
            }
            MachineState::PanAtFloor {
                start_t,
                from_center,
                to,
            } => {
                let u = progress(now, start_t, self.settings.pan_duration);
                let eased = self.settings.easing.apply(u);
                (Point2D::lerp(&from_center, &to.center, eased), 1.0)
            }
            MachineState::EaseInAfterZoomOut {
                start_t,
                to_scale,
                to,
                ..
            } => {
                let u = progress(now, start_t, self.settings.ease_in_duration);
                let eased = self.settings.easing.apply(u);
                (to.center, lerp(1.0, to_scale, eased))
            }
            MachineState::EaseOut {
                start_t,
                from_center,
                from_scale,
            } => {
                let u = progress(now, start_t, self.settings.ease_out_duration);
                let eased = self.settings.easing.apply(u);
                (from_center, lerp(from_scale, 1.0, eased))
            }
        }
    }

    fn phase(&self) -> Phase {
        match self.state {
            MachineState::Idle => Phase::Idle,
            MachineState::EaseIn { .. } => Phase::EaseIn,
            MachineState::Hold { .. } => Phase::Hold,
            MachineState::Follow { .. } => Phase::Follow,
            MachineState::Pan { .. } => Phase::Pan,
            MachineState::ZoomOut { .. }
            | MachineState::PanAtFloor { .. }
            | MachineState::EaseInAfterZoomOut { .. } => Phase::ZoomOutPanZoomIn,
            MachineState::EaseOut { .. } => Phase::EaseOut,
        }
    }

    /// Automatic progression: EaseIn→Hold, Pan→Hold, the three
    /// ZoomOutPanZoomIn sub-stages, EaseOut→Idle, and the Follow↔Hold
    /// cursor-driven transitions.
    fn advance_automatic(&mut self, now: f64, cursor: Option<Point2D>, dt: f64) {
        let state = self.state;
        match state {
            MachineState::EaseIn { anchor, start_t, .. } => {
                if now - start_t >= self.settings.ease_in_duration {
                    self.enter_hold(anchor, now);
                }
            }
            MachineState::Hold { anchor, since, .. } => {
                let hold_elapsed = now - since;
                if let Some(cursor) = cursor {
                    let left_radius = cursor.distance_to(&anchor.center) > FOLLOW_LEAVE_RADIUS;
                    if left_radius && hold_elapsed >= self.settings.hold_min {
                        let scale = dynamic_scale(anchor.center.x, anchor.center.y, &self.settings);
                        let mut spring = SpringState2D::at_rest((anchor.center.x, anchor.center.y));
                        spring.retarget((cursor.x, cursor.y));
                        self.state = MachineState::Follow {
                            anchor,
                            scale,
                            spring,
                            rest_since: None,
                            last_cursor: Some(cursor),
                        };
                    }
                }
            }
            MachineState::Follow {
                anchor,
                scale,
                mut spring,
                mut rest_since,
                mut last_cursor,
            } => {
                if let Some(cursor) = cursor {
                    let mut lookahead_target = cursor;
                    if let Some(prev) = last_cursor {
                        if dt > 0.0 {
                            let vx = (cursor.x - prev.x) / dt;
                            let vy = (cursor.y - prev.y) / dt;
                            lookahead_target = Point2D::new(
                                cursor.x + vx * FOLLOW_LOOKAHEAD_SECS,
                                cursor.y + vy * FOLLOW_LOOKAHEAD_SECS,
                            );
                        }
                    }
                    let target = constrain_follow_center(lookahead_target, scale, self.settings.follow_edge_margin);
                    spring.retarget((target.x, target.y));
                    last_cursor = Some(cursor);
                }
                let velocity = (spring.x.velocity.powi(2) + spring.y.velocity.powi(2)).sqrt();
                spring.step(&self.settings.spring, dt);

                if velocity < FOLLOW_SETTLE_VELOCITY {
                    rest_since = Some(rest_since.unwrap_or(now));
                } else {
                    rest_since = None;
                }

                let near_anchor = cursor
                    .map(|c| c.distance_to(&anchor.center) <= FOLLOW_REENTER_RADIUS)
                    .unwrap_or(false);
                let settled = rest_since.is_some_and(|since| now - since >= FOLLOW_SETTLE_TIME);

                if near_anchor && settled {
                    self.enter_hold(anchor, now);
                } else {
                    self.state = MachineState::Follow {
                        anchor,
                        scale,
                        spring,
                        rest_since,
                        last_cursor,
                    };
                }
            }
            MachineState::Pan { to, start_t, .. } => {
                if now - start_t >= self.settings.pan_duration {
                    self.enter_hold(to, now);
                }
            }
            MachineState::ZoomOut {
                to, start_t, from_center, ..
            } => {
                if now - start_t >= self.settings.ease_out_duration {
                    self.state = MachineState::PanAtFloor {
                        to,
                        start_t: now,
                        from_center,
                    };
                }
            }
            MachineState::PanAtFloor { to, start_t, .. } => {
                if now - start_t >= self.settings.pan_duration {
                    let to_scale = dynamic_scale(to.center.x, to.center.y, &self.settings);
                    self.state = MachineState::EaseInAfterZoomOut {
                        to,
                        start_t: now,
                        to_scale,
                    };
                }
            }
            MachineState::EaseInAfterZoomOut { to, start_t, .. } => {
                if now - start_t >= self.settings.ease_in_duration {
                    self.enter_hold(to, now);
                }
            }
            MachineState::EaseOut { start_t, .. } => {
                if now - start_t >= self.settings.ease_out_duration {
                    self.state = MachineState::Idle;
                }
            }
            MachineState::Idle => {}
        }
    }

    /// Advance the machine to `now`, applying any anchor/keyboard input that
    /// arrived exactly at this tick.
    pub fn step(
        &mut self,
        now: f64,
        dt: f64,
        cursor: Option<Point2D>,
        anchor: Option<&AnchorPoint>,
        keyboard_down: bool,
    ) -> MachineOutput {
        if keyboard_down {
            self.register_keyboard_activity(now);
        }
        if let Some(anchor) = anchor {
            self.handle_anchor(anchor, now);
        }

        self.check_ease_out_triggers(now);
        self.advance_automatic(now, cursor, dt);

        let (mut center, mut scale) = self.current_center_scale(now);
        if scale > 1.0 + 1e-9 {
            let half = 0.5 / scale;
            center.x = center.x.clamp(half, 1.0 - half);
            center.y = center.y.clamp(half, 1.0 - half);
        }
        scale = scale.clamp(1.0, self.settings.max_scale);

        let phase = self.phase();
        let transitioned = phase != self.prev_phase;
        self.prev_phase = phase;

        MachineOutput {
            center,
            scale,
            phase,
            transitioned,
        }
    }
}

fn progress(now: f64, start_t: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        1.0
    } else {
        ((now - start_t) / duration).clamp(0.0, 1.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// §4.5.1: keep the follow target inside a safe sub-rectangle of the
/// current viewport, `edge_margin` narrower on each side than the raw
/// boundary constraint, so the viewport itself never has to touch the
/// capture region's edge while tracking the cursor.
fn constrain_follow_center(cursor: Point2D, scale: f64, edge_margin: f64) -> Point2D {
    let half = 0.5 / scale;
    let margin = edge_margin.min(half);
    let lo = half + margin;
    let hi = (1.0 - half - margin).max(lo);
    Point2D::new(cursor.x.clamp(lo, hi), cursor.y.clamp(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_at(x: f64, y: f64, t: f64) -> AnchorPoint {
        AnchorPoint {
            center: Point2D::new(x, y),
            t_start: t,
            t_end: t,
            score: 1.0,
            is_hard_trigger: true,
            event_count: 1,
        }
    }

    #[test]
    fn idle_stays_idle_without_anchors() {
        let mut machine = ZoomMachine::new(Settings::default());
        let out = machine.step(1.0, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::Idle);
        assert_eq!(out.scale, 1.0);
    }

    #[test]
    fn hard_trigger_anchor_starts_ease_in() {
        let mut machine = ZoomMachine::new(Settings::default());
        let anchor = anchor_at(0.5, 0.5, 1.0);
        let out = machine.step(1.0, 1.0 / 60.0, None, Some(&anchor), false);
        assert_eq!(out.phase, Phase::EaseIn);
    }

    #[test]
    fn ease_in_completes_into_hold() {
        let settings = Settings::default();
        let mut machine = ZoomMachine::new(settings.clone());
        let anchor = anchor_at(0.5, 0.5, 1.0);
        machine.step(1.0, 1.0 / 60.0, None, Some(&anchor), false);
        let out = machine.step(1.0 + settings.ease_in_duration + 0.01, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::Hold);
        assert!(out.scale > 1.0);
    }

    #[test]
    fn zoomed_viewport_always_fits_in_unit_square() {
        let mut machine = ZoomMachine::new(Settings::default());
        let anchor = anchor_at(0.02, 0.02, 1.0);
        let out = machine.step(1.0, 1.0 / 60.0, None, Some(&anchor), false);
        let half = 0.5 / out.scale;
        assert!(out.center.x >= half - 1e-9 && out.center.x <= 1.0 - half + 1e-9);
        assert!(out.center.y >= half - 1e-9 && out.center.y <= 1.0 - half + 1e-9);
    }

    #[test]
    fn keydown_during_hold_extends_past_hold_until() {
        let settings = Settings::default();
        let mut machine = ZoomMachine::new(settings.clone());
        let anchor = anchor_at(0.5, 0.5, 1.0);
        machine.step(1.0, 1.0 / 60.0, None, Some(&anchor), false);
        let into_hold = 1.0 + settings.ease_in_duration + 0.01;
        let out = machine.step(into_hold, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::Hold);

        // hold_duration(1 event) is well under keyboard_hold_buffer, so
        // without the keydown the hold would have expired by now.
        let past_bare_hold = into_hold + settings.hold_max + 0.01;
        let keydown_t = into_hold + 0.1;
        machine.step(keydown_t, 1.0 / 60.0, None, None, true);
        let out = machine.step(past_bare_hold, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::Hold, "keydown should have pushed hold_until out");

        let protection_ends = keydown_t + settings.keyboard_hold_buffer + 0.01;
        let out = machine.step(protection_ends, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::EaseOut);

        let after_ease_out = protection_ends + settings.ease_out_duration + 0.01;
        let out = machine.step(after_ease_out, 1.0 / 60.0, None, None, false);
        assert_eq!(out.phase, Phase::Idle);
    }
}
