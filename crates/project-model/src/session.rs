//! Normalized mouse/keyboard session model consumed by the engine.
//!
//! This is the analysis-facing view of a recording: a [`Session`] is built
//! once from a raw [`crate::event::InputEvent`] stream and is immutable for
//! the rest of the pipeline run.

use serde::{Deserialize, Serialize};

use crate::event::{ButtonState, EventKind, InputEvent, MouseButton};

/// Kind of a normalized mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEventKind {
    Move,
    LeftClick,
    RightClick,
    DoubleClick,
}

/// A normalized, timestamped mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Normalized position in `[0,1]²`.
    pub position: (f64, f64),
    /// Seconds since session start.
    pub t: f64,
}

/// Kind of a normalized keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardEventKind {
    Down,
    Up,
}

/// A normalized, timestamped keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub kind: KeyboardEventKind,
    pub t: f64,
    pub key_code: u16,
}

/// Errors raised while normalizing a raw event stream into a [`Session`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("event at index {index} has timestamp {t} earlier than the preceding event ({prev})")]
    NonMonotonic { index: usize, t: f64, prev: f64 },

    #[error("event at index {index} has a non-finite position ({x}, {y})")]
    InvalidPosition { index: usize, x: f64, y: f64 },

    #[error("event at index {index} has timestamp {t} past the declared session duration {duration}")]
    PastDuration { index: usize, t: f64, duration: f64 },

    #[error("duration must be finite and non-negative, got {duration}")]
    InvalidDuration { duration: f64 },
}

/// A normalized recording session: mouse and keyboard activity, ordered by
/// time, plus the session's total duration.
///
/// Invariant: every event's `t` is `<= duration`, and mouse/keyboard events
/// are each sorted non-decreasing by `t`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    mouse_events: Vec<MouseEvent>,
    keyboard_events: Vec<KeyboardEvent>,
    duration: f64,
}

/// How close in time two left clicks at (nearly) the same position must be
/// to be folded into a single `DoubleClick` mouse event kind.
const DOUBLE_CLICK_WINDOW_SECS: f64 = 0.35;
/// How close in normalized space two clicks must be to count as the same
/// spot for double-click detection.
const DOUBLE_CLICK_DISTANCE: f64 = 0.02;

impl Session {
    /// Build a session from a raw wire-format event stream.
    ///
    /// Click-down edges become [`MouseEvent`]s; pointer moves and click-ups
    /// are otherwise folded in by `t`. Two left-click-down edges close
    /// enough in time and space are merged into a single `DoubleClick`.
    pub fn from_input_events(
        events: &[InputEvent],
        duration: f64,
    ) -> Result<Self, SessionError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(SessionError::InvalidDuration { duration });
        }

        let mut mouse_events = Vec::new();
        let mut keyboard_events = Vec::new();
        let mut last_t = f64::NEG_INFINITY;

        for (index, event) in events.iter().enumerate() {
            let t = event.timestamp_secs();
            if t < last_t {
                return Err(SessionError::NonMonotonic {
                    index,
                    t,
                    prev: last_t,
                });
            }
            last_t = t;
            if t > duration {
                return Err(SessionError::PastDuration { index, t, duration });
            }

            match &event.kind {
                EventKind::Pointer { x, y } => {
                    check_position(index, *x, *y)?;
                    mouse_events.push(MouseEvent {
                        kind: MouseEventKind::Move,
                        position: (*x, *y),
                        t,
                    });
                }
                EventKind::Click {
                    button,
                    state,
                    x,
                    y,
                } => {
                    if *state != ButtonState::Down {
                        continue;
                    }
                    check_position(index, *x, *y)?;
                    let kind = match button {
                        MouseButton::Left => MouseEventKind::LeftClick,
                        MouseButton::Right => MouseEventKind::RightClick,
                        _ => MouseEventKind::LeftClick,
                    };
                    mouse_events.push(MouseEvent {
                        kind,
                        position: (*x, *y),
                        t,
                    });
                }
                EventKind::Scroll { .. } | EventKind::WindowFocus { .. } => {}
                EventKind::Key { state, .. } => {
                    let kind = match state {
                        ButtonState::Down => KeyboardEventKind::Down,
                        ButtonState::Up => KeyboardEventKind::Up,
                    };
                    keyboard_events.push(KeyboardEvent {
                        kind,
                        t,
                        key_code: key_code_of(event),
                    });
                }
            }
        }

        fold_double_clicks(&mut mouse_events);

        Ok(Self {
            mouse_events,
            keyboard_events,
            duration,
        })
    }

    /// Build a session directly from pre-normalized mouse/keyboard events,
    /// clamping out-of-range positions instead of rejecting them. Used when
    /// the caller prefers the §4.5.2 "never abort a render" path.
    pub fn from_parts_clamped(
        mut mouse_events: Vec<MouseEvent>,
        keyboard_events: Vec<KeyboardEvent>,
        duration: f64,
    ) -> Self {
        let original_duration = duration;
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        if duration != original_duration {
            tracing::warn!(original_duration, coerced_duration = duration, "clamped non-finite or negative session duration");
        }

        for (index, e) in mouse_events.iter_mut().enumerate() {
            let (x, y, t) = (e.position.0, e.position.1, e.t);
            e.position.0 = x.clamp(0.0, 1.0);
            e.position.1 = y.clamp(0.0, 1.0);
            e.t = t.clamp(0.0, duration);
            if e.position.0 != x || e.position.1 != y || e.t != t {
                tracing::warn!(index, from = ?(x, y, t), to = ?(e.position.0, e.position.1, e.t), "clamped out-of-range mouse event");
            }
        }
        mouse_events.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));

        let mut keyboard_events = keyboard_events;
        for (index, k) in keyboard_events.iter_mut().enumerate() {
            let t = k.t;
            k.t = t.clamp(0.0, duration);
            if k.t != t {
                tracing::warn!(index, from = t, to = k.t, "clamped out-of-range keyboard event timestamp");
            }
        }
        keyboard_events.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));

        Self {
            mouse_events,
            keyboard_events,
            duration,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn mouse_events(&self) -> &[MouseEvent] {
        &self.mouse_events
    }

    pub fn keyboard_events(&self) -> &[KeyboardEvent] {
        &self.keyboard_events
    }

    /// All click-kind mouse events (excludes plain moves), sorted by `t`.
    pub fn clicks(&self) -> impl Iterator<Item = &MouseEvent> {
        self.mouse_events
            .iter()
            .filter(|e| e.kind != MouseEventKind::Move)
    }

    /// Position of the most recent move/click at or before `t`. `None`
    /// before the first event.
    pub fn position_at(&self, t: f64) -> Option<(f64, f64)> {
        self.mouse_events
            .iter()
            .rev()
            .find(|e| e.t <= t)
            .map(|e| e.position)
    }

    pub fn is_empty(&self) -> bool {
        self.mouse_events.is_empty() && self.keyboard_events.is_empty()
    }
}

fn check_position(index: usize, x: f64, y: f64) -> Result<(), SessionError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(SessionError::InvalidPosition { index, x, y });
    }
    Ok(())
}

fn key_code_of(event: &InputEvent) -> u16 {
    match &event.kind {
        EventKind::Key { code, .. } => code.bytes().map(u16::from).sum(),
        _ => 0,
    }
}

fn fold_double_clicks(events: &mut Vec<MouseEvent>) {
    let mut i = 0;
    while i + 1 < events.len() {
        let a = events[i];
        let b = events[i + 1];
        let merges = a.kind == MouseEventKind::LeftClick
            && b.kind == MouseEventKind::LeftClick
            && (b.t - a.t) <= DOUBLE_CLICK_WINDOW_SECS
            && distance(a.position, b.position) <= DOUBLE_CLICK_DISTANCE;
        if merges {
            events[i].kind = MouseEventKind::DoubleClick;
            events[i].position = b.position;
            events[i].t = b.t;
            events.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ButtonState, MouseButton};

    #[test]
    fn empty_stream_gives_empty_session() {
        let session = Session::from_input_events(&[], 10.0).unwrap();
        assert!(session.is_empty());
        assert_eq!(session.duration(), 10.0);
        assert_eq!(session.position_at(5.0), None);
    }

    #[test]
    fn position_at_returns_most_recent_at_or_before() {
        let events = vec![
            InputEvent::pointer(0, 0.1, 0.1),
            InputEvent::pointer(1_000_000_000, 0.5, 0.5),
        ];
        let session = Session::from_input_events(&events, 5.0).unwrap();
        assert_eq!(session.position_at(0.5), Some((0.1, 0.1)));
        assert_eq!(session.position_at(1.0), Some((0.5, 0.5)));
        assert_eq!(session.position_at(2.0), Some((0.5, 0.5)));
    }

    #[test]
    fn non_monotonic_time_is_rejected() {
        let events = vec![
            InputEvent::pointer(1_000_000_000, 0.1, 0.1),
            InputEvent::pointer(500_000_000, 0.2, 0.2),
        ];
        let err = Session::from_input_events(&events, 5.0).unwrap_err();
        assert!(matches!(err, SessionError::NonMonotonic { .. }));
    }

    #[test]
    fn event_past_duration_is_rejected() {
        let events = vec![InputEvent::pointer(11_000_000_000, 0.1, 0.1)];
        let err = Session::from_input_events(&events, 10.0).unwrap_err();
        assert!(matches!(err, SessionError::PastDuration { .. }));
    }

    #[test]
    fn close_left_clicks_merge_into_double_click() {
        let events = vec![
            InputEvent::click(1_000_000_000, MouseButton::Left, ButtonState::Down, 0.5, 0.5),
            InputEvent::click(1_200_000_000, MouseButton::Left, ButtonState::Down, 0.505, 0.5),
        ];
        let session = Session::from_input_events(&events, 5.0).unwrap();
        let clicks: Vec<_> = session.clicks().collect();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].kind, MouseEventKind::DoubleClick);
    }

    #[test]
    fn distant_clicks_stay_separate() {
        let events = vec![
            InputEvent::click(1_000_000_000, MouseButton::Left, ButtonState::Down, 0.1, 0.1),
            InputEvent::click(3_000_000_000, MouseButton::Left, ButtonState::Down, 0.9, 0.9),
        ];
        let session = Session::from_input_events(&events, 5.0).unwrap();
        assert_eq!(session.clicks().count(), 2);
    }

    #[test]
    fn from_parts_clamped_keeps_in_bounds() {
        let session = Session::from_parts_clamped(
            vec![MouseEvent {
                kind: MouseEventKind::LeftClick,
                position: (-0.5, 1.5),
                t: -1.0,
            }],
            vec![],
            10.0,
        );
        let e = session.mouse_events()[0];
        assert_eq!(e.position, (0.0, 1.0));
        assert_eq!(e.t, 0.0);
    }
}
