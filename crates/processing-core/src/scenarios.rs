//! End-to-end scenario tests against fixed input sessions, exercising the
//! full `build_timeline`/`render_params` pipeline rather than individual
//! modules. Test-only; not part of the public surface.

#[cfg(test)]
mod tests {
    use grabme_project_model::event::{ButtonState, InputEvent, MouseButton};
    use grabme_project_model::session::Session;
    use grabme_project_model::timeline::{Phase, Settings};

    use crate::render_params::{build_timeline, render_params};

    fn click(x: f64, y: f64, t_secs: f64) -> InputEvent {
        InputEvent::click((t_secs * 1_000_000_000.0) as u64, MouseButton::Left, ButtonState::Down, x, y)
    }

    fn key_down(code: &str, t_secs: f64) -> InputEvent {
        InputEvent::key((t_secs * 1_000_000_000.0) as u64, code, ButtonState::Down)
    }

    /// S1: an empty session stays Idle at scale 1 throughout.
    #[test]
    fn s1_empty_session_stays_idle() {
        let session = Session::from_parts_clamped(vec![], vec![], 10.0);
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();
        let params = render_params(&timeline, &session, &settings, 5.0);
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.center.x, 0.5);
        assert_eq!(params.center.y, 0.5);
        assert_eq!(params.phase, Phase::Idle);
    }

    /// S2: a single centered click zooms in without the corner boost, then
    /// eases back to scale 1 by the end of the session.
    #[test]
    fn s2_single_centered_click_zooms_without_corner_boost() {
        let events = vec![click(0.5, 0.5, 1.0)];
        let session = Session::from_input_events(&events, 5.0).unwrap();
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();

        let at_1_3 = render_params(&timeline, &session, &settings, 1.3);
        assert!(at_1_3.scale > 1.0);
        assert!(at_1_3.scale < settings.base_scale * settings.edge_factor_max);

        let at_end = render_params(&timeline, &session, &settings, 5.0);
        assert_eq!(at_end.scale, 1.0);
    }

    /// S3: a click near the screen edge gets a bigger scale than a
    /// centered one, and the viewport still fits inside the capture area.
    #[test]
    fn s3_edge_click_scales_more_than_centered() {
        let centered = vec![click(0.5, 0.5, 1.0)];
        let edge = vec![click(0.05, 0.5, 1.0)];
        let settings = Settings::default();

        let centered_session = Session::from_input_events(&centered, 5.0).unwrap();
        let edge_session = Session::from_input_events(&edge, 5.0).unwrap();

        let centered_timeline = build_timeline(&centered_session, &settings).unwrap();
        let edge_timeline = build_timeline(&edge_session, &settings).unwrap();

        let centered_params = render_params(&centered_timeline, &centered_session, &settings, 1.3);
        let edge_params = render_params(&edge_timeline, &edge_session, &settings, 1.3);

        assert!(edge_params.scale > centered_params.scale);

        let half = 0.5 / edge_params.scale;
        assert!(edge_params.center.x >= half - 1e-9);
        assert!(edge_params.center.x <= 1.0 - half + 1e-9);
    }

    /// S4: two near clicks merge into a single anchor — only one ease-in,
    /// no re-zoom at the second click.
    #[test]
    fn s4_two_near_clicks_merge_into_a_single_ease_in() {
        let events = vec![click(0.50, 0.50, 1.00), click(0.52, 0.52, 1.20)];
        let session = Session::from_input_events(&events, 5.0).unwrap();
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();

        let ease_ins = timeline
            .keyframes()
            .windows(2)
            .filter(|pair| pair[1].scale > pair[0].scale + 1e-6)
            .count();
        assert!(ease_ins <= 2, "expected at most one merged ease-in ramp, saw {ease_ins} rising segments");
    }

    /// S5: a large jump between two clicks produces a zoom-out/pan/zoom-in
    /// sequence rather than panning while still zoomed in.
    #[test]
    fn s5_large_distance_jump_zooms_out_before_panning() {
        let events = vec![click(0.1, 0.1, 1.0), click(0.9, 0.9, 3.0)];
        let session = Session::from_input_events(&events, 6.0).unwrap();
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();

        let mut t = 1.5;
        let mut saw_floor = false;
        while t <= 2.5 {
            let params = render_params(&timeline, &session, &settings, t);
            if params.scale <= 1.1 {
                saw_floor = true;
            }
            t += 0.05;
        }
        assert!(saw_floor, "expected the camera to return near scale 1 while panning between distant anchors");
    }

    /// S6: keyboard activity extends Hold past when the click alone would
    /// have eased out, and the eventual ease-out tracks the last keydown.
    #[test]
    fn s6_keyboard_activity_extends_the_hold() {
        let events = vec![click(0.5, 0.5, 1.0)];
        let keys = vec![
            key_down("KeyA", 1.5),
            key_down("KeyB", 2.0),
            key_down("KeyC", 2.5),
            key_down("KeyD", 3.0),
        ];
        let all: Vec<InputEvent> = events.into_iter().chain(keys).collect();
        let session = Session::from_input_events(&all, 12.0).unwrap();
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();

        // Without the keyboard activity, hold_max (3.0s) would have expired
        // well before t=3.0; with it, the camera is still zoomed in.
        let during_burst = render_params(&timeline, &session, &settings, 3.0);
        assert!(during_burst.scale > 1.0);

        // Protection window extends to last_key.t + keyboard_hold_buffer = 8.0;
        // just before that the camera is still held, and well after it the
        // ease-out has completed.
        let just_before_release = render_params(&timeline, &session, &settings, 7.9);
        assert!(just_before_release.scale > 1.0);

        let well_after_release = render_params(&timeline, &session, &settings, 10.0);
        assert_eq!(well_after_release.scale, 1.0);
    }

    /// S7: small, non-merging nearby clicks during Hold do not move the
    /// camera until the hysteresis policy actually permits an interrupt.
    #[test]
    fn s7_hold_hysteresis_rejects_small_nearby_reclicks_immediately() {
        let events = vec![click(0.20, 0.20, 1.0), click(0.25, 0.22, 1.3), click(0.26, 0.21, 1.5)];
        let session = Session::from_input_events(&events, 6.0).unwrap();
        let settings = Settings::default();
        let timeline = build_timeline(&session, &settings).unwrap();

        let just_after_first = render_params(&timeline, &session, &settings, 1.35);
        let just_after_second = render_params(&timeline, &session, &settings, 1.55);
        let center_shift = just_after_first.center.distance_to(&just_after_second.center);
        assert!(center_shift < 0.05, "camera moved {center_shift} during hold hysteresis window");
    }
}
