//! `engine-cli sample` — build a timeline and sample render parameters
//! across the session at a fixed frame rate.

use std::path::PathBuf;

use anyhow::Result;
use grabme_common::error::GrabmeError;
use grabme_project_model::session::Session;
use tracing::info;

use crate::io::{load_events, load_settings};

pub struct Args {
    pub events: PathBuf,
    pub settings: Option<PathBuf>,
    pub duration: f64,
    pub fps: f64,
    pub pretty: bool,
}

pub fn run(args: Args) -> Result<()> {
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive, got {}", args.fps);

    let events = load_events(&args.events)?;
    let settings = load_settings(args.settings.as_deref())?;
    let session = Session::from_input_events(&events, args.duration)
        .map_err(|e| GrabmeError::processing(e.to_string()))?;

    let timeline = grabme_processing_core::build_timeline(&session, &settings)
        .map_err(|e| GrabmeError::processing(e.to_string()))?;

    let frame_count = (args.duration * args.fps).ceil() as u64 + 1;
    info!(frame_count, fps = args.fps, "sampling render parameters");

    let dt = 1.0 / args.fps;
    for frame in 0..frame_count {
        let t = (frame as f64 * dt).min(args.duration);
        let params = grabme_processing_core::render_params(&timeline, &session, &settings, t);

        let record = serde_json::json!({
            "t": t,
            "scale": params.scale,
            "center": { "x": params.center.x, "y": params.center.y },
            "phase": params.phase,
            "highlights": params.highlights,
        });

        if args.pretty {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            println!("{}", serde_json::to_string(&record)?);
        }
    }
    Ok(())
}
