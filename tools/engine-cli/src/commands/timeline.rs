//! `engine-cli timeline` — build and dump a zoom timeline for a session.

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
    pub pretty: bool,
}

pub fn run(args: Args) -> Result<()> {
    let events = load_events(&args.events)?;
    let settings = load_settings(args.settings.as_deref())?;
    let session = Session::from_input_events(&events, args.duration)
        .map_err(|e| GrabmeError::processing(e.to_string()))?;

    info!(events = events.len(), duration = args.duration, "loaded session");

    let timeline = grabme_processing_core::build_timeline(&session, &settings)
        .map_err(|e| GrabmeError::processing(e.to_string()))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&timeline)?
    } else {
        serde_json::to_string(&timeline)?
    };
    println!("{json}");
    Ok(())
}
