//! Main rover-side executable entry point.
//!
//! Runs a single cycle of the rover pipeline over one camera frame, which is useful for checking a
//! calibration or threshold change against recorded frames.
//!
//! The telemetry for the frame is given either with the individual flags or as a JSON string with
//! `--telem`, in which case the flags are ignored. The resulting demands are logged as JSON, and
//! the vision and world map images are written into the session directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use comms_if::eqpt::drive::Telemetry;
use rov_lib::{nav::NavStatus, params::RoverParams, rover::Rover};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Run the rover perception and navigation pipeline on a single frame.
#[derive(Debug, StructOpt)]
#[structopt(name = "rov_exec")]
struct Opt {
    /// Path to the camera frame
    #[structopt(parse(from_os_str))]
    frame: PathBuf,

    /// Rover x position in world units
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    x: f64,

    /// Rover y position in world units
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    y: f64,

    /// Rover yaw in degrees
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    yaw: f64,

    /// Rover velocity
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    vel: f64,

    /// A sample is within reach
    #[structopt(long)]
    near_sample: bool,

    /// A pickup is already in progress
    #[structopt(long)]
    picking_up: bool,

    /// Telemetry as a JSON object, overrides the other telemetry flags
    #[structopt(long)]
    telem: Option<String>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rov_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Rover Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params = RoverParams::load().wrap_err("Could not load rover params")?;
    info!("Rover parameters loaded");

    // ---- INITIALISE ROVER ----

    let mut rover = Rover::new(params).wrap_err("Failed to initialise the rover")?;

    let telem = match opt.telem {
        Some(ref json) => Telemetry::from_json(json).wrap_err("Could not parse the telemetry")?,
        None => Telemetry {
            position: [opt.x, opt.y],
            yaw_deg: opt.yaw,
            vel: opt.vel,
            near_sample: opt.near_sample,
            picking_up: opt.picking_up,
        },
    };

    let frame = image::open(&opt.frame)
        .wrap_err_with(|| format!("Could not open the frame {:?}", opt.frame))?
        .to_rgb8();

    // ---- RUN CYCLE ----

    let out = rover
        .cycle(&frame, &telem)
        .wrap_err("Failed to process the frame")?;

    match out.nav_status {
        NavStatus::NotReady => warn!("Navigation was not ready"),
        NavStatus::Stepped(report) => {
            if let Some((from, to)) = report.transition {
                info!("Mode changed from {} to {}", from, to);
            }
            if report.steer_held {
                warn!("Steer demand was held, no angles were available");
            }
        }
    }

    info!("Mode: {}", rover.state.mode);
    info!(
        "Demands: {}",
        out.dems.to_json().wrap_err("Could not serialise the demands")?
    );

    // ---- SAVE OUTPUTS ----

    let vision_path = session.session_root.join("vision.png");
    rover
        .vision_image()
        .save(&vision_path)
        .wrap_err("Could not save the vision image")?;

    let map_path = session.session_root.join("world_map.png");
    rover
        .world_map_image()
        .save(&map_path)
        .wrap_err("Could not save the world map image")?;

    info!(
        "Saved images to {:?}, map {:.2}% observed",
        session.session_root,
        rover.world_map().mapped_fraction() * 100.0
    );

    Ok(())
}
