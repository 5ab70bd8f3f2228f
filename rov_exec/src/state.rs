//! # Rover state
//!
//! [`RoverState`] is the single mutable record of the rover, updated once per cycle. It is owned by
//! the control loop and passed by reference to each stage of the pipeline:
//!
//! | Stage                        | Reads                                  | Writes                  |
//! |------------------------------|----------------------------------------|-------------------------|
//! | [`RoverState::set_telemetry`]| -                                      | pose, velocity, flags   |
//! | [`crate::per::PerMgr::step`] | `pos`, `yaw_deg`                       | `nav`, `rock`           |
//! | [`crate::nav::NavCtrl::step`]| `nav`, `rock`, velocity, flags, demands| mode, counter, demands  |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveDems, Telemetry};

use crate::{nav::Mode, per::PolarSet};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RoverState {
    // ---- TELEMETRY ----

    /// Position in the world
    pub pos: [f64; 2],

    /// Heading, in degrees
    pub yaw_deg: f64,

    /// Ground speed
    pub vel: f64,

    /// A sample is within reach
    pub near_sample: bool,

    /// The pickup actuator is running
    pub picking_up: bool,

    // ---- PERCEPTION ----

    /// Polar set of the navigable terrain, `None` until the first frame has been processed
    pub nav: Option<PolarSet>,

    /// Polar set of visible rock samples, `None` until the first frame has been processed
    pub rock: Option<PolarSet>,

    // ---- NAVIGATION ----

    /// Current navigation mode
    pub mode: Mode,

    /// Consecutive cycles where throttle was demanded but the rover didn't move
    pub stuck_counter: u32,

    pub throttle: f64,
    pub brake: f64,
    pub steer_deg: f64,

    /// Request the pickup actuator to run
    pub send_pickup: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoverState {
    pub fn new(mode: Mode) -> Self {
        Self {
            pos: [0.0; 2],
            yaw_deg: 0.0,
            vel: 0.0,
            near_sample: false,
            picking_up: false,
            nav: None,
            rock: None,
            mode,
            stuck_counter: 0,
            throttle: 0.0,
            brake: 0.0,
            steer_deg: 0.0,
            send_pickup: false,
        }
    }

    /// Copy the telemetry for this cycle into the state.
    pub fn set_telemetry(&mut self, telem: &Telemetry) {
        self.pos = telem.position;
        self.yaw_deg = telem.yaw_deg;
        self.vel = telem.vel;
        self.near_sample = telem.near_sample;
        self.picking_up = telem.picking_up;
    }

    /// The demands to be applied to the vehicle this cycle.
    pub fn drive_dems(&self) -> DriveDems {
        DriveDems {
            throttle: self.throttle,
            brake: self.brake,
            steer_deg: self.steer_deg,
            send_pickup: self.send_pickup,
        }
    }
}
