//! # Drive Equipment Communications Module
//!
//! The harness supplies a [`Telemetry`] packet alongside every camera frame, and applies the
//! [`DriveDems`] produced by the rover core to its vehicle model.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle telemetry for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Position of the vehicle in the world.
    ///
    /// Units: world units (map cells multiplied by the world scale)
    pub position: [f64; 2],

    /// Heading of the vehicle.
    ///
    /// Units: degrees
    pub yaw_deg: f64,

    /// Scalar ground speed of the vehicle.
    ///
    /// Units: world units/second
    pub vel: f64,

    /// True if the vehicle is close enough to a rock sample to pick it up.
    pub near_sample: bool,

    /// True while the pickup actuator is running.
    pub picking_up: bool,
}

/// Demands to be applied to the vehicle model by the harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveDems {
    /// Throttle demand, always non-negative.
    pub throttle: f64,

    /// Brake demand, always non-negative.
    pub brake: f64,

    /// Steering demand, positive to the left.
    ///
    /// Units: degrees
    pub steer_deg: f64,

    /// One-shot request to run the pickup actuator.
    pub send_pickup: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Telemetry {
    /// Parse a telemetry packet from its JSON representation.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl DriveDems {
    /// Serialise the demands into the JSON representation expected by the harness.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
