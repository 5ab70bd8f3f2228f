//! Parameters structure for navigation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Mode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the navigation state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavParams {

    // ---- THRESHOLDS ----

    /// Forward stops when either side has fewer navigable pixels than this.
    pub stop_forward: usize,

    /// Rotation ends when both sides have more than half this many navigable
    /// pixels.
    pub go_forward: usize,

    /// Number of rock pixels needed to start approaching a sample.
    pub go_to_sample: usize,

    /// The sample is considered lost at or below this many rock pixels.
    pub lost_sample: usize,

    // ---- DEMANDS ----

    /// Throttle demand while driving forward.
    pub throttle_set: f64,

    /// Brake demand when stopping.
    pub brake_set: f64,

    /// Maximum velocity, above which no throttle is applied.
    ///
    /// Units: world units/second
    pub max_vel: f64,

    /// Throttle while approaching a sample is `throttle_set` divided by this.
    pub sample_throttle_div: f64,

    // ---- STEERING ----

    /// Limit of the steer demand in both directions.
    ///
    /// Units: degrees
    pub max_steer_deg: f64,

    /// Steer demand while rotating on the spot.
    ///
    /// Units: degrees
    pub rotate_steer_deg: f64,

    /// Rightward bias applied to the forward steer when there is plenty of
    /// room on the right, keeping the rover hugging the left wall.
    ///
    /// Units: degrees
    pub right_bias_deg: f64,

    /// Weight of the rock heading in the approach steer, with the remainder
    /// given to the navigable terrain heading.
    pub sample_steer_weight: f64,

    // ---- STOP DETECTION ----

    /// Number of cycles the rover may be stuck before it stops.
    pub stuck_limit: u32,

    /// The rover is considered stuck while throttle is demanded and its
    /// velocity is below this.
    ///
    /// Units: world units/second
    pub stuck_vel_threshold: f64,

    /// The rover is considered stopped below this velocity.
    ///
    /// Units: world units/second
    pub stopped_vel_threshold: f64,

    // ---- INITIALISATION ----

    /// Mode the state machine starts in.
    pub initial_mode: Mode,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            stop_forward: 50,
            go_forward: 500,
            go_to_sample: 10,
            lost_sample: 2,
            throttle_set: 0.2,
            brake_set: 10.0,
            max_vel: 2.0,
            sample_throttle_div: 4.0,
            max_steer_deg: 15.0,
            rotate_steer_deg: 15.0,
            right_bias_deg: 3.0,
            sample_steer_weight: 0.65,
            stuck_limit: 100,
            stuck_vel_threshold: 0.1,
            stopped_vel_threshold: 0.2,
            initial_mode: Mode::Forward,
        }
    }
}
