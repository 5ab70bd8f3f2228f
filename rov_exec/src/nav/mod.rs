//! # Navigation module
//!
//! This module implements the navigation state machine, which turns the polar sets produced by
//! perception into throttle, brake, and steer demands. The machine has five modes:
//!
//! - `Forward` - Drive forward, steering into the open terrain.
//! - `Stop` - Brake until stationary, entered when the way ahead is blocked or the rover is stuck.
//! - `RotateLeft` - Turn on the spot until there is open terrain on both sides.
//! - `GotoSample` - Approach a visible rock sample.
//! - `PickupSample` - Hold still next to a sample and request that it is picked up.
//!
//! Each cycle the stuck counter is updated first, then the exit conditions of the current mode are
//! checked, and finally the demands of the (possibly new) mode are calculated.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod mode;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use mode::Mode;
pub use params::NavParams;

use log::{debug, trace, warn};
use serde::Serialize;
use util::maths::clamp;

use crate::{per::PolarSet, state::RoverState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation controller.
#[derive(Debug, Clone, Default)]
pub struct NavCtrl {
    pub params: NavParams,
}

/// The quantities the mode transitions are decided on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NavInputs {
    /// Number of navigable pixels left of the rover's forward axis
    pub num_nav_left: usize,

    /// Number of navigable pixels right of the rover's forward axis
    pub num_nav_right: usize,

    /// Number of rock sample pixels
    pub num_rock: usize,

    /// Current velocity of the rover
    pub vel: f64,

    /// Telemetry flag set when a sample is in reach
    pub near_sample: bool,

    /// Number of consecutive cycles the rover has been stuck
    pub stuck_counter: u32,
}

/// Status report for a navigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// The inputs the cycle's transition was decided on
    pub inputs: NavInputs,

    /// Mode before and after the cycle, if it changed
    pub transition: Option<(Mode, Mode)>,

    /// True if an angle set was empty and the previous steer demand was held
    pub steer_held: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in navigation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavError {
    #[error("Invalid navigation mode \"{0}\"")]
    InvalidMode(String),

    #[error("Cannot take the mean of the empty {0} angle set")]
    DegenerateAngleSet(&'static str),
}

/// Outcome of a navigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NavStatus {
    /// No perception data is available yet, the rover state was not modified
    NotReady,

    /// The cycle ran
    Stepped(StatusReport),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavCtrl {
    pub fn new(params: NavParams) -> Self {
        Self { params }
    }

    /// Run one cycle of the state machine.
    ///
    /// Reads the perception polar sets and telemetry in `state`, and writes the mode, stuck
    /// counter, and throttle, brake, steer, and pickup demands.
    pub fn step(&self, state: &mut RoverState) -> NavStatus {
        let nav = match state.nav {
            Some(ref n) => n,
            None => return NavStatus::NotReady,
        };

        let num_rock = state.rock.as_ref().map_or(0, PolarSet::len);

        let nav_steer = mean_angle_deg(Some(nav), "navigable");
        let rock_steer = mean_angle_deg(state.rock.as_ref(), "rock");

        let mut inputs = NavInputs {
            num_nav_left: nav.num_left(),
            num_nav_right: nav.num_right(),
            num_rock,
            vel: state.vel,
            near_sample: state.near_sample,
            stuck_counter: state.stuck_counter,
        };

        // The pickup request only lives for the cycle it is made in
        state.send_pickup = false;

        // ---- STUCK DETECTION ----

        if state.throttle > 0.0 && state.vel < self.params.stuck_vel_threshold {
            state.stuck_counter += 1;
        } else {
            state.stuck_counter = 0;
        }
        inputs.stuck_counter = state.stuck_counter;

        // ---- TRANSITIONS ----

        let prev_mode = state.mode;
        state.mode = next_mode(&self.params, prev_mode, &inputs);

        let transition = if state.mode != prev_mode {
            debug!("Navigation mode {} -> {}", prev_mode, state.mode);
            Some((prev_mode, state.mode))
        } else {
            None
        };

        // ---- ACTIONS ----

        let params = &self.params;
        let mut steer_held = false;

        match state.mode {
            Mode::Forward => {
                state.throttle = if state.vel < params.max_vel {
                    params.throttle_set
                } else {
                    0.0
                };
                state.brake = 0.0;

                state.steer_deg = match nav_steer {
                    Ok(mut steer) => {
                        if inputs.num_nav_right > params.stop_forward * 2 {
                            steer -= params.right_bias_deg;
                        }
                        steer
                    }
                    Err(e) => {
                        warn!("{}, holding steer", e);
                        steer_held = true;
                        state.steer_deg
                    }
                };
            }
            Mode::Stop => {
                state.throttle = 0.0;
                state.brake = params.brake_set;
                state.steer_deg = 0.0;
            }
            Mode::RotateLeft => {
                state.throttle = 0.0;
                state.brake = 0.0;
                state.steer_deg = params.rotate_steer_deg;
            }
            Mode::GotoSample => {
                if state.vel > params.max_vel / 2.0 {
                    state.throttle = 0.0;
                    state.brake = params.brake_set;
                } else {
                    state.throttle = params.throttle_set / params.sample_throttle_div;
                    state.brake = 0.0;
                }

                let w = params.sample_steer_weight;
                state.steer_deg = match (rock_steer, nav_steer) {
                    (Ok(rock), Ok(nav)) => w * rock + (1.0 - w) * nav,
                    (Ok(rock), Err(e)) => {
                        warn!("{}, steering on the sample only", e);
                        rock
                    }
                    (Err(e), Ok(nav)) => {
                        warn!("{}, steering on the terrain only", e);
                        nav
                    }
                    (Err(e), Err(_)) => {
                        warn!("{}, holding steer", e);
                        steer_held = true;
                        state.steer_deg
                    }
                };
            }
            Mode::PickupSample => {
                state.throttle = 0.0;
                state.brake = params.brake_set;
                state.steer_deg = 0.0;

                if state.near_sample && state.vel == 0.0 && !state.picking_up {
                    state.send_pickup = true;
                }
            }
        }

        state.steer_deg = clamp(
            &state.steer_deg,
            &-params.max_steer_deg,
            &params.max_steer_deg,
        );

        trace!(
            "Navigation {}: throttle {:.3}, brake {:.3}, steer {:.3} deg",
            state.mode,
            state.throttle,
            state.brake,
            state.steer_deg
        );

        NavStatus::Stepped(StatusReport {
            inputs,
            transition,
            steer_held,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decide the mode for this cycle given the current mode and the cycle's inputs.
///
/// The stuck counter in `inputs` must already have been updated for this cycle.
pub fn next_mode(params: &NavParams, mode: Mode, inputs: &NavInputs) -> Mode {
    let half_go_forward = params.go_forward as f64 / 2.0;

    match mode {
        Mode::Forward => {
            if inputs.num_nav_left < params.stop_forward
                || inputs.num_nav_right < params.stop_forward
                || inputs.stuck_counter > params.stuck_limit
            {
                Mode::Stop
            } else if inputs.num_rock >= params.go_to_sample {
                Mode::GotoSample
            } else {
                Mode::Forward
            }
        }
        Mode::Stop => {
            if inputs.vel < params.stopped_vel_threshold {
                Mode::RotateLeft
            } else {
                Mode::Stop
            }
        }
        Mode::RotateLeft => {
            if inputs.num_rock >= params.go_to_sample {
                Mode::GotoSample
            } else if inputs.num_nav_left as f64 > half_go_forward
                && inputs.num_nav_right as f64 > half_go_forward
            {
                Mode::Forward
            } else {
                Mode::RotateLeft
            }
        }
        Mode::GotoSample => {
            if inputs.near_sample {
                Mode::PickupSample
            } else if inputs.num_rock <= params.lost_sample {
                Mode::Forward
            } else {
                Mode::GotoSample
            }
        }
        Mode::PickupSample => {
            if !inputs.near_sample {
                Mode::Forward
            } else {
                Mode::PickupSample
            }
        }
    }
}

/// Mean angle of a polar set in degrees.
pub fn mean_angle_deg(set: Option<&PolarSet>, name: &'static str) -> Result<f64, NavError> {
    set.and_then(PolarSet::mean_angle_deg)
        .ok_or(NavError::DegenerateAngleSet(name))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array1;

    /// Build a polar set with the given number of points at each angle (degrees).
    fn polar(groups: &[(usize, f64)]) -> PolarSet {
        let angles: Vec<f64> = groups
            .iter()
            .flat_map(|(n, a)| std::iter::repeat(a.to_radians()).take(*n))
            .collect();

        PolarSet {
            dists: Array1::from_elem(angles.len(), 10.0),
            angles: Array1::from(angles),
        }
    }

    fn state(mode: Mode, nav: PolarSet, rock: PolarSet) -> RoverState {
        let mut state = RoverState::new(mode);
        state.nav = Some(nav);
        state.rock = Some(rock);
        state
    }

    fn stepped(status: NavStatus) -> StatusReport {
        match status {
            NavStatus::Stepped(r) => r,
            NavStatus::NotReady => panic!("Expected navigation to step"),
        }
    }

    fn inputs(left: usize, right: usize, rock: usize) -> NavInputs {
        NavInputs {
            num_nav_left: left,
            num_nav_right: right,
            num_rock: rock,
            vel: 1.0,
            near_sample: false,
            stuck_counter: 0,
        }
    }

    #[test]
    fn test_not_ready() {
        let nav = NavCtrl::default();
        let mut state = RoverState::new(Mode::Forward);
        state.throttle = 0.5;

        assert_eq!(nav.step(&mut state), NavStatus::NotReady);
        assert_eq!(state.throttle, 0.5);
        assert_eq!(state.stuck_counter, 0);
        assert_eq!(state.mode, Mode::Forward);
    }

    #[test]
    fn test_forward_holds() {
        let nav = NavCtrl::new(NavParams {
            stop_forward: 10,
            ..Default::default()
        });
        let mut state = state(
            Mode::Forward,
            polar(&[(50, 5.0), (50, -5.0)]),
            PolarSet::default(),
        );
        state.vel = 1.0;

        let report = stepped(nav.step(&mut state));

        assert_eq!(state.mode, Mode::Forward);
        assert_eq!(report.transition, None);
        assert_eq!(state.brake, 0.0);
        assert_eq!(state.throttle, 0.2);
        // Mean is zero, with the bias for plenty of space on the right
        assert!((state.steer_deg + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_at_max_vel_coasts() {
        let nav = NavCtrl::new(NavParams {
            stop_forward: 10,
            ..Default::default()
        });
        let mut state = state(Mode::Forward, polar(&[(15, 8.0), (15, -2.0)]), PolarSet::default());
        state.vel = 2.0;

        nav.step(&mut state);

        assert_eq!(state.mode, Mode::Forward);
        assert_eq!(state.throttle, 0.0);
        // Not enough space on the right for the bias
        assert!((state.steer_deg - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_to_stop() {
        let nav = NavCtrl::new(NavParams {
            stop_forward: 10,
            ..Default::default()
        });
        let mut state = state(
            Mode::Forward,
            polar(&[(50, 5.0), (3, -5.0)]),
            PolarSet::default(),
        );
        state.vel = 1.0;
        state.steer_deg = 7.0;

        let report = stepped(nav.step(&mut state));

        assert_eq!(state.mode, Mode::Stop);
        assert_eq!(report.transition, Some((Mode::Forward, Mode::Stop)));
        assert_eq!(state.throttle, 0.0);
        assert_eq!(state.brake, 10.0);
        assert_eq!(state.steer_deg, 0.0);
    }

    #[test]
    fn test_stuck_detection() {
        let nav = NavCtrl::new(NavParams {
            stop_forward: 10,
            ..Default::default()
        });
        let mut state = state(
            Mode::Forward,
            polar(&[(50, 5.0), (50, -5.0)]),
            PolarSet::default(),
        );
        state.vel = 0.0;
        state.throttle = 0.2;

        // Counter climbs every cycle throttle is demanded without motion
        for i in 1..=100 {
            nav.step(&mut state);
            assert_eq!(state.stuck_counter, i);
            assert_eq!(state.mode, Mode::Forward);
        }

        // Past the limit the rover stops
        nav.step(&mut state);
        assert_eq!(state.stuck_counter, 101);
        assert_eq!(state.mode, Mode::Stop);
        assert_eq!(state.throttle, 0.0);

        // With no throttle demanded the counter resets
        nav.step(&mut state);
        assert_eq!(state.stuck_counter, 0);
    }

    #[test]
    fn test_stuck_counter_resets_on_motion() {
        let nav = NavCtrl::default();
        let mut state = state(
            Mode::Forward,
            polar(&[(100, 5.0), (100, -5.0)]),
            PolarSet::default(),
        );
        state.throttle = 0.2;
        state.vel = 0.05;

        nav.step(&mut state);
        nav.step(&mut state);
        assert_eq!(state.stuck_counter, 2);

        state.vel = 0.1;
        nav.step(&mut state);
        assert_eq!(state.stuck_counter, 0);
    }

    #[test]
    fn test_goto_sample_to_pickup() {
        let nav = NavCtrl::default();
        let mut state = state(
            Mode::GotoSample,
            polar(&[(100, 5.0)]),
            polar(&[(20, -10.0)]),
        );
        state.near_sample = true;
        state.vel = 0.5;

        let report = stepped(nav.step(&mut state));

        assert_eq!(report.transition, Some((Mode::GotoSample, Mode::PickupSample)));
        assert_eq!(state.throttle, 0.0);
        assert_eq!(state.brake, 10.0);
        assert_eq!(state.steer_deg, 0.0);
        // Still moving, so no pickup yet
        assert!(!state.send_pickup);
    }

    #[test]
    fn test_pickup_request() {
        let nav = NavCtrl::default();
        let mut state = state(Mode::PickupSample, polar(&[(100, 5.0)]), polar(&[(20, 0.0)]));
        state.near_sample = true;
        state.vel = 0.0;
        state.picking_up = false;

        nav.step(&mut state);
        assert_eq!(state.mode, Mode::PickupSample);
        assert!(state.send_pickup);

        // Once the pickup is underway the request is not repeated
        state.picking_up = true;
        nav.step(&mut state);
        assert!(!state.send_pickup);

        // Sample collected, carry on exploring
        state.near_sample = false;
        state.picking_up = false;
        nav.step(&mut state);
        assert_eq!(state.mode, Mode::Forward);
        assert!(!state.send_pickup);
    }

    #[test]
    fn test_goto_sample_steer_blend() {
        let nav = NavCtrl::default();
        let mut state = state(
            Mode::GotoSample,
            polar(&[(100, 10.0)]),
            polar(&[(20, -10.0)]),
        );
        state.vel = 0.5;

        nav.step(&mut state);

        assert_eq!(state.mode, Mode::GotoSample);
        assert_eq!(state.throttle, 0.05);
        assert_eq!(state.brake, 0.0);
        assert!((state.steer_deg - (-6.5 + 3.5)).abs() < 1e-9);

        // Too fast, brake
        state.vel = 1.5;
        nav.step(&mut state);
        assert_eq!(state.throttle, 0.0);
        assert_eq!(state.brake, 10.0);
    }

    #[test]
    fn test_goto_sample_no_terrain() {
        let nav = NavCtrl::default();
        let mut state = state(Mode::GotoSample, PolarSet::default(), polar(&[(20, 12.0)]));

        let report = stepped(nav.step(&mut state));

        assert_eq!(state.mode, Mode::GotoSample);
        assert!(!report.steer_held);
        assert!((state.steer_deg - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_forward_holds_steer() {
        let nav = NavCtrl::new(NavParams {
            stop_forward: 0,
            ..Default::default()
        });
        let mut state = state(Mode::Forward, PolarSet::default(), PolarSet::default());
        state.steer_deg = 4.0;

        let report = stepped(nav.step(&mut state));

        assert_eq!(state.mode, Mode::Forward);
        assert!(report.steer_held);
        assert_eq!(state.steer_deg, 4.0);
    }

    #[test]
    fn test_steer_limits() {
        let nav = NavCtrl::default();

        for &angle in [-89.0, -30.0, -15.0, 0.0, 14.0, 16.0, 89.0].iter() {
            for mode in Mode::ALL.iter() {
                let mut state = state(
                    *mode,
                    polar(&[(400, angle), (400, -angle / 2.0)]),
                    polar(&[(30, angle)]),
                );
                state.near_sample = true;

                nav.step(&mut state);

                assert!(
                    state.steer_deg >= -15.0 && state.steer_deg <= 15.0,
                    "Steer {} out of range in {} for angle {}",
                    state.steer_deg,
                    state.mode,
                    angle
                );
            }
        }
    }

    #[test]
    fn test_transition_table() {
        let p = NavParams {
            stop_forward: 10,
            go_forward: 100,
            go_to_sample: 5,
            lost_sample: 1,
            ..Default::default()
        };

        let open = inputs(60, 60, 0);

        // Forward
        assert_eq!(next_mode(&p, Mode::Forward, &open), Mode::Forward);
        assert_eq!(next_mode(&p, Mode::Forward, &inputs(9, 60, 0)), Mode::Stop);
        assert_eq!(next_mode(&p, Mode::Forward, &inputs(60, 9, 0)), Mode::Stop);
        assert_eq!(
            next_mode(&p, Mode::Forward, &NavInputs { stuck_counter: 101, ..open }),
            Mode::Stop
        );
        assert_eq!(
            next_mode(&p, Mode::Forward, &NavInputs { stuck_counter: 100, ..open }),
            Mode::Forward
        );
        assert_eq!(next_mode(&p, Mode::Forward, &inputs(60, 60, 5)), Mode::GotoSample);
        // Blocked takes priority over a sample
        assert_eq!(next_mode(&p, Mode::Forward, &inputs(9, 60, 5)), Mode::Stop);

        // Stop
        assert_eq!(next_mode(&p, Mode::Stop, &NavInputs { vel: 0.19, ..open }), Mode::RotateLeft);
        assert_eq!(next_mode(&p, Mode::Stop, &NavInputs { vel: 0.2, ..open }), Mode::Stop);

        // RotateLeft
        assert_eq!(next_mode(&p, Mode::RotateLeft, &inputs(0, 0, 5)), Mode::GotoSample);
        assert_eq!(next_mode(&p, Mode::RotateLeft, &inputs(51, 51, 0)), Mode::Forward);
        assert_eq!(next_mode(&p, Mode::RotateLeft, &inputs(50, 51, 0)), Mode::RotateLeft);
        assert_eq!(next_mode(&p, Mode::RotateLeft, &inputs(51, 50, 4)), Mode::RotateLeft);

        // GotoSample
        assert_eq!(
            next_mode(&p, Mode::GotoSample, &NavInputs { near_sample: true, ..open }),
            Mode::PickupSample
        );
        assert_eq!(next_mode(&p, Mode::GotoSample, &inputs(60, 60, 1)), Mode::Forward);
        assert_eq!(next_mode(&p, Mode::GotoSample, &inputs(60, 60, 2)), Mode::GotoSample);

        // PickupSample
        assert_eq!(next_mode(&p, Mode::PickupSample, &open), Mode::Forward);
        assert_eq!(
            next_mode(&p, Mode::PickupSample, &NavInputs { near_sample: true, ..open }),
            Mode::PickupSample
        );
    }

    #[test]
    fn test_transitions_deterministic() {
        let p = NavParams::default();
        let cases = [
            inputs(0, 0, 0),
            inputs(600, 600, 0),
            inputs(600, 600, 50),
            NavInputs { near_sample: true, vel: 0.0, ..inputs(600, 0, 50) },
            NavInputs { stuck_counter: 500, ..inputs(600, 600, 0) },
        ];

        for mode in Mode::ALL.iter() {
            for case in cases.iter() {
                assert_eq!(next_mode(&p, *mode, case), next_mode(&p, *mode, case));
            }
        }
    }
}
