//! Navigation operating modes

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::NavError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The operating modes of the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Mode {
    /// Drive forward, steering into the open terrain
    Forward,

    /// Brake until the rover has stopped
    Stop,

    /// Turn on the spot until open terrain is found
    RotateLeft,

    /// Drive slowly towards a visible rock sample
    GotoSample,

    /// Hold still while the sample is picked up
    PickupSample,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Forward,
        Mode::Stop,
        Mode::RotateLeft,
        Mode::GotoSample,
        Mode::PickupSample,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Forward => "forward",
            Mode::Stop => "stop",
            Mode::RotateLeft => "rotate_left",
            Mode::GotoSample => "goto_sample",
            Mode::PickupSample => "pickup_sample",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| NavError::InvalidMode(s.to_string()))
    }
}

impl TryFrom<String> for Mode {
    type Error = NavError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
