//! # Telecommand module
//!
//! This module provides the telecommand types accepted by the gripper exec,
//! and the responses it acknowledges them with.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::gripper::GripperAxis;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the gripper exec by the
/// operator station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum GripperTc {
    /// A new joystick sample for a single gripper axis.
    ///
    /// The vector represents the desired movement speed and direction. For
    /// the wrist a positive raw value moves the wrist down.
    AxisInput { axis: GripperAxis, vector: f64 },

    /// Switch all gripper command output to the named rover.
    SelectRover { rover_name: String },
}

/// Response to a telecommand.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum TcResponse {
    /// The TC was valid and has been executed
    Ok,

    /// The TC could not be parsed and has been rejected
    Invalid,

    /// The TC was valid but cannot be executed right now. The sender may
    /// retry once the exec is ready again.
    CannotExecute,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GripperTc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialize the TC into a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_axis_input() {
        let tc =
            GripperTc::from_json(r#"{"AxisInput": {"axis": "Wrist", "vector": -1.0}}"#).unwrap();

        assert_eq!(
            tc,
            GripperTc::AxisInput {
                axis: GripperAxis::Wrist,
                vector: -1.0
            }
        );
    }

    #[test]
    fn test_parse_select_rover() {
        let tc = GripperTc::from_json(r#"{"SelectRover": {"rover_name": "rover2"}}"#).unwrap();

        assert_eq!(
            tc,
            GripperTc::SelectRover {
                rover_name: String::from("rover2")
            }
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = GripperTc::from_json("not a tc");

        assert!(matches!(result, Err(TcParseError::InvalidJson(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let tc = GripperTc::AxisInput {
            axis: GripperAxis::Finger,
            vector: 0.25,
        };

        let parsed = GripperTc::from_json(&tc.to_json().unwrap()).unwrap();

        assert_eq!(parsed, tc);
    }
}
