//! # Gripper Equipment Messages
//!
//! This module defines the angle demand messages sent to the gripper on the
//! selected rover, and the rover-scoped topics they are published under.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An angle demand for a single gripper axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GripperDem {
    /// The demanded angle of the axis.
    ///
    /// Units: radians
    pub angle_rad: f32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Axes of the two degree of freedom gripper.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum GripperAxis {
    Wrist,
    Finger,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GripperAxis {
    /// Name of this axis's demand topic, without the rover scope.
    pub fn topic_name(&self) -> &'static str {
        match self {
            GripperAxis::Wrist => "wristAngle",
            GripperAxis::Finger => "fingerAngle",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the rover-scoped demand topic for the given axis.
///
/// Demands are published as `"<topic> <json>"` messages, with subscribers
/// filtering on the topic prefix using `.set_subscribe()`.
pub fn dem_topic(rover_name: &str, axis: GripperAxis) -> String {
    format!("{}/{}", rover_name, axis.topic_name())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dem_topic() {
        assert_eq!(dem_topic("rover1", GripperAxis::Wrist), "rover1/wristAngle");
        assert_eq!(
            dem_topic("rover1", GripperAxis::Finger),
            "rover1/fingerAngle"
        );
        assert_eq!(dem_topic("rover2", GripperAxis::Wrist), "rover2/wristAngle");
    }
}
