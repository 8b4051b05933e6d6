//! Parameters structure for GripCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for gripper control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- WRIST ----

    /// Minimum wrist angle (lowest value), taken from the physical rover.
    ///
    /// Units: radians
    pub wrist_angle_min_rad: f64,

    /// Maximum wrist angle (highest value), taken from the physical rover.
    ///
    /// Units: radians
    pub wrist_angle_max_rad: f64,

    /// The fraction of the joystick vector by which the wrist angle changes
    /// each reapply tick. Tuned in accordance with operator feedback.
    pub wrist_angle_change_rate: f64,

    // ---- FINGER ----

    /// Minimum finger angle (lowest value), taken from the physical rover.
    ///
    /// Units: radians
    pub finger_angle_min_rad: f64,

    /// Maximum finger angle (highest value), taken from the physical rover.
    ///
    /// Units: radians
    pub finger_angle_max_rad: f64,

    /// The fraction of the joystick vector by which the finger angle changes
    /// each reapply tick. Tuned in accordance with operator feedback.
    pub finger_angle_change_rate: f64,

    // ---- SHARED ----

    /// Period at which the current joystick vector is reintegrated and the
    /// resulting angle demand republished.
    ///
    /// Units: milliseconds
    pub command_reapply_interval_ms: u64,

    /// How close to zero output from the joystick has to be for us to
    /// consider the operator to have centered the stick.
    pub stick_center_tolerance: f64,

    /// Angles closer to zero than this are coerced to exactly zero before
    /// publishing.
    ///
    /// Units: radians
    pub angle_snap_epsilon_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Default parameters match the tuned values for the physical rover, so
    /// that the controller is usable without a parameter file.
    fn default() -> Self {
        Self {
            wrist_angle_min_rad: 0.0,
            wrist_angle_max_rad: 1.0,
            wrist_angle_change_rate: 0.1,
            finger_angle_min_rad: 0.0,
            finger_angle_max_rad: 2.0,
            finger_angle_change_rate: 0.1,
            command_reapply_interval_ms: 100,
            stick_center_tolerance: 0.05,
            angle_snap_epsilon_rad: 0.001,
        }
    }
}
