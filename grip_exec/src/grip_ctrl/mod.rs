//! # Gripper control module
//!
//! Translates joystick axis input into periodic angle-command messages for
//! the two degree of freedom gripper (wrist and finger) on the selected
//! rover.
//!
//! Each axis integrates its last joystick vector into a bounded angle at a
//! fixed reapply interval while the stick is deflected beyond the center
//! deadzone, publishing the resulting demand on a rover-scoped topic. The
//! rover being commanded can be swapped at runtime, which re-scopes both
//! demand topics and resets both axes.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod endpoint;
mod params;
mod state;
mod timer;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use endpoint::*;
pub use params::*;
pub use state::*;
pub use timer::*;

use comms_if::net::{zmq, MonitoredSocketError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GripCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GripCtrlError {
    #[error("The controller is not ready to accept motion commands")]
    NotReady,

    #[error("Endpoint error: {0}")]
    EndpointError(MonitoredSocketError),

    #[error("Could not serialize the demand: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not publish the demand: {0}")]
    PublishError(zmq::Error),
}
