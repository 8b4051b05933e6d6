//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the gripper teleop
//! software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions for the gripper exec
pub mod tc;

/// Demand and topic definitions for the gripper equipment
pub mod gripper;

/// Network module
pub mod net;
