//! Main gripper teleop executable entry point.
//!
//! # Architecture
//!
//! The exec runs a fixed period main loop:
//!
//!     - Telecommand processing: drain pending joystick samples and rover
//!       selections from the operator station, apply each to the controller
//!       and acknowledge it.
//!     - Gripper control processing: drive the per-axis reapply timers,
//!       publishing angle demands for any axis whose timer is due.
//!     - Cycle management: sleep out the cycle remainder.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use grip_lib::{
    grip_ctrl::{GripCtrl, GripCtrlError, Params},
    tc_client::{TcClient, TcClientError},
    CYCLE_PERIOD_S,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::{
    net::NetParams,
    tc::{GripperTc, TcResponse},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("grip_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Gripper Teleop Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE ROVER TARGET ----

    // The rover to command at startup is given as the single CLI argument.
    // Later rover changes arrive as TCs.
    let args: Vec<String> = env::args().collect();

    let rover_name = match args.len() {
        2 => args[1].clone(),
        n => {
            return Err(eyre!(
                "Expected the target rover name as the only argument, found {} arguments",
                n - 1
            ))
        }
    };

    info!("Commanding the gripper on \"{}\"\n", rover_name);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let grip_params: Params =
        util::params::load("grip_ctrl.toml").wrap_err("Could not load grip_ctrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let tc_client =
        TcClient::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise the TcClient")?;
    info!("TcClient initialised");

    let mut grip_ctrl = GripCtrl::new(&zmq_ctx, &net_params, grip_params, &rover_name)
        .wrap_err("Failed to initialise GripCtrl")?;
    info!("GripCtrl initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut station_was_connected = false;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- TELECOMMAND PROCESSING ----

        // Log connection changes to the operator station. Losing the station
        // is not an error - the gripper holds its last commanded angles.
        if tc_client.is_connected() != station_was_connected {
            match tc_client.is_connected() {
                true => info!("Connected to the operator station"),
                false => warn!("Connection to the operator station lost"),
            }
            station_was_connected = tc_client.is_connected();
        }

        // Get commands until none remain
        loop {
            match tc_client.receive_tc() {
                Ok(Some(tc)) => {
                    let response = exec_tc(&mut grip_ctrl, &tc, cycle_start_instant);

                    if let Err(e) = tc_client.send_response(response) {
                        warn!("Could not respond to TC: {}", e);
                    }
                }
                Ok(None) => break,
                Err(TcClientError::NotConnected) => break,
                Err(TcClientError::ParseError(e)) => {
                    warn!("Could not parse received TC: {}", e);
                    break;
                }
                Err(e) => {
                    return Err(e).wrap_err("An error occured while receiving TCs");
                }
            }
        }

        // ---- GRIPPER CONTROL PROCESSING ----

        grip_ctrl.cycle(cycle_start_instant);

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }
}

/// Apply a single TC to the controller, mapping the result onto the wire
/// response.
fn exec_tc(grip_ctrl: &mut GripCtrl, tc: &GripperTc, now: Instant) -> TcResponse {
    let result = match tc {
        GripperTc::AxisInput { axis, vector } => {
            debug!("New {:?} axis input: {}", axis, vector);
            grip_ctrl.set_axis_input(*axis, *vector, now)
        }
        GripperTc::SelectRover { rover_name } => {
            info!("Rover change requested: \"{}\"", rover_name);
            grip_ctrl.change_rover(rover_name)
        }
    };

    match result {
        Ok(()) => TcResponse::Ok,
        // Not ready is transient - the station may retry once the controller
        // comes back up
        Err(GripCtrlError::NotReady) => TcResponse::CannotExecute,
        Err(e) => {
            warn!("Could not execute TC: {}", e);
            TcResponse::CannotExecute
        }
    }
}
