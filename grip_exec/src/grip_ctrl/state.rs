//! Implementations for the GripCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::time::{Duration, Instant};

// Internal
use super::{AngleEndpoint, GripCtrlError, Params, ReapplyTimer};
use comms_if::{
    gripper::{dem_topic, GripperAxis, GripperDem},
    net::{zmq, NetParams},
};
use util::maths::{clamp, snap_to_zero};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of a single gripper axis.
struct AxisState {
    /// Current commanded angle, always within `[min_rad, max_rad]`.
    ///
    /// Units: radians
    angle_rad: f64,

    /// Desired movement speed and direction generated by the joystick
    joy_vector: f64,

    /// The fraction of the joystick vector by which the angle changes per
    /// reapply tick
    change_rate: f64,

    /// Lowest commandable angle, taken from the physical rover.
    ///
    /// Units: radians
    min_rad: f64,

    /// Highest commandable angle, taken from the physical rover.
    ///
    /// Units: radians
    max_rad: f64,

    /// Reapply timer gating this axis's command output
    timer: ReapplyTimer,

    /// Publish endpoint for this axis's demands. `None` only during
    /// construction and after a failed rover change.
    endpoint: Option<AngleEndpoint>,
}

/// Gripper control state
///
/// The controller owns its timers and endpoints exclusively and is not
/// clonable - command output for a rover must come from exactly one place.
pub struct GripCtrl {
    params: Params,

    /// Guards all motion command entry points. Only true when both axis
    /// endpoints are live.
    ready: bool,

    /// Name of the rover currently being commanded
    rover_name: String,

    wrist: AxisState,
    finger: AxisState,

    /// Handle to the zmq context, kept so endpoints can be recreated on a
    /// rover change.
    ctx: zmq::Context,

    /// Demand bus endpoint which the angle endpoints connect to
    bus_endpoint: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisState {
    fn new(min_rad: f64, max_rad: f64, change_rate: f64, reapply_interval: Duration) -> Self {
        Self {
            angle_rad: 0.0,
            joy_vector: 0.0,
            change_rate,
            min_rad,
            max_rad,
            timer: ReapplyTimer::new(reapply_interval),
            endpoint: None,
        }
    }

    /// Integrate the current joystick vector into the angle, enforcing the
    /// axis limits and the snap to zero.
    fn integrate(&mut self, snap_epsilon_rad: f64) -> f64 {
        // Calculate the new angle to request
        let angle_rad = self.angle_rad + self.joy_vector * self.change_rate;

        // Don't exceed the min and max angles
        let angle_rad = clamp(&angle_rad, &self.min_rad, &self.max_rad);

        // If the angle is small enough to need negative exponents set it to
        // zero, they confuse the downstream conversion to string
        self.angle_rad = snap_to_zero(angle_rad, snap_epsilon_rad);

        self.angle_rad
    }

    /// Return the axis to its zero state, stopping the timer and dropping
    /// the endpoint.
    fn reset(&mut self) {
        self.angle_rad = 0.0;
        self.joy_vector = 0.0;
        self.timer.stop();
        self.endpoint = None;
    }
}

impl GripCtrl {
    /// Create a new gripper controller commanding the named rover.
    ///
    /// `ready` only becomes true once both publish endpoints have been
    /// created, so a failure here leaves a controller which rejects all
    /// motion commands.
    pub fn new(
        ctx: &zmq::Context,
        net_params: &NetParams,
        params: Params,
        rover_name: &str,
    ) -> Result<Self, GripCtrlError> {
        let reapply_interval = Duration::from_millis(params.command_reapply_interval_ms);

        let mut grip_ctrl = Self {
            ready: false,
            rover_name: String::from(rover_name),
            wrist: AxisState::new(
                params.wrist_angle_min_rad,
                params.wrist_angle_max_rad,
                params.wrist_angle_change_rate,
                reapply_interval,
            ),
            finger: AxisState::new(
                params.finger_angle_min_rad,
                params.finger_angle_max_rad,
                params.finger_angle_change_rate,
                reapply_interval,
            ),
            ctx: ctx.clone(),
            bus_endpoint: net_params.gripper_dems_endpoint.clone(),
            params,
        };

        grip_ctrl.create_endpoints()?;
        grip_ctrl.ready = true;

        Ok(grip_ctrl)
    }

    /// Update the stored joystick vector for the given axis, starting or
    /// stopping its reapply timer based on the stick center deadzone.
    ///
    /// Nothing is published here - publishing happens only on timer fire, so
    /// the command cadence stays fixed rather than input driven. The first
    /// demand after the stick leaves the deadzone follows one full reapply
    /// interval later.
    pub fn set_axis_input(
        &mut self,
        axis: GripperAxis,
        vector: f64,
        now: Instant,
    ) -> Result<(), GripCtrlError> {
        if !self.ready {
            return Err(GripCtrlError::NotReady);
        }

        let tolerance = self.params.stick_center_tolerance;

        let axis_state = match axis {
            GripperAxis::Wrist => {
                // Negate to make down the positive angle
                self.wrist.joy_vector = -vector;
                &mut self.wrist
            }
            GripperAxis::Finger => {
                self.finger.joy_vector = vector;
                &mut self.finger
            }
        };

        // Check whether the stick is near the center deadzone - if so stop
        // issuing movement commands, if not reapply the movement indicated
        // by the vector until the next sample arrives
        if axis_state.joy_vector.abs() < tolerance {
            axis_state.timer.stop();
        } else {
            axis_state.timer.start(now);
        }

        Ok(())
    }

    /// Drive the reapply timers. Called once per exec cycle.
    ///
    /// Each axis whose timer is due has its joystick vector integrated into
    /// a new angle, which is published on the axis's endpoint. Publish
    /// failures are logged and dropped - the next tick's demand supersedes
    /// the lost one.
    pub fn cycle(&mut self, now: Instant) {
        if !self.ready {
            return;
        }

        let snap_epsilon_rad = self.params.angle_snap_epsilon_rad;

        Self::cycle_axis(&mut self.wrist, snap_epsilon_rad, now);
        Self::cycle_axis(&mut self.finger, snap_epsilon_rad, now);
    }

    /// Switch all command output to the named rover.
    ///
    /// Stops both reapply timers, resets both axes to zero and replaces both
    /// endpoints with ones scoped to the new rover name. While the swap is
    /// in progress the controller is not ready and motion commands are
    /// rejected. If endpoint creation fails the controller stays not ready
    /// with no live endpoints, so subsequent motion commands keep failing
    /// with `NotReady`.
    pub fn change_rover(&mut self, rover_name: &str) -> Result<(), GripCtrlError> {
        self.ready = false;

        // Resetting stops the timers and drops the old endpoints
        self.wrist.reset();
        self.finger.reset();

        self.rover_name = String::from(rover_name);

        if let Err(e) = self.create_endpoints() {
            self.wrist.reset();
            self.finger.reset();
            return Err(e);
        }

        self.ready = true;

        debug!("Now commanding the gripper on \"{}\"", self.rover_name);

        Ok(())
    }

    /// Create both axis endpoints under the current rover name.
    fn create_endpoints(&mut self) -> Result<(), GripCtrlError> {
        self.wrist.endpoint = Some(AngleEndpoint::new(
            &self.ctx,
            &self.bus_endpoint,
            dem_topic(&self.rover_name, GripperAxis::Wrist),
        )?);
        self.finger.endpoint = Some(AngleEndpoint::new(
            &self.ctx,
            &self.bus_endpoint,
            dem_topic(&self.rover_name, GripperAxis::Finger),
        )?);

        Ok(())
    }

    /// Process one axis's timer, integrating and publishing if it is due.
    fn cycle_axis(axis_state: &mut AxisState, snap_epsilon_rad: f64, now: Instant) {
        if !axis_state.timer.poll(now) {
            return;
        }

        let angle_rad = axis_state.integrate(snap_epsilon_rad);

        if let Some(ref endpoint) = axis_state.endpoint {
            let dem = GripperDem {
                angle_rad: angle_rad as f32,
            };

            match endpoint.publish(&dem) {
                Ok(_) => debug!("Published {} rad on {}", angle_rad, endpoint.topic()),
                Err(e) => warn!("Could not publish on {}: {}", endpoint.topic(), e),
            }
        }
    }
}

impl Drop for GripCtrl {
    fn drop(&mut self) {
        self.ready = false;
        self.wrist.timer.stop();
        self.finger.timer.stop();
        // The endpoint sockets close on their own drops
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn test_net_params(bus_endpoint: &str) -> NetParams {
        NetParams {
            gripper_dems_endpoint: String::from(bus_endpoint),
            tc_endpoint: String::from("inproc://grip_test_tc_unused"),
        }
    }

    /// Bind a subscriber to an inproc bus so the controller's endpoints have
    /// something to connect to.
    fn bind_sub(ctx: &zmq::Context, bus_endpoint: &str) -> zmq::Socket {
        let sub = ctx.socket(zmq::SUB).unwrap();
        sub.bind(bus_endpoint).unwrap();
        sub.set_subscribe(b"").unwrap();
        sub.set_rcvtimeo(500).unwrap();
        sub
    }

    /// Receive one demand, returning its topic and payload. `None` if
    /// nothing arrives before the receive timeout.
    fn recv_dem(sub: &zmq::Socket) -> Option<(String, GripperDem)> {
        let msg = sub.recv_string(0).ok()?.ok()?;
        let mut parts = msg.splitn(2, ' ');
        let topic = parts.next()?.to_string();
        let dem = serde_json::from_str(parts.next()?).ok()?;
        Some((topic, dem))
    }

    #[test]
    fn test_integrate_clamps_to_max() {
        let mut axis = AxisState::new(0.0, 1.0, 0.1, INTERVAL);
        axis.angle_rad = 0.9;
        axis.joy_vector = 5.0;

        for _ in 0..10 {
            let angle_rad = axis.integrate(0.001);
            assert!(angle_rad <= 1.0);
        }

        assert_eq!(axis.angle_rad, 1.0);
    }

    #[test]
    fn test_integrate_clamps_to_min() {
        let mut axis = AxisState::new(0.0, 2.0, 0.1, INTERVAL);
        axis.joy_vector = -1.0;

        assert_eq!(axis.integrate(0.001), 0.0);
        assert_eq!(axis.integrate(0.001), 0.0);
    }

    #[test]
    fn test_integrate_snaps_small_angles_to_zero() {
        let mut axis = AxisState::new(0.0, 1.0, 0.1, INTERVAL);
        axis.angle_rad = 0.1005;
        axis.joy_vector = -1.0;

        // 0.1005 - 0.1 is within the snap epsilon, so the result must be
        // exactly zero, not a small nonzero float
        assert_eq!(axis.integrate(0.001), 0.0);
    }

    #[test]
    fn test_wrist_input_is_negated() {
        let ctx = zmq::Context::new();
        let _sub = bind_sub(&ctx, "inproc://grip_test_negate");
        let mut grip_ctrl = GripCtrl::new(
            &ctx,
            &test_net_params("inproc://grip_test_negate"),
            Params::default(),
            "rover1",
        )
        .unwrap();
        let t0 = Instant::now();

        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, -1.0, t0)
            .unwrap();
        assert_eq!(grip_ctrl.wrist.joy_vector, 1.0);

        // The finger keeps the raw sign
        grip_ctrl
            .set_axis_input(GripperAxis::Finger, -1.0, t0)
            .unwrap();
        assert_eq!(grip_ctrl.finger.joy_vector, -1.0);
    }

    #[test]
    fn test_deadzone_gates_the_timer() {
        let ctx = zmq::Context::new();
        let _sub = bind_sub(&ctx, "inproc://grip_test_deadzone");
        let mut grip_ctrl = GripCtrl::new(
            &ctx,
            &test_net_params("inproc://grip_test_deadzone"),
            Params::default(),
            "rover1",
        )
        .unwrap();
        let t0 = Instant::now();

        // Exactly on the tolerance is outside the deadzone
        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, 0.05, t0)
            .unwrap();
        assert!(grip_ctrl.wrist.timer.is_running());

        // Just inside the deadzone stops the timer
        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, 0.0499, t0)
            .unwrap();
        assert!(!grip_ctrl.wrist.timer.is_running());

        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, -1.0, t0)
            .unwrap();
        assert!(grip_ctrl.wrist.timer.is_running());

        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, 0.0, t0)
            .unwrap();
        assert!(!grip_ctrl.wrist.timer.is_running());

        // The axes are gated independently
        grip_ctrl
            .set_axis_input(GripperAxis::Finger, 1.0, t0)
            .unwrap();
        assert!(grip_ctrl.finger.timer.is_running());
        assert!(!grip_ctrl.wrist.timer.is_running());
    }

    #[test]
    fn test_not_ready_rejects_motion_commands() {
        let ctx = zmq::Context::new();
        let _sub = bind_sub(&ctx, "inproc://grip_test_notready");
        let mut grip_ctrl = GripCtrl::new(
            &ctx,
            &test_net_params("inproc://grip_test_notready"),
            Params::default(),
            "rover1",
        )
        .unwrap();

        grip_ctrl.ready = false;

        let result = grip_ctrl.set_axis_input(GripperAxis::Wrist, -1.0, Instant::now());
        assert!(matches!(result, Err(GripCtrlError::NotReady)));

        // The rejected command must not have mutated any state
        assert_eq!(grip_ctrl.wrist.joy_vector, 0.0);
        assert!(!grip_ctrl.wrist.timer.is_running());

        // The cycle is inert while not ready
        grip_ctrl.cycle(Instant::now() + Duration::from_secs(10));
        assert_eq!(grip_ctrl.wrist.angle_rad, 0.0);
    }

    #[test]
    fn test_invalid_endpoint_fails_construction() {
        let ctx = zmq::Context::new();

        // An endpoint with no transport prefix cannot be connected
        let result = GripCtrl::new(
            &ctx,
            &test_net_params("no-such-endpoint"),
            Params::default(),
            "rover1",
        );

        assert!(matches!(result, Err(GripCtrlError::EndpointError(_))));
    }

    #[test]
    fn test_change_rover_same_name_resets() {
        let ctx = zmq::Context::new();
        let _sub = bind_sub(&ctx, "inproc://grip_test_same_rover");
        let mut grip_ctrl = GripCtrl::new(
            &ctx,
            &test_net_params("inproc://grip_test_same_rover"),
            Params::default(),
            "rover1",
        )
        .unwrap();

        grip_ctrl.wrist.angle_rad = 0.5;
        grip_ctrl.change_rover("rover1").unwrap();

        assert_eq!(grip_ctrl.wrist.angle_rad, 0.0);
        assert!(grip_ctrl.wrist.endpoint.is_some());
        assert!(grip_ctrl.finger.endpoint.is_some());
        assert!(grip_ctrl.ready);

        grip_ctrl.finger.angle_rad = 0.25;
        grip_ctrl.change_rover("rover1").unwrap();

        assert_eq!(grip_ctrl.finger.angle_rad, 0.0);
        assert!(grip_ctrl.wrist.endpoint.is_some());
        assert!(grip_ctrl.finger.endpoint.is_some());
        assert!(grip_ctrl.ready);
    }

    #[test]
    fn test_wrist_teleop_end_to_end() {
        let ctx = zmq::Context::new();
        let sub = bind_sub(&ctx, "inproc://grip_test_e2e");
        let mut grip_ctrl = GripCtrl::new(
            &ctx,
            &test_net_params("inproc://grip_test_e2e"),
            Params::default(),
            "rover1",
        )
        .unwrap();

        // Let the subscription reach the new publishers
        thread::sleep(Duration::from_millis(100));

        let t0 = Instant::now();

        // Full up deflection, stored negated
        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, -1.0, t0)
            .unwrap();

        // Nothing is published before the first full interval has elapsed
        grip_ctrl.cycle(t0);
        grip_ctrl.cycle(t0 + INTERVAL / 2);

        // First tick
        grip_ctrl.cycle(t0 + INTERVAL);

        let (topic, dem) = recv_dem(&sub).expect("no demand after the first tick");
        assert_eq!(topic, "rover1/wristAngle");
        assert!((dem.angle_rad - 0.1).abs() < 1e-6);

        // Run out to 20 ticks - the angle must converge on the wrist max and
        // never exceed it
        for i in 2u32..=20 {
            grip_ctrl.cycle(t0 + INTERVAL * i);
        }

        let mut last_dem = dem;
        while let Some((_, dem)) = recv_dem(&sub) {
            assert!(dem.angle_rad <= 1.0);
            last_dem = dem;
        }
        assert_eq!(last_dem.angle_rad, 1.0);

        // Recentering the stick stops the timer - no further demands
        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, 0.0, t0 + INTERVAL * 21)
            .unwrap();
        grip_ctrl.cycle(t0 + INTERVAL * 22);
        grip_ctrl.cycle(t0 + INTERVAL * 23);
        assert!(recv_dem(&sub).is_none());

        // A rover change resets the axis and re-scopes the topics
        grip_ctrl.change_rover("rover2").unwrap();
        assert_eq!(grip_ctrl.wrist.angle_rad, 0.0);
        assert_eq!(grip_ctrl.wrist.joy_vector, 0.0);

        thread::sleep(Duration::from_millis(100));

        let t1 = t0 + INTERVAL * 24;
        grip_ctrl
            .set_axis_input(GripperAxis::Wrist, -1.0, t1)
            .unwrap();
        grip_ctrl.cycle(t1 + INTERVAL);

        let (topic, dem) = recv_dem(&sub).expect("no demand after the rover change");
        assert_eq!(topic, "rover2/wristAngle");
        assert!((dem.angle_rad - 0.1).abs() < 1e-6);
    }
}
