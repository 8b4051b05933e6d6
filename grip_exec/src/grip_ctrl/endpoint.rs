//! Angle demand publish endpoint

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    gripper::GripperDem,
    net::{zmq, MonitoredSocket, SocketOptions},
};

use super::GripCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Publish endpoint for one gripper axis's angle demands.
///
/// Demands are sent on a PUB socket connected to the demand bus, as
/// `"<topic> <json>"` messages which subscribers filter by topic prefix.
pub struct AngleEndpoint {
    socket: MonitoredSocket,

    /// Rover-scoped topic this endpoint publishes under
    topic: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AngleEndpoint {
    /// Create a new endpoint publishing under the given topic.
    ///
    /// This function will not block waiting for a subscriber, since demands
    /// are useful even if the rover only comes up later.
    pub fn new(
        ctx: &zmq::Context,
        bus_endpoint: &str,
        topic: String,
    ) -> Result<Self, GripCtrlError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        // Create the socket
        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, bus_endpoint)
            .map_err(GripCtrlError::EndpointError)?;

        Ok(Self { socket, topic })
    }

    /// The topic this endpoint publishes under.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a single angle demand.
    pub fn publish(&self, dem: &GripperDem) -> Result<(), GripCtrlError> {
        let dem_str = serde_json::to_string(dem).map_err(GripCtrlError::SerializationError)?;

        self.socket
            .send(&format!("{} {}", self.topic, dem_str), 0)
            .map_err(GripCtrlError::PublishError)
    }
}
