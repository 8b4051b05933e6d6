//! # Telecommand Client
//!
//! Receives gripper telecommands from the operator station and acknowledges
//! each one with a [`TcResponse`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tc::{GripperTc, TcParseError, TcResponse},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telecommand client
pub struct TcClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TcClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the operator station")]
    NotConnected,

    #[error("Could not receive a message from the operator station: {0}")]
    RecvError(zmq::Error),

    #[error("Could not send the TC response: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the TC response: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the received telecommand: {0}")]
    ParseError(TcParseError),

    #[error("The operator station sent a message which was not valid UTF-8")]
    NonUtf8Tc,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TcClient {
    /// Create a new instance of the TC client.
    ///
    /// This function will not block until the operator station connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TcClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::REP, socket_options, &params.tc_endpoint)
            .map_err(TcClientError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Check if the client is connected to the operator station
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Receive a single TC from the operator station.
    ///
    /// The protocol here is to call receive_tc in a loop until `Ok(None)` is
    /// returned, indicating that there are no more pending TCs to handle
    /// right now.
    ///
    /// After receiving a valid TC the caller must send a response using
    /// `.send_response()` before attempting to receive another TC. If the TC
    /// cannot be read or parsed the response is sent automatically by this
    /// function.
    pub fn receive_tc(&self) -> Result<Option<GripperTc>, TcClientError> {
        // Check the operator station is connected
        if !self.socket.connected() {
            return Err(TcClientError::NotConnected);
        }

        // Attempt to read a string from the socket
        let tc_str = match self.socket.recv_string(0) {
            // Valid message
            Ok(Ok(s)) => s,
            // Non UTF-8 message
            Ok(Err(_)) => {
                self.send_response(TcResponse::Invalid)?;

                return Err(TcClientError::NonUtf8Tc);
            }
            // No message pending within the receive timeout
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(TcClientError::RecvError(e)),
        };

        // Parse the TC out of the packet
        match GripperTc::from_json(&tc_str) {
            Ok(tc) => Ok(Some(tc)),
            Err(e) => {
                self.send_response(TcResponse::Invalid)?;

                Err(TcClientError::ParseError(e))
            }
        }
    }

    /// Send a response to the last received TC.
    pub fn send_response(&self, response: TcResponse) -> Result<(), TcClientError> {
        let response_str =
            serde_json::to_string(&response).map_err(TcClientError::SerializationError)?;

        self.socket
            .send(&response_str, 0)
            .map_err(TcClientError::SendError)
    }
}
