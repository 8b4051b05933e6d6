//! Simple subscriber network test
//!
//! Prints all gripper demands published for rover1, the way a rover's
//! command receiver would see them.

use comms_if::net::{MonitoredSocket, SocketOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        ..Default::default()
    };

    // Create socket
    let socket = MonitoredSocket::new(&ctx, zmq::SUB, socket_options, "tcp://localhost:5030")?;

    // Subscribe to rover1's demand topics only, demands scoped to other rovers are filtered out.
    socket.set_subscribe(b"rover1/")?;

    // Receive messages from the publisher
    loop {
        let msg = socket.recv_msg(0)?;

        println!("Got demand: {:?}", msg.as_str());
    }
}
