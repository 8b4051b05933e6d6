//! Simple network publisher test
//!
//! Publishes a synthetic wrist angle ramp so demand subscribers can be
//! checked without running the full exec.

use comms_if::{
    gripper::{dem_topic, GripperAxis, GripperDem},
    net::{MonitoredSocket, SocketOptions},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, "tcp://*:5030")?;

    println!("Gripper demand publisher open on port 5030");

    let mut angle_rad = 0.0f32;

    // Send demands to subscribers
    loop {
        // The first part of the message, separated by a space, is the topic. Subscribers can
        // filter data by this topic using the `.set_subscribe()` function.
        let dem = GripperDem { angle_rad };
        let msg = format!(
            "{} {}",
            dem_topic("rover1", GripperAxis::Wrist),
            serde_json::to_string(&dem)?
        );

        // Send the demand
        match socket.send(&msg, 0) {
            Ok(_) => println!("Sent {}", msg),
            Err(e) => println!("Failed to send demand: {}", e),
        }

        // Ramp the angle through the wrist range
        angle_rad = (angle_rad + 0.1) % 1.0;

        std::thread::sleep(std::time::Duration::from_millis(1000));
    }
}
