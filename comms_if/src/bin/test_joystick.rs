//! Synthetic joystick test source
//!
//! Binds the telecommand endpoint and streams wrist axis samples from a
//! canned stick trace, so the gripper exec can be driven end to end without
//! joystick hardware.

use comms_if::{
    gripper::GripperAxis,
    net::{MonitoredSocket, SocketOptions},
    tc::{GripperTc, TcResponse},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create the context for zmq
    let ctx = zmq::Context::new();

    // Set the socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        linger: 1,
        recv_timeout: 1000,
        send_timeout: 10,
        req_correlate: true,
        req_relaxed: true,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::REQ, socket_options, "tcp://*:5031")?;

    println!("Joystick TC source open on port 5031");

    // Canned stick trace: hold full deflection, ease off, then recentre
    let trace: [f64; 8] = [1.0, 1.0, 1.0, 0.6, 0.3, 0.0, 0.0, 0.0];
    let mut sample = 0usize;

    // Loop over sending samples to the exec
    loop {
        let tc = GripperTc::AxisInput {
            axis: GripperAxis::Wrist,
            vector: trace[sample % trace.len()],
        };
        sample += 1;

        // Send the sample to the exec
        match socket.send(&tc.to_json()?, 0) {
            Ok(_) => (),
            // If the operation wasn't completed wait a bit
            Err(e) => {
                println!("Could not send TC: {}", e);
                std::thread::sleep(std::time::Duration::from_millis(1000));
                continue;
            }
        }

        // Receive the response from the exec
        let msg = match socket.recv_msg(0) {
            Ok(m) => m,
            // If we didn't get a response wait a bit
            Err(e) => {
                println!("No response from exec: {}", e);
                std::thread::sleep(std::time::Duration::from_millis(1000));
                continue;
            }
        };

        // Print some info about the response
        match msg.as_str().map(serde_json::from_str::<TcResponse>) {
            Some(Ok(response)) => println!("Sent {:?}, response {:?}", tc, response),
            _ => println!("Unrecognised response"),
        }

        std::thread::sleep(std::time::Duration::from_millis(250));
    }
}
