//! Serial device hot-plug watcher.
//!
//! Polls the platform port enumeration and reports presence edges to the
//! session supervisor. Discovery state deliberately lives outside the
//! bridge, which only ever sees `open`/`close`.

use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use slipway_bridge::DeviceEvent;

/// Watch for the named device and report presence transitions.
///
/// Runs until the receiving side goes away. Starts from "absent", so a
/// device that is already plugged in produces an immediate `Present` edge
/// on the first poll.
pub async fn watch(device: String, interval: Duration, events: mpsc::Sender<DeviceEvent>) {
    let mut present = false;
    loop {
        let now = device_present(&device);
        if now != present {
            present = now;
            let event = if now {
                DeviceEvent::Present(device.clone())
            } else {
                DeviceEvent::Absent
            };
            debug!(?event, "device presence changed");
            if events.send(event).await.is_err() {
                return;
            }
        }
        tokio::time::sleep(interval).await;
    }
}

fn device_present(device: &str) -> bool {
    match serialport::available_ports() {
        // Enumeration misses pseudo-terminals and symlinked device names;
        // a plain path check covers those.
        Ok(ports) => {
            ports.iter().any(|port| port.port_name == device) || Path::new(device).exists()
        }
        Err(err) => {
            warn!(error = %err, "serial port enumeration failed");
            Path::new(device).exists()
        }
    }
}
