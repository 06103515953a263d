//! Session supervision.
//!
//! A session is one [`Bridge`] lifetime: UDP traffic flows for the whole
//! session, while the serial ingress loop runs only between a device
//! appearing and it failing or going away. Device discovery itself lives
//! outside this crate: an external notifier (typically a hot-plug poller)
//! reports presence transitions over a channel, and this module turns them
//! into [`Bridge::open`]/[`Bridge::close`] calls.

use std::future::pending;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::bridge::Bridge;
use crate::error::{BridgeError, Result};

/// Device presence transition reported by an external notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The serial device appeared under the given name/path.
    Present(String),
    /// The serial device went away.
    Absent,
}

/// What woke the supervisor up.
enum Wake {
    Udp(std::result::Result<Result<()>, JoinError>),
    Serial(std::result::Result<Result<()>, JoinError>),
    Event(Option<DeviceEvent>),
}

/// Run one bridge session to completion.
///
/// Returns on the first fatal error from either channel (the caller is
/// expected to discard the bridge and build a fresh one), or cleanly when
/// the event stream closes. An `open` failure on a `Present` event is a
/// configuration error, logged and absorbed: the notifier will report the
/// device again on its next transition.
pub async fn run(bridge: Arc<Bridge>, mut events: mpsc::Receiver<DeviceEvent>) -> Result<()> {
    let mut udp_task = spawn_loop(bridge.clone(), Ingress::Udp);
    let mut serial_task: Option<JoinHandle<Result<()>>> = None;

    let outcome = loop {
        let wake = {
            let serial_done = async {
                match serial_task.as_mut() {
                    Some(task) => task.await,
                    None => pending().await,
                }
            };
            tokio::select! {
                joined = &mut udp_task => Wake::Udp(joined),
                joined = serial_done => Wake::Serial(joined),
                event = events.recv() => Wake::Event(event),
            }
        };

        match wake {
            Wake::Udp(joined) => break flatten(joined),
            Wake::Serial(joined) => {
                serial_task = None;
                break flatten(joined);
            }
            Wake::Event(Some(DeviceEvent::Present(name))) => {
                if bridge.is_serial_open() {
                    continue;
                }
                match bridge.open(&name) {
                    Ok(()) => serial_task = Some(spawn_loop(bridge.clone(), Ingress::Serial)),
                    Err(err) => warn!(error = %err, name = %name, "serial open failed"),
                }
            }
            Wake::Event(Some(DeviceEvent::Absent)) => bridge.close(),
            Wake::Event(None) => {
                info!("device notifier gone, ending session");
                break Ok(());
            }
        }
    };

    udp_task.abort();
    if let Some(task) = serial_task {
        task.abort();
    }
    outcome
}

enum Ingress {
    Udp,
    Serial,
}

fn spawn_loop(bridge: Arc<Bridge>, which: Ingress) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        match which {
            Ingress::Udp => bridge.run_udp().await,
            Ingress::Serial => bridge.run_serial().await,
        }
    })
}

fn flatten(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(err) if err.is_cancelled() => Ok(()),
        Err(err) => Err(BridgeError::Task(err)),
    }
}
