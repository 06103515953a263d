//! UDP ⇄ serial bridge engine.
//!
//! A [`Bridge`] binds one UDP endpoint and owns at most one serial channel.
//! Datagrams from the UDP side are SLIP-encoded and relayed to the serial
//! device; framed bytes from the serial side are reassembled and relayed to
//! a fixed remote UDP peer. A configurable [`StatusProbe`] answers liveness
//! requests on the UDP side directly, so a remote controller can tell
//! whether the device is attached without touching it.
//!
//! Each direction writes through its own coalescing queue with a single
//! in-flight buffer. UDP faults are transient and logged; any serial fault
//! is fatal to the whole session, which the owner discards and rebuilds
//! (see [`session`]).

pub mod bridge;
pub mod error;
pub mod probe;
mod queue;
pub mod serial;
pub mod session;

pub use bridge::{Bridge, BridgeConfig};
pub use error::{BridgeError, Result};
pub use probe::StatusProbe;
pub use serial::{SerialConnector, SerialLink, SerialportConnector};
pub use session::DeviceEvent;
