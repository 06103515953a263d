use std::net::SocketAddr;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod ports;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bridge a serial device to a UDP peer.
    Run(RunArgs),
    /// List serial ports available on this machine.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Serial device path to bridge (e.g. /dev/ttyACM0).
    pub device: String,

    /// Local UDP port to listen on.
    #[arg(long, default_value = "8889")]
    pub local_port: u16,

    /// Remote UDP endpoint all traffic is sent to.
    #[arg(long, default_value = "127.0.0.1:8888")]
    pub remote: SocketAddr,

    /// Serial baud rate.
    #[arg(long, default_value = "115200")]
    pub baud: u32,

    /// Status-probe request pattern (hex). Datagrams containing it are
    /// answered directly instead of being forwarded.
    #[arg(long, value_name = "HEX", requires = "probe_up")]
    pub probe_request: Option<String>,

    /// Response sent while the serial device is attached (hex).
    #[arg(long, value_name = "HEX", requires = "probe_down")]
    pub probe_up: Option<String>,

    /// Response sent while the serial device is absent (hex).
    #[arg(long, value_name = "HEX", requires = "probe_request")]
    pub probe_down: Option<String>,

    /// Device presence poll interval in milliseconds.
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Delay before rebuilding a session after a serial fault, in
    /// milliseconds.
    #[arg(long, default_value = "500")]
    pub restart_delay_ms: u64,

    /// Exit after the first session instead of rebuilding.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
