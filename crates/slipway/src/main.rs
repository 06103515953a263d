mod cmd;
mod exit;
mod logging;
mod output;
mod watcher;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "slipway", version, about = "UDP ⇄ serial SLIP bridge")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "slipway",
            "run",
            "/dev/ttyACM0",
            "--local-port",
            "8889",
            "--remote",
            "10.0.0.2:8888",
            "--baud",
            "57600",
        ])
        .expect("run args should parse");

        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn probe_flags_are_all_or_nothing() {
        let err = Cli::try_parse_from([
            "slipway",
            "run",
            "/dev/ttyACM0",
            "--probe-request",
            "c0ffee",
        ])
        .expect_err("lone probe flag should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_ports_subcommand() {
        let cli = Cli::try_parse_from(["slipway", "ports", "--format", "json"])
            .expect("ports args should parse");
        assert!(matches!(cli.command, Command::Ports(_)));
    }
}
