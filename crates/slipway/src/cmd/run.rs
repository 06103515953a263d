use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use slipway_bridge::serial::SerialportConnector;
use slipway_bridge::{session, Bridge, BridgeConfig, DeviceEvent, StatusProbe};

use crate::cmd::RunArgs;
use crate::exit::{bridge_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::watcher;

pub fn run(args: RunArgs) -> CliResult<i32> {
    let probe = parse_probe(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))?;

    runtime.block_on(supervise(args, probe))
}

/// Outer session loop: build a bridge and a device watcher, run the session
/// until it dies, then discard everything and start over. No state survives
/// a session boundary; discovery is re-armed from scratch each time.
async fn supervise(args: RunArgs, probe: Option<StatusProbe>) -> CliResult<i32> {
    let poll_interval = Duration::from_millis(args.poll_interval_ms);
    let restart_delay = Duration::from_millis(args.restart_delay_ms);

    loop {
        let mut config = BridgeConfig::on_port(args.local_port, args.remote);
        config.probe = probe.clone();

        let connector = SerialportConnector::new(args.baud);
        let bridge = Arc::new(
            Bridge::bind(config, Box::new(connector))
                .await
                .map_err(|err| bridge_error("bridge startup failed", err))?,
        );

        let (event_tx, event_rx) = mpsc::channel::<DeviceEvent>(8);
        let watch_task = tokio::spawn(watcher::watch(
            args.device.clone(),
            poll_interval,
            event_tx,
        ));

        let outcome = tokio::select! {
            result = session::run(bridge, event_rx) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        watch_task.abort();

        match outcome {
            None => {
                info!("interrupted, shutting down");
                return Ok(SUCCESS);
            }
            Some(Ok(())) => return Ok(SUCCESS),
            Some(Err(err)) if err.is_fatal() && !args.once => {
                warn!(error = %err, "session terminated, rebuilding");
                tokio::time::sleep(restart_delay).await;
            }
            Some(Err(err)) => return Err(bridge_error("session failed", err)),
        }
    }
}

fn parse_probe(args: &RunArgs) -> CliResult<Option<StatusProbe>> {
    let (Some(request), Some(up), Some(down)) =
        (&args.probe_request, &args.probe_up, &args.probe_down)
    else {
        return Ok(None);
    };

    let request = parse_hex("probe-request", request)?;
    let up = parse_hex("probe-up", up)?;
    let down = parse_hex("probe-down", down)?;

    StatusProbe::new(request, up, down)
        .map(Some)
        .map_err(|err| CliError::new(USAGE, err.to_string()))
}

fn parse_hex(flag: &str, value: &str) -> CliResult<Vec<u8>> {
    hex::decode(value).map_err(|err| CliError::new(USAGE, format!("--{flag}: invalid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_probe(
        request: Option<&str>,
        up: Option<&str>,
        down: Option<&str>,
    ) -> RunArgs {
        RunArgs {
            device: "/dev/ttyACM0".into(),
            local_port: 8889,
            remote: "127.0.0.1:8888".parse().unwrap(),
            baud: 115_200,
            probe_request: request.map(Into::into),
            probe_up: up.map(Into::into),
            probe_down: down.map(Into::into),
            poll_interval_ms: 1000,
            restart_delay_ms: 500,
            once: false,
        }
    }

    #[test]
    fn no_probe_flags_means_no_probe() {
        let probe = parse_probe(&args_with_probe(None, None, None)).unwrap();
        assert!(probe.is_none());
    }

    #[test]
    fn probe_blobs_parse_from_hex() {
        let probe =
            parse_probe(&args_with_probe(Some("c0ffee"), Some("01"), Some("00"))).unwrap();
        assert!(probe.is_some());
    }

    #[test]
    fn invalid_hex_is_a_usage_error() {
        let err =
            parse_probe(&args_with_probe(Some("zz"), Some("01"), Some("00"))).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn empty_request_pattern_is_a_usage_error() {
        let err = parse_probe(&args_with_probe(Some(""), Some("01"), Some("00"))).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
