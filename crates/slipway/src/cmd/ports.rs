use crate::cmd::PortsArgs;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ports = serialport::available_ports()
        .map_err(|err| CliError::new(INTERNAL, format!("port enumeration failed: {err}")))?;
    ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));

    print_ports(&ports, format);
    Ok(SUCCESS)
}
