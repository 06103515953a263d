use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PortOutput {
    name: String,
    kind: &'static str,
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
    vid: Option<u16>,
    pid: Option<u16>,
}

impl From<&SerialPortInfo> for PortOutput {
    fn from(port: &SerialPortInfo) -> Self {
        let (kind, usb) = match &port.port_type {
            SerialPortType::UsbPort(info) => ("usb", Some(info.clone())),
            SerialPortType::BluetoothPort => ("bluetooth", None),
            SerialPortType::PciPort => ("pci", None),
            SerialPortType::Unknown => ("unknown", None),
        };
        Self {
            name: port.port_name.clone(),
            kind,
            manufacturer: usb.as_ref().and_then(|u| u.manufacturer.clone()),
            product: usb.as_ref().and_then(|u| u.product.clone()),
            serial_number: usb.as_ref().and_then(|u| u.serial_number.clone()),
            vid: usb.as_ref().map(|u| u.vid),
            pid: usb.as_ref().map(|u| u.pid),
        }
    }
}

pub fn print_ports(ports: &[SerialPortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput> = ports.iter().map(PortOutput::from).collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE", "PRODUCT", "VID:PID"]);
            for row in &rows {
                table.add_row(vec![
                    row.name.clone(),
                    row.kind.to_string(),
                    row.product.clone().unwrap_or_default(),
                    match (row.vid, row.pid) {
                        (Some(vid), Some(pid)) => format!("{vid:04x}:{pid:04x}"),
                        _ => String::new(),
                    },
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!(
                    "{} type={} product={}",
                    row.name,
                    row.kind,
                    row.product.as_deref().unwrap_or("-")
                );
            }
        }
    }
}
