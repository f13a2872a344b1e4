use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serialport::SerialPortType;

use crate::cmd::PortsArgs;
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PortEntry {
    name: String,
    kind: String,
}

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = serialport::available_ports()
        .map_err(|err| CliError::new(FAILURE, format!("port enumeration failed: {err}")))?;

    let entries: Vec<PortEntry> = ports
        .into_iter()
        .map(|port| PortEntry {
            name: port.port_name,
            kind: kind_name(&port.port_type).to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE"]);
            for entry in &entries {
                table.add_row(vec![entry.name.clone(), entry.kind.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in &entries {
                println!("{} ({})", entry.name, entry.kind);
            }
        }
    }

    Ok(SUCCESS)
}

fn kind_name(kind: &SerialPortType) -> &'static str {
    match kind {
        SerialPortType::UsbPort(_) => "usb",
        SerialPortType::PciPort => "pci",
        SerialPortType::BluetoothPort => "bluetooth",
        SerialPortType::Unknown => "unknown",
    }
}
