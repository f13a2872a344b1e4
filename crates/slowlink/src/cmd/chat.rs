use std::io::BufRead;

use slowlink_frame::{Frame, BASIC_TEXT};
use slowlink_link::{Connection, LinkConfig};
use tracing::info;

use crate::cmd::ChatArgs;
use crate::exit::{link_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

/// Interactive session: stdin lines go out as basic text, inbound text
/// frames print to stdout. Ends at stdin EOF.
pub fn run(args: ChatArgs, format: OutputFormat) -> CliResult<i32> {
    let channel = slowlink_transport::open(&args.port, args.baud)
        .map_err(|err| transport_error("open failed", err))?;

    let config = LinkConfig {
        bits_per_second: args.baud,
        address: args.address,
        ..LinkConfig::default()
    };
    let link = Connection::attach(Box::new(channel), config)
        .map_err(|err| link_error("attach failed", err))?;

    link.set_text_observer(move |frame: &Frame| {
        print_frame(frame, format);
    });

    info!(port = %args.port, target = args.target, "chat session started");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| crate::exit::io_error("stdin read failed", err))?;
        if line.is_empty() {
            continue;
        }
        link.send_text(args.target, BASIC_TEXT, &line)
            .map_err(|err| link_error("send failed", err))?;
    }

    Ok(SUCCESS)
}
