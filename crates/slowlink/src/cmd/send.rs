use std::fs;

use slowlink_frame::compose;
use slowlink_link::PacedWriter;
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let body = resolve_payload(&args)?;
    let frame = compose(args.sender, args.target, args.code, &body)
        .map_err(|err| frame_error("payload rejected", err))?;

    let channel = slowlink_transport::open(&args.port, args.baud)
        .map_err(|err| transport_error("open failed", err))?;
    let mut writer = PacedWriter::new(channel, args.baud, args.chunk_size);

    let wire = frame.encode();
    writer
        .write(&wire)
        .map_err(|err| crate::exit::io_error("send failed", err))?;

    info!(
        bytes = wire.len(),
        target = args.target,
        code = args.code,
        "payload sent"
    );
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(String::new())
}
