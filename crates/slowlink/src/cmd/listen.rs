use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use slowlink_frame::Frame;
use slowlink_link::{Connection, LinkConfig};
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{link_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let channel = slowlink_transport::open(&args.port, args.baud)
        .map_err(|err| transport_error("open failed", err))?;

    let config = LinkConfig {
        bits_per_second: args.baud,
        address: args.address,
        ..LinkConfig::default()
    };
    let link = Connection::attach(Box::new(channel), config)
        .map_err(|err| link_error("attach failed", err))?;

    let (tx, rx) = mpsc::channel::<Frame>();

    let observer_tx = tx.clone();
    link.set_text_observer(move |frame: &Frame| {
        let _ = observer_tx.send(frame.clone());
    });

    if let Some(codes) = &args.codes {
        for &code in codes {
            let tx = tx.clone();
            link.bind(code, move |frame: &Frame, _: &Connection| -> slowlink_link::Result<()> {
                let _ = tx.send(frame.clone());
                Ok(())
            })
            .map_err(|err| link_error("bind failed", err))?;
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(port = %args.port, baud = args.baud, address = args.address, "listening");

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        // Poll so Ctrl-C is noticed even when the line is silent.
        let frame = match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(frame) => frame,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
