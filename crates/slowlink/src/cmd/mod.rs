use clap::{Args, Subcommand};
use std::path::PathBuf;

use slowlink_frame::{BASIC_TEXT, DEFAULT_DEVICE_ADDRESS};
use slowlink_link::{DEFAULT_BITS_PER_SECOND, DEFAULT_CHUNK_SIZE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod chat;
pub mod listen;
pub mod ports;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a text payload over a serial port.
    Send(SendArgs),
    /// Attach to a serial port and print received text frames.
    Listen(ListenArgs),
    /// Interactive session: send stdin lines, print inbound text.
    Chat(ChatArgs),
    /// List serial ports available on this machine.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Chat(args) => chat::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0).
    pub port: String,
    /// Link bit rate.
    #[arg(long, default_value_t = DEFAULT_BITS_PER_SECOND)]
    pub baud: u32,
    /// Target device address (0 = broadcast).
    #[arg(long, short = 't', default_value_t = DEFAULT_DEVICE_ADDRESS)]
    pub target: u8,
    /// Action code.
    #[arg(long, short = 'c', default_value_t = BASIC_TEXT)]
    pub code: u8,
    /// Sender address stamped on the frame.
    #[arg(long, default_value_t = DEFAULT_DEVICE_ADDRESS)]
    pub sender: u8,
    /// Text payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read the payload from a file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Largest burst written between pacing pauses.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0).
    pub port: String,
    /// Link bit rate.
    #[arg(long, default_value_t = DEFAULT_BITS_PER_SECOND)]
    pub baud: u32,
    /// Device address to accept frames for (broadcast is always accepted).
    #[arg(long, default_value_t = DEFAULT_DEVICE_ADDRESS)]
    pub address: u8,
    /// Also print frames for these user action codes (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub codes: Option<Vec<u8>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0).
    pub port: String,
    /// Link bit rate.
    #[arg(long, default_value_t = DEFAULT_BITS_PER_SECOND)]
    pub baud: u32,
    /// Device address of this endpoint.
    #[arg(long, default_value_t = DEFAULT_DEVICE_ADDRESS)]
    pub address: u8,
    /// Target device address for outbound lines (0 = broadcast).
    #[arg(long, short = 't', default_value_t = DEFAULT_DEVICE_ADDRESS)]
    pub target: u8,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
