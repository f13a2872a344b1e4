mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "slowlink", version, about = "Text messaging over slow serial links")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "SLOWLINK_LOG_LEVEL",
        global = true
    )]
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
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "slowlink",
            "send",
            "/dev/ttyUSB0",
            "--target",
            "7",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "slowlink",
            "send",
            "/dev/ttyUSB0",
            "--data",
            "hello",
            "--file",
            "payload.txt",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_listen_with_code_filter() {
        let cli = Cli::try_parse_from([
            "slowlink",
            "listen",
            "/dev/ttyUSB0",
            "--baud",
            "1200",
            "--codes",
            "40,41",
            "--count",
            "3",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.baud, 1200);
                assert_eq!(args.codes, Some(vec![40, 41]));
                assert_eq!(args.count, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_match_the_link_parameters() {
        let cli = Cli::try_parse_from(["slowlink", "send", "/dev/ttyUSB0"])
            .expect("bare send should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.baud, 300);
                assert_eq!(args.target, 255);
                assert_eq!(args.code, 1);
                assert_eq!(args.chunk_size, 512);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
