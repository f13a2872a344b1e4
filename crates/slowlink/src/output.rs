use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use slowlink_frame::{code_name, Frame};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct FrameOutput<'a> {
    sender: u8,
    target: u8,
    action: u8,
    action_name: &'a str,
    length: usize,
    broken: bool,
    body: &'a str,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let body = frame.body();
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                sender: frame.sender(),
                target: frame.target(),
                action: frame.action(),
                action_name: code_name(frame.action()),
                length: body.len(),
                broken: frame.is_broken(),
                body: body.as_ref(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENDER", "ACTION", "SIZE", "BROKEN", "BODY"])
                .add_row(vec![
                    frame.sender().to_string(),
                    code_name(frame.action()).to_string(),
                    body.len().to_string(),
                    frame.is_broken().to_string(),
                    body.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "[{}] sender={} action={} ({}) size={}{} body={}",
                now_unix_seconds(),
                frame.sender(),
                frame.action(),
                code_name(frame.action()),
                body.len(),
                if frame.is_broken() { " broken" } else { "" },
                body
            );
        }
        OutputFormat::Raw => {
            print_raw(&slowlink_frame::text::encode(&body));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
