use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ringframe_frame::Frame;
use serde::Serialize;

const FRAME_SCHEMA_ID: &str = "https://schemas.3leaps.dev/ringframe/cli/v1/frame-decoded.schema.json";
const SUMMARY_SCHEMA_ID: &str =
    "https://schemas.3leaps.dev/ringframe/cli/v1/schema-summary.schema.json";

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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
    schema_id: &'static str,
    schema: &'a str,
    index: usize,
    position: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<u32>,
    content_size: usize,
    content_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_text: Option<&'a str>,
}

/// One decoded frame. `index` counts accepted frames from zero.
pub fn print_frame(frame: &Frame, schema: &str, index: usize, format: OutputFormat) {
    let content = frame.content.as_ref();
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                schema_id: FRAME_SCHEMA_ID,
                schema,
                index,
                position: frame.position,
                command: frame.command,
                content_size: content.len(),
                content_hex: hex::encode(content),
                content_text: printable_text(content),
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
                .set_header(vec!["#", "POSITION", "COMMAND", "SIZE", "CONTENT"])
                .add_row(vec![
                    index.to_string(),
                    frame.position.to_string(),
                    command_label(frame.command),
                    content.len().to_string(),
                    content_preview(content),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{index} position={} command={} size={} content={}",
                frame.position,
                command_label(frame.command),
                content.len(),
                content_preview(content)
            );
        }
        OutputFormat::Raw => {
            print_raw(content);
        }
    }
}

/// Row shown by `ringframe schemas`.
#[derive(Debug, Serialize)]
pub struct SchemaSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prefix: String,
    pub mode: String,
    pub header_len: usize,
    pub trailer_len: usize,
    pub checksum: String,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    schema_id: &'static str,
    schemas: &'a [SchemaSummary],
}

pub fn print_schemas(summaries: &[SchemaSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                schema_id: SUMMARY_SCHEMA_ID,
                schemas: summaries,
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
                .set_header(vec!["NAME", "PREFIX", "MODE", "HEADER", "TRAILER", "CHECKSUM"]);
            for summary in summaries {
                table.add_row(vec![
                    summary.name.clone(),
                    summary.prefix.clone(),
                    summary.mode.clone(),
                    summary.header_len.to_string(),
                    summary.trailer_len.to_string(),
                    summary.checksum.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for summary in summaries {
                println!(
                    "{} prefix={} mode={} header={} trailer={} checksum={}",
                    summary.name,
                    summary.prefix,
                    summary.mode,
                    summary.header_len,
                    summary.trailer_len,
                    summary.checksum
                );
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn command_label(command: Option<u32>) -> String {
    match command {
        Some(value) => format!("{value:#06x}"),
        None => "-".to_string(),
    }
}

/// UTF-8 content without control characters, shown as text.
fn printable_text(content: &[u8]) -> Option<&str> {
    std::str::from_utf8(content)
        .ok()
        .filter(|text| !text.is_empty() && !text.chars().any(char::is_control))
}

fn content_preview(content: &[u8]) -> String {
    match printable_text(content) {
        Some(text) => text.to_string(),
        None => hex::encode(content),
    }
}
