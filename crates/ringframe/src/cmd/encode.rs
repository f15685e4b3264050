use bytes::BytesMut;
use ringframe_frame::encode_frame;
use serde::Serialize;

use crate::cmd::{load_schema, parse_hex_arg, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_raw, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    schema_id: &'static str,
    schema: &'a str,
    command: u32,
    frame_size: usize,
    frame_hex: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (name, schema) = load_schema(&args.schema)?;
    let content = match (&args.hex, &args.data) {
        (Some(hex), _) => parse_hex_arg("hex", hex)?,
        (None, Some(data)) => data.as_bytes().to_vec(),
        (None, None) => Vec::new(),
    };

    let mut frame = BytesMut::with_capacity(schema.frame_len(content.len()));
    encode_frame(&schema, args.command, &content, &mut frame)
        .map_err(|err| frame_error("encode failed", err))?;

    match format {
        OutputFormat::Raw => print_raw(&frame),
        OutputFormat::Json => {
            let out = EncodeOutput {
                schema_id: "https://schemas.3leaps.dev/ringframe/cli/v1/frame-encoded.schema.json",
                schema: &name,
                command: args.command,
                frame_size: frame.len(),
                frame_hex: hex::encode(&frame),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", hex::encode(&frame)),
    }

    Ok(SUCCESS)
}
