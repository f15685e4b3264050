use std::fs::File;
use std::io::{Cursor, Read};

use ringframe_frame::{FrameError, FrameReader, ReaderConfig};
use tracing::{info, warn};

use crate::cmd::{load_schema, parse_hex_arg, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.capacity == 0 || args.chunk_size == 0 {
        return Err(CliError::usage(
            "--capacity and --chunk-size must be greater than zero",
        ));
    }

    let (name, schema) = load_schema(&args.schema)?;
    let input = open_input(&args)?;
    let config = ReaderConfig {
        window_capacity: args.capacity,
        read_chunk_size: args.chunk_size,
    };
    let mut reader = FrameReader::with_config(input, schema, config)
        .map_err(|err| frame_error("decode setup failed", err))?;

    let mut decoded = 0usize;
    let mut rejected = 0usize;
    let mut unread = 0usize;

    while args.count.map_or(true, |count| decoded < count) {
        match reader.read_frame() {
            Ok(frame) => {
                print_frame(&frame, &name, decoded, format);
                decoded = decoded.saturating_add(1);
            }
            Err(FrameError::EndOfStream { unread: tail }) => {
                unread = tail;
                break;
            }
            Err(err) if err.is_recoverable() => {
                rejected = rejected.saturating_add(1);
                if let FrameError::Malformed {
                    rejection,
                    discarded,
                } = &err
                {
                    warn!(schema = %name, reason = %rejection, discarded, "rejected frame");
                }
                if args.strict {
                    return Err(frame_error("decode failed", err));
                }
            }
            Err(err) => return Err(frame_error("decode failed", err)),
        }
    }

    info!(schema = %name, frames = decoded, rejected, unread, "decode finished");
    Ok(SUCCESS)
}

fn open_input(args: &DecodeArgs) -> CliResult<Box<dyn Read>> {
    if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("opening {}", path.display()), err))?;
        return Ok(Box::new(file));
    }
    if let Some(hex) = &args.hex {
        return Ok(Box::new(Cursor::new(parse_hex_arg("hex", hex)?)));
    }
    Ok(Box::new(std::io::stdin()))
}
