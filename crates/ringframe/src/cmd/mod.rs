use std::path::PathBuf;

use clap::{Args, Subcommand};
use ringframe_frame::{FrameSchema, DEFAULT_READ_CHUNK_SIZE, DEFAULT_WINDOW_CAPACITY};
use ringframe_schema::SchemaRegistry;

use crate::exit::{io_error, registry_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod schemas;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract frames from a byte stream.
    Decode(DecodeArgs),
    /// Build one frame and print it.
    Encode(EncodeArgs),
    /// List the schemas in a directory.
    Schemas(SchemasArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Schemas(args) => schemas::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the frame schema comes from.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Load a single `*.schema.json` definition.
    #[arg(long, value_name = "PATH")]
    pub schema_file: Option<PathBuf>,
    /// Directory of `*.schema.json` definitions.
    #[arg(long, value_name = "DIR", env = "RINGFRAME_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
    /// Schema name to use from the directory.
    #[arg(long, value_name = "NAME")]
    pub schema: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Read bytes from a file instead of stdin.
    #[arg(long, value_name = "PATH", conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Decode a hex string instead of stdin.
    #[arg(long, value_name = "HEX")]
    pub hex: Option<String>,
    /// Ring buffer capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_WINDOW_CAPACITY)]
    pub capacity: usize,
    /// Bytes fed to the ring buffer per read.
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Stop after N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Fail with exit code 60 on the first rejected frame.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Command field value (decimal or 0x-prefixed hex).
    #[arg(long, short = 'c', default_value = "0", value_parser = parse_u32)]
    pub command: u32,
    /// Content as hex.
    #[arg(long, value_name = "HEX", conflicts_with = "data")]
    pub hex: Option<String>,
    /// Content as a UTF-8 string.
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Directory of `*.schema.json` definitions.
    #[arg(long, value_name = "DIR", env = "RINGFRAME_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_u32(value: &str) -> Result<u32, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|err| format!("invalid number {value:?}: {err}"))
}

/// Decode a hex argument, ignoring whitespace.
pub fn parse_hex_arg(flag: &str, value: &str) -> CliResult<Vec<u8>> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map_err(|err| CliError::usage(format!("--{flag}: {err}")))
}

/// Resolve the schema named by the arguments. Returns its name and the schema.
pub fn load_schema(args: &SchemaArgs) -> CliResult<(String, FrameSchema)> {
    if let Some(path) = &args.schema_file {
        let json = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("reading {}", path.display()), err))?;
        let mut registry = SchemaRegistry::new();
        let name = registry
            .register(&json)
            .map_err(|err| registry_error("invalid schema file", err))?;
        if let Some(wanted) = &args.schema {
            if wanted != &name {
                return Err(CliError::usage(format!(
                    "schema file defines {name:?}, not {wanted:?}"
                )));
            }
        }
        let schema = registry
            .require(&name)
            .map_err(|err| registry_error("schema lookup", err))?
            .clone();
        return Ok((name, schema));
    }

    let Some(dir) = &args.schema_dir else {
        return Err(CliError::usage(
            "a schema is required: pass --schema-file or --schema-dir",
        ));
    };
    let registry = SchemaRegistry::from_directory(dir)
        .map_err(|err| registry_error("loading schemas", err))?;

    let name = match &args.schema {
        Some(name) => name.clone(),
        None => match registry.names().as_slice() {
            [only] => only.to_string(),
            names => {
                return Err(CliError::usage(format!(
                    "--schema is required when the directory holds {} schemas",
                    names.len()
                )))
            }
        },
    };
    let schema = registry
        .require(&name)
        .map_err(|err| registry_error("schema lookup", err))?
        .clone();
    Ok((name, schema))
}
