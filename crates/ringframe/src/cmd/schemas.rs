use ringframe_frame::{FrameSchema, LengthMode};
use ringframe_schema::SchemaRegistry;

use crate::cmd::SchemasArgs;
use crate::exit::{registry_error, CliError, CliResult, SUCCESS};
use crate::output::{print_schemas, OutputFormat, SchemaSummary};

pub fn run(args: SchemasArgs, format: OutputFormat) -> CliResult<i32> {
    let Some(dir) = &args.schema_dir else {
        return Err(CliError::usage("--schema-dir is required"));
    };
    let registry = SchemaRegistry::from_directory(dir)
        .map_err(|err| registry_error("loading schemas", err))?;

    let summaries: Vec<SchemaSummary> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let schema = registry.get(name)?;
            let description = registry
                .definition(name)
                .and_then(|definition| definition.description.clone());
            Some(summarize(name, description, schema))
        })
        .collect();

    print_schemas(&summaries, format);
    Ok(SUCCESS)
}

fn summarize(name: &str, description: Option<String>, schema: &FrameSchema) -> SchemaSummary {
    let mode = match schema.mode() {
        LengthMode::Fixed { content_len } => format!("fixed:{content_len}"),
        LengthMode::Dynamic { width, .. } => format!("dynamic:{}", width.bytes()),
        LengthMode::Free => "free".to_string(),
    };
    let checksum = match schema.checksum() {
        Some(spec) => match spec.algorithm() {
            Some(algorithm) => format!("{}:{}", algorithm.name(), spec.width().bytes()),
            None => format!("unverified:{}", spec.width().bytes()),
        },
        None => "-".to_string(),
    };

    SchemaSummary {
        name: name.to_string(),
        description,
        prefix: hex::encode(schema.prefix()),
        mode,
        header_len: schema.header_len(),
        trailer_len: schema.trailer_len(),
        checksum,
    }
}

#[cfg(test)]
mod tests {
    use ringframe_frame::{ChecksumAlgorithm, FieldWidth, Segments};

    use super::*;

    #[test]
    fn summary_describes_layout() {
        let schema = FrameSchema::builder([0xB5, 0x62])
            .command(FieldWidth::U16)
            .dynamic(FieldWidth::U16, Segments::CONTENT)
            .checksum(FieldWidth::U16)
            .checksum_algorithm(ChecksumAlgorithm::Fletcher16)
            .build()
            .unwrap();

        let summary = summarize("ubx", None, &schema);
        assert_eq!(summary.prefix, "b562");
        assert_eq!(summary.mode, "dynamic:2");
        assert_eq!(summary.header_len, 6);
        assert_eq!(summary.trailer_len, 2);
        assert_eq!(summary.checksum, "fletcher16:2");
    }
}
