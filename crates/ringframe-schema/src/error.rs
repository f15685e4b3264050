use ringframe_frame::SchemaError;

/// Errors that can occur while loading or looking up frame schemas.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A schema file or directory could not be read.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The definition is not valid JSON or does not match the format.
    #[error("invalid schema definition: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("schema {name:?}: {field} is not valid hex: {source}")]
    InvalidHex {
        name: String,
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    /// A field width other than the ones the field allows.
    #[error("schema {name:?}: invalid {field} width {width}")]
    InvalidWidth {
        name: String,
        field: &'static str,
        width: usize,
    },

    #[error("schema {name:?}: unknown checksum algorithm {algorithm:?}")]
    UnknownChecksum { name: String, algorithm: String },

    /// The definition decoded but describes an invalid schema.
    #[error("schema {name:?} is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: SchemaError,
    },

    /// A schema with this name is already registered.
    #[error("schema {0:?} is already registered")]
    Duplicate(String),

    /// No schema registered under the given name.
    #[error("no schema registered as {0:?}")]
    NoSchema(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
