/// Controls how a [`SchemaRegistry`](crate::SchemaRegistry) loads schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of schemas loaded from a directory.
    pub max_schemas_from_directory: usize,
    /// Maximum bytes allowed per schema file loaded from a directory.
    pub max_schema_file_size: usize,
    /// When true, registering an existing name replaces it instead of failing.
    pub replace_existing: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_schemas_from_directory: 256,
            max_schema_file_size: 64 * 1024,
            replace_existing: false,
        }
    }
}
