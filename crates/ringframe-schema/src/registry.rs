use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use ringframe_frame::FrameSchema;
use tracing::info;

use crate::config::RegistryConfig;
use crate::definition::SchemaDefinition;
use crate::error::{RegistryError, Result};

const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

struct Entry {
    definition: SchemaDefinition,
    schema: FrameSchema,
}

/// Name-keyed registry of validated frame schemas.
pub struct SchemaRegistry {
    entries: BTreeMap<String, Entry>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
        }
    }

    /// Register a schema from its JSON definition. Returns the schema name.
    pub fn register(&mut self, json: &str) -> Result<String> {
        let definition = SchemaDefinition::from_json(json)?;
        let name = definition.name.clone();
        self.register_definition(definition)?;
        Ok(name)
    }

    /// Validate and register a parsed definition.
    pub fn register_definition(&mut self, definition: SchemaDefinition) -> Result<()> {
        if !self.config.replace_existing && self.entries.contains_key(&definition.name) {
            return Err(RegistryError::Duplicate(definition.name));
        }

        let schema = definition.to_schema()?;
        info!(
            schema = %definition.name,
            header_len = schema.header_len(),
            trailer_len = schema.trailer_len(),
            "registered frame schema"
        );
        self.entries
            .insert(definition.name.clone(), Entry { definition, schema });
        Ok(())
    }

    /// Load schemas from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load every `*.schema.json` file in a directory with explicit config.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        let mut loaded_schema_count = 0usize;

        let mut paths = Vec::new();
        let entries = std::fs::read_dir(path)
            .map_err(|err| RegistryError::LoadFailed(format!("{}: {err}", path.display())))?;
        for entry in entries {
            let entry = entry.map_err(|err| RegistryError::LoadFailed(err.to_string()))?;
            paths.push(entry.path());
        }
        // Directory order is platform dependent; load in name order.
        paths.sort();

        for entry_path in paths {
            let file_name = match entry_path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            if !file_name.to_ascii_lowercase().ends_with(SCHEMA_FILE_SUFFIX) {
                continue;
            }

            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| RegistryError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();
            if file_type.is_symlink() {
                return Err(RegistryError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            loaded_schema_count = loaded_schema_count.saturating_add(1);
            if loaded_schema_count > registry.config.max_schemas_from_directory {
                return Err(RegistryError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    registry.config.max_schemas_from_directory, loaded_schema_count
                )));
            }

            let file = std::fs::File::open(&entry_path).map_err(|err| {
                RegistryError::LoadFailed(format!(
                    "failed opening schema {}: {err}",
                    entry_path.display()
                ))
            })?;
            let opened_metadata = file
                .metadata()
                .map_err(|err| RegistryError::LoadFailed(err.to_string()))?;

            #[cfg(unix)]
            {
                if !same_file_identity(&path_metadata, &opened_metadata) {
                    return Err(RegistryError::LoadFailed(format!(
                        "schema file changed during load: {file_name}"
                    )));
                }
            }

            if opened_metadata.len() > registry.config.max_schema_file_size as u64 {
                return Err(RegistryError::LoadFailed(format!(
                    "schema file too large ({} bytes): {file_name}",
                    opened_metadata.len()
                )));
            }

            let max_bytes = registry.config.max_schema_file_size;
            let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
            let mut content = String::new();
            file.take(read_limit)
                .read_to_string(&mut content)
                .map_err(|err| {
                    RegistryError::LoadFailed(format!(
                        "failed reading schema {}: {err}",
                        entry_path.display()
                    ))
                })?;
            if content.len() > max_bytes {
                return Err(RegistryError::LoadFailed(format!(
                    "schema file too large while reading: {file_name}"
                )));
            }

            registry.register(&content)?;
        }

        Ok(registry)
    }

    /// Load from embedded JSON definitions.
    pub fn from_embedded(definitions: &[&str]) -> Result<Self> {
        let mut registry = Self::new();
        for json in definitions {
            registry.register(json)?;
        }
        Ok(registry)
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&FrameSchema> {
        self.entries.get(name).map(|entry| &entry.schema)
    }

    /// Like [`get`](Self::get), but a missing name is an error.
    pub fn require(&self, name: &str) -> Result<&FrameSchema> {
        self.get(name)
            .ok_or_else(|| RegistryError::NoSchema(name.to_string()))
    }

    /// The definition a schema was built from.
    pub fn definition(&self, name: &str) -> Option<&SchemaDefinition> {
        self.entries.get(name).map(|entry| &entry.definition)
    }

    /// Check if a schema is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
