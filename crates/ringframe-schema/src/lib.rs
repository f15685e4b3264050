//! Declarative frame schemas.
//!
//! Describe a wire format once in JSON and load it by name instead of
//! wiring up a [`FrameSchema`](ringframe_frame::FrameSchema) builder in code.
//! See [`definition`] for the format.
//!
//! This crate is optional. The parser itself only needs a typed schema.

pub mod config;
pub mod definition;
pub mod error;
pub mod registry;

pub use config::RegistryConfig;
pub use definition::{
    ChecksumDefinition, ModeDefinition, ScanDefinition, SchemaDefinition, SegmentName,
};
pub use error::{RegistryError, Result};
pub use registry::SchemaRegistry;
