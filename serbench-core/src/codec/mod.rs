// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec adapters and the format registry.
//!
//! Every wire format sits behind [`CodecAdapter`]. Construction returns an
//! uninitialized adapter; `initialize` must be awaited before encode/decode.
//! Formats that need a distinct transcoder per record shape resolve it from
//! the sample index, so callers always use the same four operations.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BenchError, BenchResult, CodecResult};
use crate::samples::Sample;
use crate::storage::ScratchStore;
use crate::types::FormatId;

pub mod schema_binary;
pub mod serde_formats;
pub mod xml;

pub use schema_binary::BincodeCodec;
pub use serde_formats::{Json, MessagePack, SerdeCodec, Yaml};
pub use xml::XmlCodec;

/// Contract between the benchmark core and one wire format.
#[async_trait]
pub trait CodecAdapter: Send + Sync {
    /// Unique format name this adapter reports results under.
    fn format(&self) -> &FormatId;

    /// Load and validate schemas. Idempotent.
    async fn initialize(&mut self) -> CodecResult<()>;

    fn encode(&self, sample: &Sample) -> CodecResult<Vec<u8>>;

    fn decode(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<Value>;

    fn scratch(&self) -> &ScratchStore;

    async fn persist(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<()> {
        self.scratch().write(sample_index, bytes).await
    }

    async fn load(&self, sample_index: usize) -> CodecResult<Vec<u8>> {
        self.scratch().read(sample_index).await
    }
}

/// Built-in wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
    /// Schema-bound binary: one typed transcoder per record shape.
    Bincode,
    Yaml,
    /// Compact self-describing binary.
    Msgpack,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Xml,
        Format::Bincode,
        Format::Yaml,
        Format::Msgpack,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Bincode => "BINCODE",
            Self::Yaml => "YAML",
            Self::Msgpack => "MSGPACK",
        }
    }

    /// Scratch file extension.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Bincode => "bincode",
            Self::Yaml => "yaml",
            Self::Msgpack => "bin",
        }
    }

    pub fn id(&self) -> FormatId {
        FormatId::new_unchecked(self.name())
    }

    fn factory(&self) -> CodecFactory {
        match self {
            Self::Json => create_json,
            Self::Xml => create_xml,
            Self::Bincode => create_bincode,
            Self::Yaml => create_yaml,
            Self::Msgpack => create_msgpack,
        }
    }
}

fn create_json(ctx: CodecContext) -> Box<dyn CodecAdapter> {
    Box::new(SerdeCodec::<Json>::new(ctx))
}

fn create_xml(ctx: CodecContext) -> Box<dyn CodecAdapter> {
    Box::new(XmlCodec::new(ctx))
}

fn create_bincode(ctx: CodecContext) -> Box<dyn CodecAdapter> {
    Box::new(BincodeCodec::new(ctx))
}

fn create_yaml(ctx: CodecContext) -> Box<dyn CodecAdapter> {
    Box::new(SerdeCodec::<Yaml>::new(ctx))
}

fn create_msgpack(ctx: CodecContext) -> Box<dyn CodecAdapter> {
    Box::new(SerdeCodec::<MessagePack>::new(ctx))
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BenchError::UnknownFormat(s.to_string()))
    }
}

/// Everything an adapter needs at construction time.
#[derive(Debug, Clone)]
pub struct CodecContext {
    pub format: FormatId,
    pub extension: &'static str,
    pub samples: Arc<[Sample]>,
    pub scratch_root: PathBuf,
}

impl CodecContext {
    pub fn scratch(&self) -> ScratchStore {
        ScratchStore::new(&self.scratch_root, &self.format, self.extension)
    }
}

/// Constructor for an uninitialized adapter.
pub type CodecFactory = fn(CodecContext) -> Box<dyn CodecAdapter>;

struct RegisteredCodec {
    format: FormatId,
    extension: &'static str,
    factory: CodecFactory,
}

/// Registry mapping format identifiers to adapter factories.
/// Lookups are case-insensitive.
pub struct CodecRegistry {
    codecs: HashMap<String, RegisteredCodec>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registry with every built-in format.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for format in Format::ALL {
            registry.codecs.insert(
                format.name().to_ascii_uppercase(),
                RegisteredCodec {
                    format: format.id(),
                    extension: format.extension(),
                    factory: format.factory(),
                },
            );
        }
        registry
    }

    /// Register an additional format.
    pub fn register(
        &mut self,
        format: FormatId,
        extension: &'static str,
        factory: CodecFactory,
    ) -> BenchResult<()> {
        let key = format.as_str().to_ascii_uppercase();
        if self.codecs.contains_key(&key) {
            return Err(BenchError::PipelineAlreadyExists(format));
        }
        self.codecs.insert(
            key,
            RegisteredCodec {
                format,
                extension,
                factory,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(&name.to_ascii_uppercase())
    }

    /// Canonical identifier for a name, if registered.
    pub fn resolve(&self, name: &str) -> Option<&FormatId> {
        self.codecs
            .get(&name.to_ascii_uppercase())
            .map(|codec| &codec.format)
    }

    /// Registered formats with their scratch extensions, sorted by name.
    pub fn formats(&self) -> Vec<(FormatId, &'static str)> {
        let mut formats: Vec<_> = self
            .codecs
            .values()
            .map(|codec| (codec.format.clone(), codec.extension))
            .collect();
        formats.sort();
        formats
    }

    /// Construct an uninitialized adapter for `name`.
    pub fn create(
        &self,
        name: &str,
        samples: Arc<[Sample]>,
        scratch_root: impl Into<PathBuf>,
    ) -> BenchResult<Box<dyn CodecAdapter>> {
        let codec = self
            .codecs
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| BenchError::UnknownFormat(name.to_string()))?;

        Ok((codec.factory)(CodecContext {
            format: codec.format.clone(),
            extension: codec.extension,
            samples,
            scratch_root: scratch_root.into(),
        }))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
