// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Self-describing formats driven directly by serde.
//!
//! JSON, YAML and MessagePack need no schema, so one encode/decode pair
//! serves every sample and initialization is a no-op.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use super::{CodecAdapter, CodecContext};
use crate::error::{CodecError, CodecResult};
use crate::samples::Sample;
use crate::storage::ScratchStore;
use crate::types::FormatId;

/// A serde-backed wire format.
pub trait WireFormat: Send + Sync + 'static {
    fn to_bytes(value: &Value) -> Result<Vec<u8>, String>;
    fn from_bytes(bytes: &[u8]) -> Result<Value, String>;
}

pub struct Json;

impl WireFormat for Json {
    fn to_bytes(value: &Value) -> Result<Vec<u8>, String> {
        serde_json::to_vec(value).map_err(|e| e.to_string())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Value, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }
}

pub struct Yaml;

impl WireFormat for Yaml {
    fn to_bytes(value: &Value) -> Result<Vec<u8>, String> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| e.to_string())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Value, String> {
        serde_yaml::from_slice(bytes).map_err(|e| e.to_string())
    }
}

pub struct MessagePack;

impl WireFormat for MessagePack {
    fn to_bytes(value: &Value) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec(value).map_err(|e| e.to_string())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Value, String> {
        rmp_serde::from_slice(bytes).map_err(|e| e.to_string())
    }
}

/// Adapter for any [`WireFormat`].
pub struct SerdeCodec<W> {
    format: FormatId,
    scratch: ScratchStore,
    _wire: PhantomData<fn() -> W>,
}

impl<W: WireFormat> SerdeCodec<W> {
    pub fn new(ctx: CodecContext) -> Self {
        Self {
            scratch: ctx.scratch(),
            format: ctx.format,
            _wire: PhantomData,
        }
    }
}

#[async_trait]
impl<W: WireFormat> CodecAdapter for SerdeCodec<W> {
    fn format(&self) -> &FormatId {
        &self.format
    }

    async fn initialize(&mut self) -> CodecResult<()> {
        Ok(())
    }

    fn encode(&self, sample: &Sample) -> CodecResult<Vec<u8>> {
        W::to_bytes(&sample.value).map_err(|reason| CodecError::Encode {
            sample_index: sample.index,
            reason,
        })
    }

    fn decode(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<Value> {
        W::from_bytes(bytes).map_err(|reason| CodecError::Decode {
            sample_index,
            reason,
        })
    }

    fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "structId": 1,
            "integer": -42,
            "float": 1234.5678,
            "stringData": "quote \" colon: hash # <tag>",
            "nested": { "list": [1, 2.5, "three", null, true] }
        })
    }

    #[test]
    fn test_json_round_trip() {
        let bytes = Json::to_bytes(&sample()).unwrap();
        assert_eq!(Json::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_yaml_round_trip() {
        let bytes = Yaml::to_bytes(&sample()).unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains("structId"));
        assert_eq!(Yaml::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_msgpack_round_trip_is_compact() {
        let bytes = MessagePack::to_bytes(&sample()).unwrap();
        let json = Json::to_bytes(&sample()).unwrap();
        assert!(bytes.len() < json.len());
        assert_eq!(MessagePack::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        assert!(Json::from_bytes(b"{not json").is_err());
        assert!(MessagePack::from_bytes(&[0xc1]).is_err());
    }
}
