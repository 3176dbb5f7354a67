// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Deterministic fixture generation.
//!
//! Samples are built from structural schema descriptors and generated once per
//! run. Every codec pipeline reads the same `Arc<[Sample]>`; nothing mutates it.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};

use crate::error::HardValidationError;

/// Bound for generated integers and floats, in both directions.
const NUMERIC_BOUND: i64 = 9_223_372_036;

/// Printable ASCII range used for generated strings (`(`..`~`).
const CHAR_RANGE: std::ops::Range<u8> = 40..126;

/// Struct ids the generator knows how to build.
pub const KNOWN_STRUCTS: [u32; 3] = [1, 2, 3];

/// Kind of a single schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Constant struct identifier.
    Id(u32),
    Int,
    Float,
    /// ASCII string of the given length.
    Str(usize),
    IntArray(usize),
    FloatArray(usize),
    /// Nested record of another struct.
    Dict(u32),
}

/// Structural schema descriptor for one record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSchema {
    pub id: u32,
    pub fields: Vec<(&'static str, FieldKind)>,
}

impl StructSchema {
    /// Look up a built-in schema.
    pub fn builtin(id: u32) -> Option<Self> {
        let fields = match id {
            1 => vec![
                ("structId", FieldKind::Id(1)),
                ("integer", FieldKind::Int),
                ("float", FieldKind::Float),
                ("stringData", FieldKind::Str(100)),
            ],
            2 => {
                let mut fields = Self::builtin(1)?.fields;
                fields[0].1 = FieldKind::Id(2);
                fields.extend([
                    ("extendedStringData", FieldKind::Str(2500)),
                    ("arrayInt", FieldKind::IntArray(200)),
                    ("arrayFloat", FieldKind::FloatArray(200)),
                ]);
                fields
            }
            3 => {
                let mut fields = Self::builtin(2)?.fields;
                fields[0].1 = FieldKind::Id(3);
                fields.extend([("dict1", FieldKind::Dict(1)), ("dict2", FieldKind::Dict(2))]);
                fields
            }
            _ => return None,
        };
        Some(Self { id, fields })
    }
}

/// One immutable fixture value, tagged with its index and schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub index: usize,
    pub struct_id: u32,
    pub value: Value,
}

impl Sample {
    pub fn new(index: usize, struct_id: u32, value: Value) -> Self {
        Self {
            index,
            struct_id,
            value,
        }
    }
}

/// Seeded generator for sample sets.
pub struct SampleGenerator {
    rng: ChaCha8Rng,
}

impl SampleGenerator {
    /// Deterministic generator; the same seed yields the same samples.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Generate one sample per struct id, indexed in order.
    pub fn generate(&mut self, struct_ids: &[u32]) -> Result<Vec<Sample>, HardValidationError> {
        struct_ids
            .iter()
            .enumerate()
            .map(|(index, &struct_id)| {
                let value = self.generate_struct(struct_id)?;
                Ok(Sample::new(index, struct_id, value))
            })
            .collect()
    }

    /// Generate the samples and wrap them for sharing across pipelines.
    pub fn generate_shared(
        &mut self,
        struct_ids: &[u32],
    ) -> Result<Arc<[Sample]>, HardValidationError> {
        Ok(self.generate(struct_ids)?.into())
    }

    fn generate_struct(&mut self, struct_id: u32) -> Result<Value, HardValidationError> {
        let schema = StructSchema::builtin(struct_id)
            .ok_or(HardValidationError::UnknownStruct { struct_id })?;

        let mut record = Map::with_capacity(schema.fields.len());
        for (name, kind) in schema.fields {
            let value = match kind {
                FieldKind::Id(id) => Value::from(id),
                FieldKind::Int => Value::from(self.int()),
                FieldKind::Float => Value::from(self.float()),
                FieldKind::Str(len) => Value::from(self.string(len)),
                FieldKind::IntArray(len) => (0..len).map(|_| Value::from(self.int())).collect(),
                FieldKind::FloatArray(len) => {
                    (0..len).map(|_| Value::from(self.float())).collect()
                }
                FieldKind::Dict(nested) => self.generate_struct(nested)?,
            };
            record.insert(name.to_string(), value);
        }

        Ok(Value::Object(record))
    }

    fn int(&mut self) -> i64 {
        self.rng.gen_range(-NUMERIC_BOUND..NUMERIC_BOUND)
    }

    fn float(&mut self) -> f64 {
        self.rng
            .gen_range(-(NUMERIC_BOUND as f64)..NUMERIC_BOUND as f64)
    }

    fn string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| self.rng.gen_range(CHAR_RANGE) as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_extend_each_other() {
        let s1 = StructSchema::builtin(1).unwrap();
        let s2 = StructSchema::builtin(2).unwrap();
        let s3 = StructSchema::builtin(3).unwrap();

        assert_eq!(s1.fields.len(), 4);
        assert_eq!(s2.fields.len(), 7);
        assert_eq!(s3.fields.len(), 9);
        assert_eq!(s3.fields[0], ("structId", FieldKind::Id(3)));
        assert!(StructSchema::builtin(4).is_none());
    }

    #[test]
    fn test_generated_shape() {
        let samples = SampleGenerator::new(7).generate(&[1, 2, 3]).unwrap();
        assert_eq!(samples.len(), 3);

        let s2 = &samples[1];
        assert_eq!(s2.index, 1);
        assert_eq!(s2.struct_id, 2);
        assert_eq!(s2.value["structId"], 2);
        assert_eq!(s2.value["stringData"].as_str().unwrap().len(), 100);
        assert_eq!(s2.value["arrayInt"].as_array().unwrap().len(), 200);
        assert!(s2.value["float"].is_f64());

        let s3 = &samples[2];
        assert_eq!(s3.value["dict1"]["structId"], 1);
        assert_eq!(s3.value["dict2"]["arrayFloat"].as_array().unwrap().len(), 200);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = SampleGenerator::new(42).generate(&[3]).unwrap();
        let b = SampleGenerator::new(42).generate(&[3]).unwrap();
        let c = SampleGenerator::new(43).generate(&[3]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_values_within_bounds() {
        let samples = SampleGenerator::new(1).generate(&[2]).unwrap();
        let value = &samples[0].value;

        for n in value["arrayInt"].as_array().unwrap() {
            let n = n.as_i64().unwrap();
            assert!((-NUMERIC_BOUND..NUMERIC_BOUND).contains(&n));
        }
        for c in value["extendedStringData"].as_str().unwrap().bytes() {
            assert!(CHAR_RANGE.contains(&c));
        }
    }

    #[test]
    fn test_unknown_struct_rejected() {
        let err = SampleGenerator::new(1).generate(&[1, 9]).unwrap_err();
        assert!(matches!(err, HardValidationError::UnknownStruct { struct_id: 9 }));
    }
}
