use bytes::Bytes;
use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

/// A dynamically typed value shredded against a [`Schema`](crate::Schema).
///
/// Nested structures are `Record` values keyed by the source field names
/// (in declaration order), sequences are `List` values, and a nil pointer
/// or nil sequence is `Null`. Scalars carry their own physical kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParquetValue {
    // Numeric types
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(ordered_float::OrderedFloat<f32>),
    Float64(ordered_float::OrderedFloat<f64>),

    // Basic types
    Boolean(bool),
    String(Arc<str>),
    Bytes(Bytes),
    Uuid(Uuid),

    // Complex types
    List(Vec<ParquetValue>),
    Record(IndexMap<Arc<str>, ParquetValue>),

    // Null value
    Null,
}

impl ParquetValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParquetValue::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParquetValue::Int8(_) => "Int8",
            ParquetValue::Int16(_) => "Int16",
            ParquetValue::Int32(_) => "Int32",
            ParquetValue::Int64(_) => "Int64",
            ParquetValue::UInt8(_) => "UInt8",
            ParquetValue::UInt16(_) => "UInt16",
            ParquetValue::UInt32(_) => "UInt32",
            ParquetValue::UInt64(_) => "UInt64",
            ParquetValue::Float32(_) => "Float32",
            ParquetValue::Float64(_) => "Float64",
            ParquetValue::Boolean(_) => "Boolean",
            ParquetValue::String(_) => "String",
            ParquetValue::Bytes(_) => "Bytes",
            ParquetValue::Uuid(_) => "Uuid",
            ParquetValue::List(_) => "List",
            ParquetValue::Record(_) => "Record",
            ParquetValue::Null => "Null",
        }
    }

    /// Check whether the value is the zero value of its kind.
    ///
    /// Optional fields holding their zero value shred as null. A `List` is
    /// never zero: a nil sequence is modelled as `Null`, so an empty `List`
    /// means present-but-empty. A `Record` is zero when every field is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            ParquetValue::Int8(v) => *v == 0,
            ParquetValue::Int16(v) => *v == 0,
            ParquetValue::Int32(v) => *v == 0,
            ParquetValue::Int64(v) => *v == 0,
            ParquetValue::UInt8(v) => *v == 0,
            ParquetValue::UInt16(v) => *v == 0,
            ParquetValue::UInt32(v) => *v == 0,
            ParquetValue::UInt64(v) => *v == 0,
            ParquetValue::Float32(v) => v.0 == 0.0,
            ParquetValue::Float64(v) => v.0 == 0.0,
            ParquetValue::Boolean(v) => !v,
            ParquetValue::String(s) => s.is_empty(),
            ParquetValue::Bytes(b) => b.is_empty(),
            ParquetValue::Uuid(u) => u.is_nil(),
            ParquetValue::List(_) => false,
            ParquetValue::Record(fields) => fields.values().all(|v| v.is_zero()),
            ParquetValue::Null => true,
        }
    }
}

/// A leaf value paired with its repetition and definition levels, as
/// delivered to a [`Traversal`](crate::Traversal) sink.
///
/// An absent value carries [`ParquetValue::Null`] plus the level pair that
/// records where in the nesting the absence occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    value: ParquetValue,
    repetition_level: i16,
    definition_level: i16,
}

impl ColumnValue {
    pub fn new(value: ParquetValue, repetition_level: i16, definition_level: i16) -> Self {
        Self {
            value,
            repetition_level,
            definition_level,
        }
    }

    /// Create a null column value recording an absence at the given levels
    pub fn null(repetition_level: i16, definition_level: i16) -> Self {
        Self::new(ParquetValue::Null, repetition_level, definition_level)
    }

    pub fn value(&self) -> &ParquetValue {
        &self.value
    }

    pub fn into_value(self) -> ParquetValue {
        self.value
    }

    pub fn repetition_level(&self) -> i16 {
        self.repetition_level
    }

    pub fn definition_level(&self) -> i16 {
        self.definition_level
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}
