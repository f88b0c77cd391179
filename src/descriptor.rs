//! Structured-type descriptions used to build schemas.
//!
//! A [`TypeDescriptor`] is the static shape of a record type: the ordered
//! field list, per-field tag strings, and embedded-field markers that a
//! reflection-based implementation would discover at runtime. Descriptors
//! are built with explicit constructor calls and passed to
//! [`Schema::of`](crate::Schema::of).

/// The shape of a value, as seen by the schema builder
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Bytes,
    /// A fixed-length byte array; only the 16-byte form has a default
    /// mapping (UUID)
    FixedBytes(usize),
    /// A nullable indirection; maps to an optional node
    Pointer(Box<TypeDescriptor>),
    /// A variable-length sequence; maps to a repeated node
    Sequence(Box<TypeDescriptor>),
    Struct(StructDescriptor),
}

impl TypeDescriptor {
    pub fn pointer_to(inner: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Pointer(Box::new(inner))
    }

    pub fn sequence_of(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Sequence(Box::new(element))
    }

    /// Human-readable type name used in construction error messages
    pub fn type_name(&self) -> String {
        match self {
            TypeDescriptor::Boolean => "bool".to_string(),
            TypeDescriptor::Int8 => "int8".to_string(),
            TypeDescriptor::Int16 => "int16".to_string(),
            TypeDescriptor::Int32 => "int32".to_string(),
            TypeDescriptor::Int64 => "int64".to_string(),
            TypeDescriptor::UInt8 => "uint8".to_string(),
            TypeDescriptor::UInt16 => "uint16".to_string(),
            TypeDescriptor::UInt32 => "uint32".to_string(),
            TypeDescriptor::UInt64 => "uint64".to_string(),
            TypeDescriptor::Float32 => "float32".to_string(),
            TypeDescriptor::Float64 => "float64".to_string(),
            TypeDescriptor::String => "string".to_string(),
            TypeDescriptor::Bytes => "bytes".to_string(),
            TypeDescriptor::FixedBytes(len) => format!("[{}]byte", len),
            TypeDescriptor::Pointer(inner) => format!("*{}", inner.type_name()),
            TypeDescriptor::Sequence(element) => format!("[]{}", element.type_name()),
            TypeDescriptor::Struct(st) => st.name.clone(),
        }
    }

    /// Integer kinds eligible for delta encoding and decimal annotations
    pub(crate) fn is_integer_kind(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Int32
                | TypeDescriptor::Int64
                | TypeDescriptor::UInt32
                | TypeDescriptor::UInt64
        )
    }
}

/// An ordered list of named fields describing a record type
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
    pub fn new<S: Into<String>>(name: S, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// One field of a [`StructDescriptor`]: the source field name, its type,
/// an optional tag string, and whether the field is embedded (its own
/// fields are flattened into the parent)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub tag: Option<String>,
    pub embedded: bool,
}

impl FieldDescriptor {
    pub fn new<S: Into<String>>(name: S, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            embedded: false,
        }
    }

    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn embedded<S: Into<String>>(name: S, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            embedded: true,
        }
    }
}
