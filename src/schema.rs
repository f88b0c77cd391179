//! Schema construction from structured-type descriptions.
//!
//! A [`Schema`] is built once from a [`TypeDescriptor`]: struct fields are
//! flattened depth-first (embedded fields contribute their own fields
//! transitively), tag strings are applied, the flattened fields are sorted
//! by resolved column name, and a traversal plan is compiled. The schema is
//! immutable afterwards and safe to share across threads.

use crate::descriptor::{FieldDescriptor, StructDescriptor, TypeDescriptor};
use crate::error::{ParquetError, Result};
use crate::node::{
    Compression, Encoding, FieldPath, GroupField, GroupNode, LogicalType, Node, PathSegment,
    PhysicalType,
};
use crate::tag::{parse_tag, ParsedTag, TagOption};
use crate::traverse::{compile, execute, Levels, TraverseStep, Traversal};
use crate::value::ParquetValue;
use std::fmt;
use std::sync::Arc;

/// A named root node plus its pre-compiled traversal plan
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    root: Node,
    plan: TraverseStep,
    num_columns: usize,
}

impl Schema {
    /// Construct a schema from a struct (or pointer-to-struct) descriptor,
    /// named after the struct
    pub fn of(model: &TypeDescriptor) -> Result<Schema> {
        let st = struct_descriptor_of(model)?;
        Schema::named(st.name.clone(), model)
    }

    /// Like [`Schema::of`] with a caller-chosen schema name
    pub fn named<S: Into<String>>(name: S, model: &TypeDescriptor) -> Result<Schema> {
        let st = struct_descriptor_of(model)?;
        let root = struct_node_of(st)?;
        let (num_columns, plan) = compile(&root)?;
        Ok(Schema {
            name: name.into(),
            root,
            plan,
            num_columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root node; always required, and a group
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of leaf columns in the compiled plan
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn is_optional(&self) -> bool {
        self.root.is_optional()
    }

    pub fn is_repeated(&self) -> bool {
        self.root.is_repeated()
    }

    pub fn is_required(&self) -> bool {
        self.root.is_required()
    }

    pub fn num_children(&self) -> usize {
        self.root.num_children()
    }

    pub fn child_names(&self) -> &[Arc<str>] {
        self.root.child_names()
    }

    pub fn child_by_name(&self, name: &str) -> Option<&Node> {
        self.root.child_by_name(name)
    }

    pub fn child_by_index(&self, index: usize) -> Option<&Node> {
        self.root.child_by_index(index)
    }

    pub fn encodings(&self) -> Vec<Encoding> {
        self.root.encodings()
    }

    pub fn compressions(&self) -> Vec<Compression> {
        self.root.compressions()
    }

    /// Shred a value into `(column index, value, levels)` entries delivered
    /// to the sink in plan-fixed column order.
    ///
    /// A top-level `Null` shreds every column as absent. The value's shape
    /// must structurally match the schema; a shape mismatch panics, since
    /// it indicates a programming error rather than a data error. The
    /// first sink error aborts the traversal and is returned verbatim.
    pub fn traverse<T>(&self, value: &ParquetValue, traversal: &mut T) -> Result<()>
    where
        T: Traversal + ?Sized,
    {
        let value = if value.is_null() { None } else { Some(value) };
        execute(&self.plan, Levels::default(), value, traversal)
    }
}

fn struct_descriptor_of(model: &TypeDescriptor) -> Result<&StructDescriptor> {
    match model {
        TypeDescriptor::Struct(st) => Ok(st),
        TypeDescriptor::Pointer(inner) => match inner.as_ref() {
            TypeDescriptor::Struct(st) => Ok(st),
            _ => Err(ParquetError::schema(format!(
                "cannot construct parquet schema from value of type {}",
                model.type_name()
            ))),
        },
        _ => Err(ParquetError::schema(format!(
            "cannot construct parquet schema from value of type {}",
            model.type_name()
        ))),
    }
}

/// A flattened field: resolved column name, the source descriptor, its
/// parsed tag, and the access path from the owning record
struct FlatField<'a> {
    name: Arc<str>,
    field: &'a FieldDescriptor,
    tag: Option<ParsedTag>,
    path: Vec<PathSegment>,
}

fn struct_node_of(st: &StructDescriptor) -> Result<Node> {
    let mut flat = Vec::new();
    flatten_fields(st, &[], &mut flat)?;

    // Order columns by resolved name before assigning column indexes.
    flat.sort_by(|a, b| a.name.cmp(&b.name));

    for pair in flat.windows(2) {
        if pair[0].name == pair[1].name {
            return Err(ParquetError::schema(format!(
                "duplicate column name {:?} after flattening struct fields of {}",
                pair[0].name, st.name
            )));
        }
    }

    let mut names = Vec::with_capacity(flat.len());
    let mut fields = Vec::with_capacity(flat.len());
    for flat_field in flat {
        let node = make_field_node(flat_field.field, flat_field.tag.as_ref())?;
        names.push(Arc::clone(&flat_field.name));
        fields.push(GroupField {
            name: flat_field.name,
            node,
            path: FieldPath(flat_field.path),
        });
    }

    Ok(Node::Group(GroupNode {
        logical_type: None,
        names,
        fields,
    }))
}

fn flatten_fields<'a>(
    st: &'a StructDescriptor,
    prefix: &[PathSegment],
    out: &mut Vec<FlatField<'a>>,
) -> Result<()> {
    for (index, field) in st.fields.iter().enumerate() {
        let mut path = prefix.to_vec();
        path.push(PathSegment {
            index,
            name: Arc::from(field.name.as_str()),
        });

        if field.embedded {
            match &field.ty {
                TypeDescriptor::Struct(inner) => flatten_fields(inner, &path, out)?,
                _ => {
                    return Err(ParquetError::schema(format!(
                        "embedded field is not a struct: {}",
                        field_display(field)
                    )))
                }
            }
            continue;
        }

        let tag = match &field.tag {
            Some(tag) => Some(parse_tag(tag).map_err(|e| tag_error(field, e))?),
            None => None,
        };
        let name = match tag.as_ref().and_then(|t| t.name_override.as_deref()) {
            Some(name) => Arc::from(name),
            None => Arc::from(field.name.as_str()),
        };

        out.push(FlatField {
            name,
            field,
            tag,
            path,
        });
    }
    Ok(())
}

fn field_display(field: &FieldDescriptor) -> String {
    match &field.tag {
        Some(tag) => format!("{} {} `{}`", field.name, field.ty.type_name(), tag),
        None => format!("{} {}", field.name, field.ty.type_name()),
    }
}

fn tag_error(field: &FieldDescriptor, err: ParquetError) -> ParquetError {
    ParquetError::schema(format!("{}: {}", field_display(field), err))
}

fn invalid_tag(field: &FieldDescriptor, option: &str) -> ParquetError {
    ParquetError::schema(format!(
        "struct field has invalid '{}' parquet tag: {}",
        option,
        field_display(field)
    ))
}

fn invalid_field(field: &FieldDescriptor, msg: &str) -> ParquetError {
    ParquetError::schema(format!("{}: {}", msg, field_display(field)))
}

fn make_field_node(field: &FieldDescriptor, tag: Option<&ParsedTag>) -> Result<Node> {
    let mut explicit: Option<Node> = None;
    let mut optional = false;
    let mut list = false;
    let mut encodings: Vec<Encoding> = Vec::new();
    let mut codecs: Vec<Compression> = Vec::new();

    let mut set_node = |current: &mut Option<Node>, node: Node| -> Result<()> {
        if current.is_some() {
            return Err(invalid_field(
                field,
                "struct field has multiple logical parquet types declared",
            ));
        }
        *current = Some(node);
        Ok(())
    };

    if let Some(tag) = tag {
        for option in &tag.options {
            match option {
                TagOption::Optional => {
                    if optional {
                        return Err(invalid_field(
                            field,
                            "struct field has multiple declarations of the optional tag",
                        ));
                    }
                    optional = true;
                }

                TagOption::Compression(codec) => {
                    if codecs.contains(codec) {
                        return Err(invalid_field(
                            field,
                            "struct field has compression codecs declared multiple times",
                        ));
                    }
                    codecs.push(*codec);
                }

                TagOption::Encoding(encoding) => {
                    if *encoding == Encoding::DeltaBinaryPacked && !field.ty.is_integer_kind() {
                        return Err(invalid_tag(field, "delta"));
                    }
                    if encodings.contains(encoding) {
                        return Err(invalid_field(
                            field,
                            "struct field has encoding declared multiple times",
                        ));
                    }
                    encodings.push(*encoding);
                }

                TagOption::List => {
                    if list {
                        return Err(invalid_field(
                            field,
                            "struct field has multiple declarations of the list tag",
                        ));
                    }
                    match &field.ty {
                        TypeDescriptor::Sequence(element) => {
                            let element = node_of(element)?;
                            set_node(&mut explicit, element)?;
                            list = true;
                        }
                        _ => return Err(invalid_tag(field, "list")),
                    }
                }

                TagOption::Enum => match &field.ty {
                    TypeDescriptor::String => set_node(&mut explicit, Node::enumeration())?,
                    _ => return Err(invalid_tag(field, "enum")),
                },

                TagOption::Uuid => match &field.ty {
                    TypeDescriptor::String | TypeDescriptor::FixedBytes(16) => {
                        set_node(&mut explicit, Node::uuid())?
                    }
                    _ => return Err(invalid_tag(field, "uuid")),
                },

                TagOption::Decimal { scale, precision } => {
                    let physical = match &field.ty {
                        TypeDescriptor::Int32 => PhysicalType::Int32,
                        TypeDescriptor::Int64 => PhysicalType::Int64,
                        _ => return Err(invalid_tag(field, "decimal")),
                    };
                    set_node(&mut explicit, Node::decimal(*scale, *precision, physical)?)?;
                }

                TagOption::Timestamp(unit) => match &field.ty {
                    TypeDescriptor::Int64 => set_node(&mut explicit, Node::timestamp(*unit))?,
                    _ => return Err(invalid_tag(field, "timestamp")),
                },
            }
        }
    }

    let mut node = match explicit {
        Some(node) => node,
        None => node_of(&field.ty)?,
    };

    // Decoration order is fixed: codecs and encodings innermost, then the
    // list wrap, optionality outermost.
    node = Node::compressed(node, codecs).map_err(|e| tag_error(field, e))?;
    node = Node::encoded(node, encodings).map_err(|e| tag_error(field, e))?;

    if list {
        node = Node::list_of(node)?;
    }

    if optional && !node.is_optional() {
        node = Node::optional(node)?;
    }

    Ok(node)
}

fn node_of(ty: &TypeDescriptor) -> Result<Node> {
    match ty {
        TypeDescriptor::Boolean => Ok(Node::boolean()),
        TypeDescriptor::Int8 => Ok(Node::int(8)),
        TypeDescriptor::Int16 => Ok(Node::int(16)),
        TypeDescriptor::Int32 => Ok(Node::int(32)),
        TypeDescriptor::Int64 => Ok(Node::int(64)),
        TypeDescriptor::UInt8 => Ok(Node::uint(8)),
        TypeDescriptor::UInt16 => Ok(Node::uint(16)),
        TypeDescriptor::UInt32 => Ok(Node::uint(32)),
        TypeDescriptor::UInt64 => Ok(Node::uint(64)),
        TypeDescriptor::Float32 => Ok(Node::float()),
        TypeDescriptor::Float64 => Ok(Node::double()),
        TypeDescriptor::String => Ok(Node::string()),
        TypeDescriptor::Bytes => Ok(Node::leaf(PhysicalType::ByteArray)),
        TypeDescriptor::FixedBytes(16) => Ok(Node::uuid()),
        TypeDescriptor::Pointer(inner) => Node::optional(node_of(inner)?),
        TypeDescriptor::Sequence(element) => Ok(Node::repeated_layer(node_of(element)?)),
        TypeDescriptor::Struct(st) => struct_node_of(st),
        other => Err(ParquetError::schema(format!(
            "cannot create parquet node from value of type {}",
            other.type_name()
        ))),
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name)?;
        if let Some(fields) = self.root.group_fields() {
            for field in fields {
                fmt_node(f, &field.name, &field.node, 1)?;
            }
        }
        write!(f, "}}")
    }
}

fn fmt_node(f: &mut fmt::Formatter<'_>, name: &str, node: &Node, indent: usize) -> fmt::Result {
    let repetition = if node.is_optional() {
        "optional"
    } else if node.is_repeated() {
        "repeated"
    } else {
        "required"
    };

    for _ in 0..indent {
        f.write_str("\t")?;
    }

    match node.group_fields() {
        Some(fields) => {
            write!(f, "{} group {}", repetition, name)?;
            fmt_annotation(f, node.logical_type())?;
            writeln!(f, " {{")?;
            for field in fields {
                fmt_node(f, &field.name, &field.node, indent + 1)?;
            }
            for _ in 0..indent {
                f.write_str("\t")?;
            }
            writeln!(f, "}}")
        }
        None => {
            match node.physical_type() {
                Some(PhysicalType::FixedLenByteArray(len)) => {
                    write!(f, "{} fixed_len_byte_array({}) {}", repetition, len, name)?
                }
                Some(physical) => {
                    write!(f, "{} {} {}", repetition, physical.type_name(), name)?
                }
                None => write!(f, "{} <unknown> {}", repetition, name)?,
            }
            fmt_annotation(f, node.logical_type())?;
            writeln!(f, ";")
        }
    }
}

fn fmt_annotation(f: &mut fmt::Formatter<'_>, logical: Option<LogicalType>) -> fmt::Result {
    let logical = match logical {
        Some(logical) => logical,
        None => return Ok(()),
    };
    match logical {
        LogicalType::String => write!(f, " (STRING)"),
        LogicalType::Enum => write!(f, " (ENUM)"),
        LogicalType::Uuid => write!(f, " (UUID)"),
        LogicalType::Json => write!(f, " (JSON)"),
        LogicalType::Bson => write!(f, " (BSON)"),
        LogicalType::Date => write!(f, " (DATE)"),
        LogicalType::Time(unit) => write!(f, " (TIME({}))", unit.unit_name()),
        LogicalType::Timestamp(unit) => write!(f, " (TIMESTAMP({}))", unit.unit_name()),
        LogicalType::Integer { bit_width, signed } => {
            write!(f, " (INT({},{}))", bit_width, signed)
        }
        LogicalType::Decimal { scale, precision } => {
            write!(f, " (DECIMAL({},{}))", precision, scale)
        }
        LogicalType::List => write!(f, " (LIST)"),
    }
}
