use crate::error::{ParquetError, Result};
use std::sync::Arc;

/// Physical column types of the storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(usize),
}

impl PhysicalType {
    /// Get the schema-text name of the physical type
    pub fn type_name(&self) -> &'static str {
        match self {
            PhysicalType::Boolean => "boolean",
            PhysicalType::Int32 => "int32",
            PhysicalType::Int64 => "int64",
            PhysicalType::Float => "float",
            PhysicalType::Double => "double",
            PhysicalType::ByteArray => "binary",
            PhysicalType::FixedLenByteArray(_) => "fixed_len_byte_array",
        }
    }

    fn is_integer(&self) -> bool {
        matches!(self, PhysicalType::Int32 | PhysicalType::Int64)
    }
}

/// Time/timestamp resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    pub fn unit_name(&self) -> &'static str {
        match self {
            TimeUnit::Millis => "MILLIS",
            TimeUnit::Micros => "MICROS",
            TimeUnit::Nanos => "NANOS",
        }
    }
}

/// Semantic annotation on a physical type; interpretation only, the
/// physical representation is unchanged. At most one per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    String,
    Enum,
    Uuid,
    Json,
    Bson,
    Date,
    Time(TimeUnit),
    Timestamp(TimeUnit),
    Integer { bit_width: u8, signed: bool },
    Decimal { scale: i32, precision: i32 },
    List,
}

/// Column encoding hints consumed by physical-encoding collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    RleDictionary,
    DeltaBinaryPacked,
}

impl Encoding {
    pub fn encoding_name(&self) -> &'static str {
        match self {
            Encoding::Plain => "PLAIN",
            Encoding::RleDictionary => "RLE_DICTIONARY",
            Encoding::DeltaBinaryPacked => "DELTA_BINARY_PACKED",
        }
    }
}

/// Compression codec hints consumed by physical-encoding collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Snappy,
    Gzip,
    Brotli,
    Lz4Raw,
    Zstd,
}

impl Compression {
    pub fn codec_name(&self) -> &'static str {
        match self {
            Compression::Snappy => "SNAPPY",
            Compression::Gzip => "GZIP",
            Compression::Brotli => "BROTLI",
            Compression::Lz4Raw => "LZ4_RAW",
            Compression::Zstd => "ZSTD",
        }
    }
}

/// A node in the schema tree.
///
/// Leaves carry a physical type plus an optional logical annotation, groups
/// carry an ordered set of named children, and wrappers decorate an inner
/// node with cardinality or encoding/compression hints. Exactly one of
/// [`is_optional`](Node::is_optional), [`is_repeated`](Node::is_repeated),
/// [`is_required`](Node::is_required) holds for every node; codec wrappers
/// are transparent to cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(LeafNode),
    Group(GroupNode),
    Wrapped(Box<WrappedNode>),
}

/// A terminal scalar column
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub physical_type: PhysicalType,
    pub logical_type: Option<LogicalType>,
}

/// An ordered set of named child nodes, sorted by name.
///
/// Each field pairs its child node with the access path used to extract the
/// field's value from a record of the owning type.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub(crate) logical_type: Option<LogicalType>,
    pub(crate) names: Vec<Arc<str>>,
    pub(crate) fields: Vec<GroupField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupField {
    pub(crate) name: Arc<str>,
    pub(crate) node: Node,
    pub(crate) path: FieldPath,
}

impl GroupField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

/// The field-access path from a record to one of its (possibly embedded)
/// fields: one segment per descent step, each carrying the field position
/// in declaration order and the source field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldPath(pub(crate) Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub(crate) index: usize,
    pub(crate) name: Arc<str>,
}

/// A decoration over an inner node
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedNode {
    pub(crate) inner: Node,
    pub(crate) decoration: Decoration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    Optional,
    Repeated,
    Encoded(Vec<Encoding>),
    Compressed(Vec<Compression>),
}

impl GroupNode {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|n| n.as_ref().cmp(name))
            .ok()
    }
}

impl Node {
    /// Create a leaf node of the given physical type
    pub fn leaf(physical_type: PhysicalType) -> Node {
        Node::Leaf(LeafNode {
            physical_type,
            logical_type: None,
        })
    }

    fn annotated(physical_type: PhysicalType, logical_type: LogicalType) -> Node {
        Node::Leaf(LeafNode {
            physical_type,
            logical_type: Some(logical_type),
        })
    }

    pub fn boolean() -> Node {
        Node::leaf(PhysicalType::Boolean)
    }

    /// Signed integer leaf; widths up to 32 bits share the int32 physical
    /// type, 64 bits use int64
    pub fn int(bit_width: u8) -> Node {
        let physical = if bit_width > 32 {
            PhysicalType::Int64
        } else {
            PhysicalType::Int32
        };
        Node::annotated(
            physical,
            LogicalType::Integer {
                bit_width,
                signed: true,
            },
        )
    }

    /// Unsigned integer leaf
    pub fn uint(bit_width: u8) -> Node {
        let physical = if bit_width > 32 {
            PhysicalType::Int64
        } else {
            PhysicalType::Int32
        };
        Node::annotated(
            physical,
            LogicalType::Integer {
                bit_width,
                signed: false,
            },
        )
    }

    pub fn float() -> Node {
        Node::leaf(PhysicalType::Float)
    }

    pub fn double() -> Node {
        Node::leaf(PhysicalType::Double)
    }

    pub fn string() -> Node {
        Node::annotated(PhysicalType::ByteArray, LogicalType::String)
    }

    pub fn enumeration() -> Node {
        Node::annotated(PhysicalType::ByteArray, LogicalType::Enum)
    }

    pub fn uuid() -> Node {
        Node::annotated(PhysicalType::FixedLenByteArray(16), LogicalType::Uuid)
    }

    pub fn json() -> Node {
        Node::annotated(PhysicalType::ByteArray, LogicalType::Json)
    }

    pub fn bson() -> Node {
        Node::annotated(PhysicalType::ByteArray, LogicalType::Bson)
    }

    pub fn date() -> Node {
        Node::annotated(PhysicalType::Int32, LogicalType::Date)
    }

    pub fn time(unit: TimeUnit) -> Node {
        let physical = match unit {
            TimeUnit::Millis => PhysicalType::Int32,
            TimeUnit::Micros | TimeUnit::Nanos => PhysicalType::Int64,
        };
        Node::annotated(physical, LogicalType::Time(unit))
    }

    pub fn timestamp(unit: TimeUnit) -> Node {
        Node::annotated(PhysicalType::Int64, LogicalType::Timestamp(unit))
    }

    /// Decimal leaf over an int32 or int64 physical type
    pub fn decimal(scale: i32, precision: i32, physical_type: PhysicalType) -> Result<Node> {
        if !physical_type.is_integer() {
            return Err(ParquetError::schema(format!(
                "decimal node requires an int32 or int64 physical type, got {}",
                physical_type.type_name()
            )));
        }
        Ok(Node::annotated(
            physical_type,
            LogicalType::Decimal { scale, precision },
        ))
    }

    /// Wrap a node as optional. Wrapping an already-optional node is a
    /// caller error.
    pub fn optional(node: Node) -> Result<Node> {
        if node.is_optional() {
            return Err(ParquetError::schema(
                "node is already optional, cannot wrap it as optional again",
            ));
        }
        Ok(Node::Wrapped(Box::new(WrappedNode {
            inner: node,
            decoration: Decoration::Optional,
        })))
    }

    /// Wrap a node as repeated. Wrapping an already-repeated node is a
    /// caller error.
    pub fn repeated(node: Node) -> Result<Node> {
        if node.is_repeated() {
            return Err(ParquetError::schema(
                "node is already repeated, cannot wrap it as repeated again",
            ));
        }
        Ok(Node::repeated_layer(node))
    }

    /// Unconditional repeated wrap, used when deriving nodes from nested
    /// sequence types where each layer is its own repetition level.
    pub(crate) fn repeated_layer(node: Node) -> Node {
        Node::Wrapped(Box::new(WrappedNode {
            inner: node,
            decoration: Decoration::Repeated,
        }))
    }

    /// Attach encoding hints to a node. Passing no encodings returns the
    /// node unchanged; declaring the same encoding twice is an error.
    pub fn encoded(node: Node, encodings: Vec<Encoding>) -> Result<Node> {
        if encodings.is_empty() {
            return Ok(node);
        }
        let mut declared = node.encodings();
        for enc in &encodings {
            if declared.contains(enc) {
                return Err(ParquetError::schema(format!(
                    "encoding {} declared multiple times on the same node",
                    enc.encoding_name()
                )));
            }
            declared.push(*enc);
        }
        Ok(Node::Wrapped(Box::new(WrappedNode {
            inner: node,
            decoration: Decoration::Encoded(encodings),
        })))
    }

    /// Attach compression codec hints to a node. Passing no codecs returns
    /// the node unchanged; declaring the same codec twice is an error.
    pub fn compressed(node: Node, codecs: Vec<Compression>) -> Result<Node> {
        if codecs.is_empty() {
            return Ok(node);
        }
        let mut declared = node.compressions();
        for codec in &codecs {
            if declared.contains(codec) {
                return Err(ParquetError::schema(format!(
                    "compression codec {} declared multiple times on the same node",
                    codec.codec_name()
                )));
            }
            declared.push(*codec);
        }
        Ok(Node::Wrapped(Box::new(WrappedNode {
            inner: node,
            decoration: Decoration::Compressed(codecs),
        })))
    }

    /// Build a LIST-shaped group over an element node: a group annotated
    /// with the List logical type holding a repeated `list` group with a
    /// single `element` child. Traversal bypasses this shape and walks the
    /// element directly.
    pub fn list_of(element: Node) -> Result<Node> {
        let element_group = Node::Group(GroupNode {
            logical_type: None,
            names: vec![Arc::from("element")],
            fields: vec![GroupField {
                name: Arc::from("element"),
                node: element,
                path: FieldPath::default(),
            }],
        });
        let repeated = Node::repeated(element_group)?;
        Ok(Node::Group(GroupNode {
            logical_type: Some(LogicalType::List),
            names: vec![Arc::from("list")],
            fields: vec![GroupField {
                name: Arc::from("list"),
                node: repeated,
                path: FieldPath::default(),
            }],
        }))
    }

    /// True if the outermost cardinality of this node is optional
    pub fn is_optional(&self) -> bool {
        match self {
            Node::Wrapped(w) => match &w.decoration {
                Decoration::Optional => true,
                Decoration::Repeated => false,
                _ => w.inner.is_optional(),
            },
            _ => false,
        }
    }

    /// True if the outermost cardinality of this node is repeated
    pub fn is_repeated(&self) -> bool {
        match self {
            Node::Wrapped(w) => match &w.decoration {
                Decoration::Repeated => true,
                Decoration::Optional => false,
                _ => w.inner.is_repeated(),
            },
            _ => false,
        }
    }

    /// True if the node is neither optional nor repeated
    pub fn is_required(&self) -> bool {
        !self.is_optional() && !self.is_repeated()
    }

    /// True if the node terminates in a scalar column
    pub fn is_leaf(&self) -> bool {
        match self {
            Node::Leaf(_) => true,
            Node::Group(_) => false,
            Node::Wrapped(w) => w.inner.is_leaf(),
        }
    }

    /// Physical type of the underlying leaf, `None` for groups
    pub fn physical_type(&self) -> Option<PhysicalType> {
        match self {
            Node::Leaf(leaf) => Some(leaf.physical_type),
            Node::Group(_) => None,
            Node::Wrapped(w) => w.inner.physical_type(),
        }
    }

    /// Logical type declared on the underlying leaf or group
    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            Node::Leaf(leaf) => leaf.logical_type,
            Node::Group(group) => group.logical_type,
            Node::Wrapped(w) => w.inner.logical_type(),
        }
    }

    /// Number of child nodes; zero for leaves
    pub fn num_children(&self) -> usize {
        match self.group() {
            Some(group) => group.fields.len(),
            None => 0,
        }
    }

    /// Sorted child names; empty for leaves
    pub fn child_names(&self) -> &[Arc<str>] {
        match self.group() {
            Some(group) => &group.names,
            None => &[],
        }
    }

    /// Look up a child node by name (binary search over sorted names)
    pub fn child_by_name(&self, name: &str) -> Option<&Node> {
        let group = self.group()?;
        group.index_of(name).map(|i| &group.fields[i].node)
    }

    /// Look up a child node by position in sorted name order
    pub fn child_by_index(&self, index: usize) -> Option<&Node> {
        self.group()?.fields.get(index).map(|f| &f.node)
    }

    /// Encoding hints declared on this node; for groups, the union of the
    /// hints declared in child nodes
    pub fn encodings(&self) -> Vec<Encoding> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Group(group) => {
                let mut all = Vec::new();
                for field in &group.fields {
                    for enc in field.node.encodings() {
                        if !all.contains(&enc) {
                            all.push(enc);
                        }
                    }
                }
                all
            }
            Node::Wrapped(w) => {
                let mut all = w.inner.encodings();
                if let Decoration::Encoded(encodings) = &w.decoration {
                    for enc in encodings {
                        if !all.contains(enc) {
                            all.push(*enc);
                        }
                    }
                }
                all
            }
        }
    }

    /// Compression codec hints declared on this node; for groups, the union
    /// of the hints declared in child nodes
    pub fn compressions(&self) -> Vec<Compression> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Group(group) => {
                let mut all = Vec::new();
                for field in &group.fields {
                    for codec in field.node.compressions() {
                        if !all.contains(&codec) {
                            all.push(codec);
                        }
                    }
                }
                all
            }
            Node::Wrapped(w) => {
                let mut all = w.inner.compressions();
                if let Decoration::Compressed(codecs) = &w.decoration {
                    for codec in codecs {
                        if !all.contains(codec) {
                            all.push(*codec);
                        }
                    }
                }
                all
            }
        }
    }

    /// Traversal view of the node with the outermost cardinality wrapper
    /// removed; codec wrappers do not affect traversal and are skipped.
    pub(crate) fn strip_cardinality(&self) -> &Node {
        match self {
            Node::Wrapped(w) => match &w.decoration {
                Decoration::Optional | Decoration::Repeated => &w.inner,
                _ => w.inner.strip_cardinality(),
            },
            other => other,
        }
    }

    /// The underlying group. Decorations never change a node's shape, so
    /// lookup sees through every wrapper.
    pub(crate) fn group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            Node::Wrapped(w) => w.inner.group(),
            Node::Leaf(_) => None,
        }
    }

    /// The group's fields in sorted name order, seen through codec wrappers
    pub(crate) fn group_fields(&self) -> Option<&[GroupField]> {
        self.group().map(|g| g.fields.as_slice())
    }
}
