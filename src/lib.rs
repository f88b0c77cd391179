//! Record shredding core for a Dremel-style columnar format
//!
//! `parquet-shred` converts nested, optional, and repeated structured
//! values into the flat column-oriented representation used by Parquet-like
//! storage: a deterministic stream of (column index, typed value,
//! repetition level, definition level) entries, one per leaf value.
//!
//! # Key Components
//!
//! - **Node model**: a tree of schema nodes describing shape (leaf/group),
//!   cardinality (required/optional/repeated), logical-type annotations,
//!   and per-column encoding/compression hints
//!   - Constructed through [`Node`] constructors; conflicting decorations
//!     fail at construction time
//!
//! - **Schema builder**: derives a node tree from a structured-type
//!   description ([`TypeDescriptor`])
//!   - Flattens embedded fields depth-first and sorts columns by resolved
//!     name for deterministic column ordering
//!   - Applies the struct tag mini-language (`optional`, `list`, `enum`,
//!     `uuid`, `decimal(scale,precision)`, `timestamp(unit)`, encodings,
//!     compression codecs)
//!
//! - **Traversal plan**: compiled once per schema into an explicit step
//!   tree with one fixed column index per leaf, reused for every record
//!
//! - **Traversal executor**: [`Schema::traverse`] walks a [`ParquetValue`]
//!   against the plan, computing repetition/definition levels and emitting
//!   [`ColumnValue`]s to a caller-supplied [`Traversal`] sink
//!
//! # Concurrency
//!
//! Schemas and their compiled plans are immutable after construction and
//! can be shared freely; concurrent traversals carry no shared mutable
//! state. A sink shared across concurrent traversals is the caller's
//! responsibility to synchronize.
//!
//! # Scope
//!
//! Physical byte encoding, compression, page layout, file I/O, and
//! reader-side reconstruction are external collaborators. This crate only
//! computes column assignment, per-value level metadata, and traversal
//! order, and exposes the encoding/compression hints those collaborators
//! consume.

pub mod descriptor;
pub mod error;
pub mod node;
pub mod schema;
pub mod tag;
pub mod traverse;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use descriptor::{FieldDescriptor, StructDescriptor, TypeDescriptor};
pub use error::{ErrorContext, ParquetError, Result};
pub use node::{Compression, Encoding, LogicalType, Node, PhysicalType, TimeUnit};
pub use schema::Schema;
pub use tag::{ParsedTag, TagOption};
pub use traverse::Traversal;
pub use value::{ColumnValue, ParquetValue};
