//! Compiled traversal plans and the traversal executor.
//!
//! A schema compiles its node tree once into a [`TraverseStep`] tree with
//! one leaf step per column, assigned monotonically increasing column
//! indices in depth-first sorted-name order. Executing the plan against a
//! value walks the value, computes repetition and definition levels, and
//! emits one [`ColumnValue`] per leaf column to the caller's sink.

use crate::error::{ParquetError, Result};
use crate::node::{FieldPath, LogicalType, Node, PhysicalType};
use crate::value::{ColumnValue, ParquetValue};
use indexmap::IndexMap;
use std::sync::Arc;

/// Sink receiving one `(column index, value)` pair per leaf value, in
/// ascending plan-fixed column order within a traversal.
///
/// The first error returned aborts the traversal; values already emitted
/// are not rolled back.
pub trait Traversal {
    fn traverse(&mut self, column_index: usize, value: ColumnValue) -> Result<()>;
}

impl<F> Traversal for F
where
    F: FnMut(usize, ColumnValue) -> Result<()>,
{
    fn traverse(&mut self, column_index: usize, value: ColumnValue) -> Result<()> {
        self(column_index, value)
    }
}

/// Level counters threaded through a traversal, copied down the call chain.
///
/// `repetition_depth` counts repeated ancestors entered so far;
/// `repetition_level` is the depth of the most recent repetition boundary;
/// `definition_level` counts optional/repeated ancestors actually present.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Levels {
    pub repetition_depth: i16,
    pub repetition_level: i16,
    pub definition_level: i16,
}

/// One step of a compiled traversal plan
#[derive(Debug, Clone)]
pub(crate) enum TraverseStep {
    Optional {
        inner: Box<TraverseStep>,
    },
    Repeated {
        inner: Box<TraverseStep>,
    },
    Group {
        fields: Vec<GroupStep>,
    },
    Leaf {
        column_index: usize,
        physical_type: PhysicalType,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct GroupStep {
    path: FieldPath,
    step: TraverseStep,
}

/// Compile a traversal plan for a root node, returning the number of leaf
/// columns and the step tree. Column indices and sink invocation order are
/// fixed here and never recomputed per record.
pub(crate) fn compile(root: &Node) -> Result<(usize, TraverseStep)> {
    compile_step(0, root)
}

fn compile_step(column_index: usize, node: &Node) -> Result<(usize, TraverseStep)> {
    if node.is_optional() {
        let (next, inner) = compile_step(column_index, node.strip_cardinality())?;
        return Ok((
            next,
            TraverseStep::Optional {
                inner: Box::new(inner),
            },
        ));
    }

    // LIST-shaped groups traverse their element directly, bypassing the
    // raw list/element group shape.
    if node.logical_type() == Some(LogicalType::List) {
        let element = node
            .child_by_name("list")
            .and_then(|list| list.child_by_name("element"))
            .ok_or_else(|| ParquetError::internal("malformed LIST group node"))?;
        let (next, inner) = compile_step(column_index, element)?;
        return Ok((
            next,
            TraverseStep::Repeated {
                inner: Box::new(inner),
            },
        ));
    }

    if node.is_repeated() {
        let (next, inner) = compile_step(column_index, node.strip_cardinality())?;
        return Ok((
            next,
            TraverseStep::Repeated {
                inner: Box::new(inner),
            },
        ));
    }

    match node.group_fields() {
        Some(fields) => {
            let mut steps = Vec::with_capacity(fields.len());
            let mut next = column_index;
            for field in fields {
                let (after, step) = compile_step(next, &field.node)?;
                next = after;
                steps.push(GroupStep {
                    path: field.path.clone(),
                    step,
                });
            }
            Ok((next, TraverseStep::Group { fields: steps }))
        }
        None => {
            let physical_type = node
                .physical_type()
                .ok_or_else(|| ParquetError::internal("leaf node without a physical type"))?;
            Ok((
                column_index + 1,
                TraverseStep::Leaf {
                    column_index,
                    physical_type,
                },
            ))
        }
    }
}

/// Named presence states of a sequence value at a repeated step. The nil
/// and empty states differ by exactly one definition level.
enum SequenceState<'a> {
    /// The placeholder: an ancestor was already absent
    Missing,
    /// A nil sequence
    Nil,
    /// A present sequence, possibly empty
    Present(&'a [ParquetValue]),
}

fn sequence_state(value: Option<&ParquetValue>) -> SequenceState<'_> {
    match value {
        None => SequenceState::Missing,
        Some(ParquetValue::Null) => SequenceState::Nil,
        Some(ParquetValue::List(items)) => SequenceState::Present(items),
        Some(other) => panic!(
            "parquet value does not match schema: expected a list, found {}",
            other.type_name()
        ),
    }
}

/// Execute a compiled plan against a value. `None` is the absent
/// placeholder propagated below the point where a value went missing.
///
/// Values whose shape does not structurally match the plan's schema cause
/// a panic; sink errors abort the traversal and are returned verbatim.
pub(crate) fn execute<T>(
    step: &TraverseStep,
    mut levels: Levels,
    value: Option<&ParquetValue>,
    traversal: &mut T,
) -> Result<()>
where
    T: Traversal + ?Sized,
{
    match step {
        TraverseStep::Optional { inner } => {
            let value = match value {
                None => None,
                // A present-but-empty sequence stays uncounted here; the
                // repeated step below records the single presence level.
                Some(ParquetValue::List(items)) if items.is_empty() => value,
                Some(v) if v.is_zero() => None,
                Some(v) => {
                    levels.definition_level += 1;
                    Some(v)
                }
            };
            execute(inner, levels, value, traversal)
        }

        TraverseStep::Repeated { inner } => match sequence_state(value) {
            SequenceState::Missing => execute(inner, levels, None, traversal),
            SequenceState::Nil => {
                levels.repetition_depth += 1;
                execute(inner, levels, None, traversal)
            }
            SequenceState::Present(items) => {
                levels.repetition_depth += 1;
                levels.definition_level += 1;
                if items.is_empty() {
                    execute(inner, levels, None, traversal)
                } else {
                    for item in items {
                        execute(inner, levels, Some(item), traversal)?;
                        levels.repetition_level = levels.repetition_depth;
                    }
                    Ok(())
                }
            }
        },

        TraverseStep::Group { fields } => {
            let record = match value {
                None | Some(ParquetValue::Null) => None,
                Some(ParquetValue::Record(record)) => Some(record),
                Some(other) => panic!(
                    "parquet value does not match schema: expected a record, found {}",
                    other.type_name()
                ),
            };
            for field in fields {
                let sub = record.and_then(|r| field.path.resolve(r));
                execute(&field.step, levels, sub, traversal)?;
            }
            Ok(())
        }

        TraverseStep::Leaf {
            column_index,
            physical_type,
        } => {
            let column_value = make_column_value(*physical_type, value, levels);
            traversal.traverse(*column_index, column_value)
        }
    }
}

impl FieldPath {
    /// Resolve the field value reached by this path, descending through
    /// embedded records. Positional access is tried first and verified
    /// against the source field name, falling back to a name lookup; a
    /// missing field resolves to the absent placeholder.
    pub(crate) fn resolve<'a>(
        &self,
        record: &'a IndexMap<Arc<str>, ParquetValue>,
    ) -> Option<&'a ParquetValue> {
        let mut current = record;
        for (depth, segment) in self.0.iter().enumerate() {
            let value = match current.get_index(segment.index) {
                Some((key, value)) if key.as_ref() == segment.name.as_ref() => value,
                _ => current.get(segment.name.as_ref())?,
            };
            if depth + 1 == self.0.len() {
                return Some(value);
            }
            current = match value {
                ParquetValue::Record(record) => record,
                ParquetValue::Null => return None,
                other => panic!(
                    "parquet value does not match schema: embedded field {} is not a record, found {}",
                    segment.name,
                    other.type_name()
                ),
            };
        }
        None
    }
}

fn make_column_value(
    physical_type: PhysicalType,
    value: Option<&ParquetValue>,
    levels: Levels,
) -> ColumnValue {
    match value {
        None | Some(ParquetValue::Null) => {
            ColumnValue::null(levels.repetition_level, levels.definition_level)
        }
        Some(v) => {
            if !physical_kind_accepts(physical_type, v) {
                panic!(
                    "parquet value does not match schema: column of type {} cannot hold {}",
                    physical_type.type_name(),
                    v.type_name()
                );
            }
            ColumnValue::new(v.clone(), levels.repetition_level, levels.definition_level)
        }
    }
}

fn physical_kind_accepts(physical_type: PhysicalType, value: &ParquetValue) -> bool {
    match physical_type {
        PhysicalType::Boolean => matches!(value, ParquetValue::Boolean(_)),
        PhysicalType::Int32 => matches!(
            value,
            ParquetValue::Int8(_)
                | ParquetValue::Int16(_)
                | ParquetValue::Int32(_)
                | ParquetValue::UInt8(_)
                | ParquetValue::UInt16(_)
                | ParquetValue::UInt32(_)
        ),
        PhysicalType::Int64 => matches!(value, ParquetValue::Int64(_) | ParquetValue::UInt64(_)),
        PhysicalType::Float => matches!(value, ParquetValue::Float32(_)),
        PhysicalType::Double => matches!(value, ParquetValue::Float64(_)),
        PhysicalType::ByteArray => {
            matches!(value, ParquetValue::String(_) | ParquetValue::Bytes(_))
        }
        PhysicalType::FixedLenByteArray(len) => match value {
            ParquetValue::Uuid(_) => len == 16,
            ParquetValue::Bytes(b) => b.len() == len,
            ParquetValue::String(s) => s.len() == len,
            _ => false,
        },
    }
}
