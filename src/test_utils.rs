//! Test utilities for parquet-shred

#[cfg(test)]
pub mod test {
    use crate::{
        ColumnValue, FieldDescriptor, ParquetValue, Result, Schema, StructDescriptor,
        TypeDescriptor,
    };
    use indexmap::IndexMap;
    use ordered_float::OrderedFloat;
    use rand::Rng;
    use std::sync::Arc;

    /// Build a record value from (name, value) pairs in declaration order
    pub fn record(fields: Vec<(&str, ParquetValue)>) -> ParquetValue {
        let mut map = IndexMap::new();
        for (name, value) in fields {
            map.insert(Arc::from(name), value);
        }
        ParquetValue::Record(map)
    }

    /// Sink collecting every emitted (column index, value) pair
    #[derive(Default)]
    pub struct CollectingSink {
        pub entries: Vec<(usize, ColumnValue)>,
    }

    impl crate::Traversal for CollectingSink {
        fn traverse(&mut self, column_index: usize, value: ColumnValue) -> Result<()> {
            self.entries.push((column_index, value));
            Ok(())
        }
    }

    /// Shred a value and return the emitted entries
    pub fn shred(schema: &Schema, value: &ParquetValue) -> Vec<(usize, ColumnValue)> {
        let mut sink = CollectingSink::default();
        schema.traverse(value, &mut sink).unwrap();
        sink.entries
    }

    /// A simple flat descriptor used across tests
    pub fn person_descriptor() -> TypeDescriptor {
        TypeDescriptor::Struct(StructDescriptor::new(
            "Person",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::Int64),
                FieldDescriptor::new("name", TypeDescriptor::String),
                FieldDescriptor::new("age", TypeDescriptor::Int32).with_tag("age,optional"),
                FieldDescriptor::new("salary", TypeDescriptor::Float64).with_tag("salary,optional"),
            ],
        ))
    }

    /// Generate random person records matching [`person_descriptor`]
    pub fn random_people(count: usize) -> Vec<ParquetValue> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                record(vec![
                    ("id", ParquetValue::Int64(i as i64)),
                    (
                        "name",
                        ParquetValue::String(Arc::from(format!("Person{}", i))),
                    ),
                    (
                        "age",
                        if rng.random_bool(0.2) {
                            ParquetValue::Null
                        } else {
                            ParquetValue::Int32(rng.random_range(1..100))
                        },
                    ),
                    (
                        "salary",
                        ParquetValue::Float64(OrderedFloat(rng.random_range(1.0..200_000.0))),
                    ),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod test_utils_tests {
    use super::test::*;
    use crate::{ParquetValue, Schema};

    #[test]
    fn test_person_descriptor_builds() {
        let schema = Schema::of(&person_descriptor()).unwrap();
        assert_eq!(schema.name(), "Person");
        assert_eq!(schema.num_columns(), 4);

        let names: Vec<&str> = schema.child_names().iter().map(|n| n.as_ref()).collect();
        assert_eq!(names, vec!["age", "id", "name", "salary"]);
    }

    #[test]
    fn test_random_people_shred_deterministically() {
        let schema = Schema::of(&person_descriptor()).unwrap();
        for person in random_people(20) {
            let first = shred(&schema, &person);
            let second = shred(&schema, &person);
            assert_eq!(first, second);
            assert_eq!(first.len(), 4);

            // Plan-fixed ascending column order
            let columns: Vec<usize> = first.iter().map(|(i, _)| *i).collect();
            assert_eq!(columns, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_collecting_sink_records_nulls() {
        let schema = Schema::of(&person_descriptor()).unwrap();
        let person = record(vec![
            ("id", ParquetValue::Int64(1)),
            ("name", ParquetValue::String("x".into())),
            ("age", ParquetValue::Null),
            ("salary", ParquetValue::Null),
        ]);
        let entries = shred(&schema, &person);

        // Sorted columns: age=0, id=1, name=2, salary=3
        assert!(entries[0].1.is_null());
        assert_eq!(entries[0].1.definition_level(), 0);
        assert!(!entries[1].1.is_null());
    }
}
