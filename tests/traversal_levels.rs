use parquet_shred::*;

use test_helpers::*;

#[test]
fn test_required_and_optional_list_scenario() {
    // Schema: { id: required int64, tags: optional list of string }
    // Sorted columns: id = 0, tags.element = 1
    let schema = Schema::of(&item_descriptor()).unwrap();
    assert_eq!(schema.num_columns(), 2);

    // Nil list: both presence levels are missing
    let value = record(vec![
        ("id", ParquetValue::Int64(1)),
        ("tags", ParquetValue::Null),
    ]);
    assert_eq!(
        flatten(&shred(&schema, &value)),
        vec![
            (0, ParquetValue::Int64(1), 0, 0),
            (1, ParquetValue::Null, 0, 0),
        ]
    );

    // Present-but-empty list: one placeholder, definition level 1
    let value = record(vec![
        ("id", ParquetValue::Int64(2)),
        ("tags", ParquetValue::List(vec![])),
    ]);
    assert_eq!(
        flatten(&shred(&schema, &value)),
        vec![
            (0, ParquetValue::Int64(2), 0, 0),
            (1, ParquetValue::Null, 0, 1),
        ]
    );

    // Two elements: definition level 2, repetition level 0 then 1
    let value = record(vec![
        ("id", ParquetValue::Int64(3)),
        ("tags", string_list(&["a", "b"])),
    ]);
    assert_eq!(
        flatten(&shred(&schema, &value)),
        vec![
            (0, ParquetValue::Int64(3), 0, 0),
            (1, string("a"), 0, 2),
            (1, string("b"), 1, 2),
        ]
    );
}

#[test]
fn test_fully_populated_definition_levels_count_ancestors() {
    // nested: optional group { scores: repeated double } plus flat fields
    let inner = StructDescriptor::new(
        "Inner",
        vec![FieldDescriptor::new(
            "scores",
            TypeDescriptor::sequence_of(TypeDescriptor::Float64),
        )],
    );
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Outer",
        vec![
            FieldDescriptor::new("id", TypeDescriptor::Int64),
            FieldDescriptor::new("inner", TypeDescriptor::Struct(inner)).with_tag("inner,optional"),
        ],
    ));
    let schema = Schema::of(&model).unwrap();

    // Columns sorted: id = 0, inner.scores = 1
    let value = record(vec![
        ("id", ParquetValue::Int64(9)),
        (
            "inner",
            record(vec![(
                "scores",
                ParquetValue::List(vec![
                    ParquetValue::Float64(1.5.into()),
                    ParquetValue::Float64(2.5.into()),
                ]),
            )]),
        ),
    ]);
    let flat = flatten(&shred(&schema, &value));

    // id has no optional/repeated ancestors; scores has two (optional
    // group, repeated field)
    assert_eq!(flat[0], (0, ParquetValue::Int64(9), 0, 0));
    assert_eq!(flat[1], (1, ParquetValue::Float64(1.5.into()), 0, 2));
    assert_eq!(flat[2], (1, ParquetValue::Float64(2.5.into()), 1, 2));
}

#[test]
fn test_absent_group_propagates_to_all_children() {
    let inner = StructDescriptor::new(
        "Inner",
        vec![
            FieldDescriptor::new("a", TypeDescriptor::Int32),
            FieldDescriptor::new("b", TypeDescriptor::String),
        ],
    );
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Outer",
        vec![FieldDescriptor::new("inner", TypeDescriptor::Struct(inner))
            .with_tag("inner,optional")],
    ));
    let schema = Schema::of(&model).unwrap();

    let value = record(vec![("inner", ParquetValue::Null)]);
    let flat = flatten(&shred(&schema, &value));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Null, 0, 0),
            (1, ParquetValue::Null, 0, 0),
        ]
    );
}

#[test]
fn test_optional_zero_value_shreds_as_null() {
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![
            FieldDescriptor::new("id", TypeDescriptor::Int64),
            FieldDescriptor::new("value", TypeDescriptor::Float64).with_tag("value,optional"),
        ],
    ));
    let schema = Schema::of(&model).unwrap();

    // Zero value of the type: definition level one less than present case
    let zero = record(vec![
        ("id", ParquetValue::Int64(1)),
        ("value", ParquetValue::Float64(0.0.into())),
    ]);
    let flat = flatten(&shred(&schema, &zero));
    assert_eq!(flat[1], (1, ParquetValue::Null, 0, 0));

    let present = record(vec![
        ("id", ParquetValue::Int64(2)),
        ("value", ParquetValue::Float64(1.0.into())),
    ]);
    let flat = flatten(&shred(&schema, &present));
    assert_eq!(flat[1], (1, ParquetValue::Float64(1.0.into()), 0, 1));
}

#[test]
fn test_repeated_k_elements_emit_k_values() {
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![FieldDescriptor::new(
            "values",
            TypeDescriptor::sequence_of(TypeDescriptor::Int32),
        )],
    ));
    let schema = Schema::of(&model).unwrap();

    for k in [1usize, 2, 5] {
        let items: Vec<ParquetValue> =
            (0..k).map(|i| ParquetValue::Int32(i as i32)).collect();
        let value = record(vec![("values", ParquetValue::List(items))]);
        let flat = flatten(&shred(&schema, &value));

        assert_eq!(flat.len(), k);
        assert_eq!(flat[0].2, 0, "first element starts a new record");
        for entry in &flat[1..] {
            assert_eq!(entry.2, 1, "subsequent elements repeat at depth 1");
        }
        for entry in &flat {
            assert_eq!(entry.3, 1);
        }
    }
}

#[test]
fn test_bare_repeated_nil_vs_empty() {
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![FieldDescriptor::new(
            "values",
            TypeDescriptor::sequence_of(TypeDescriptor::Int32),
        )],
    ));
    let schema = Schema::of(&model).unwrap();

    let nil = record(vec![("values", ParquetValue::Null)]);
    let flat = flatten(&shred(&schema, &nil));
    assert_eq!(flat, vec![(0, ParquetValue::Null, 0, 0)]);

    // Present-but-empty: definition level one more than the nil case
    let empty = record(vec![("values", ParquetValue::List(vec![]))]);
    let flat = flatten(&shred(&schema, &empty));
    assert_eq!(flat, vec![(0, ParquetValue::Null, 0, 1)]);
}

#[test]
fn test_optional_within_repeated() {
    // values: []*f64, a sequence of nullable doubles
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![FieldDescriptor::new(
            "values",
            TypeDescriptor::sequence_of(TypeDescriptor::pointer_to(TypeDescriptor::Float64)),
        )],
    ));
    let schema = Schema::of(&model).unwrap();

    let value = record(vec![(
        "values",
        ParquetValue::List(vec![
            ParquetValue::Float64(1.0.into()),
            ParquetValue::Null,
            ParquetValue::Float64(3.0.into()),
        ]),
    )]);
    let flat = flatten(&shred(&schema, &value));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Float64(1.0.into()), 0, 2),
            (0, ParquetValue::Null, 1, 1),
            (0, ParquetValue::Float64(3.0.into()), 1, 2),
        ]
    );
}

#[test]
fn test_repeated_within_optional_group() {
    let inner = StructDescriptor::new(
        "Inner",
        vec![FieldDescriptor::new(
            "tags",
            TypeDescriptor::sequence_of(TypeDescriptor::String),
        )],
    );
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Outer",
        vec![FieldDescriptor::new("inner", TypeDescriptor::Struct(inner))
            .with_tag("inner,optional")],
    ));
    let schema = Schema::of(&model).unwrap();

    // Group absent: nothing below is defined
    let absent = record(vec![("inner", ParquetValue::Null)]);
    assert_eq!(
        flatten(&shred(&schema, &absent)),
        vec![(0, ParquetValue::Null, 0, 0)]
    );

    // Group present but all-zero (its only field is a nil sequence):
    // indistinguishable from absent
    let nil_tags = record(vec![("inner", record(vec![("tags", ParquetValue::Null)]))]);
    assert_eq!(
        flatten(&shred(&schema, &nil_tags)),
        vec![(0, ParquetValue::Null, 0, 0)]
    );

    // Group present with an empty (non-nil) sequence: the group level is
    // defined, the list contributes one more
    let empty_tags = record(vec![(
        "inner",
        record(vec![("tags", ParquetValue::List(vec![]))]),
    )]);
    assert_eq!(
        flatten(&shred(&schema, &empty_tags)),
        vec![(0, ParquetValue::Null, 0, 2)]
    );

    // Group present, elements present: both levels defined
    let populated = record(vec![(
        "inner",
        record(vec![("tags", string_list(&["x", "y"]))]),
    )]);
    assert_eq!(
        flatten(&shred(&schema, &populated)),
        vec![(0, string("x"), 0, 2), (0, string("y"), 1, 2)]
    );
}

#[test]
fn test_nested_repetition_levels() {
    // matrix: [][]int32, where repetition levels distinguish outer and
    // inner boundaries
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![FieldDescriptor::new(
            "matrix",
            TypeDescriptor::sequence_of(TypeDescriptor::sequence_of(TypeDescriptor::Int32)),
        )],
    ));
    let schema = Schema::of(&model).unwrap();

    let value = record(vec![(
        "matrix",
        ParquetValue::List(vec![
            ParquetValue::List(vec![ParquetValue::Int32(1), ParquetValue::Int32(2)]),
            ParquetValue::List(vec![ParquetValue::Int32(3)]),
        ]),
    )]);
    let flat = flatten(&shred(&schema, &value));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Int32(1), 0, 2),
            (0, ParquetValue::Int32(2), 2, 2),
            (0, ParquetValue::Int32(3), 1, 2),
        ]
    );
}

#[test]
fn test_missing_record_field_shreds_as_absent() {
    let schema = Schema::of(&item_descriptor()).unwrap();

    // The record omits "tags" entirely
    let value = record(vec![("id", ParquetValue::Int64(4))]);
    let flat = flatten(&shred(&schema, &value));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Int64(4), 0, 0),
            (1, ParquetValue::Null, 0, 0),
        ]
    );
}

#[test]
fn test_top_level_null_shreds_every_column_absent() {
    let schema = Schema::of(&item_descriptor()).unwrap();
    let flat = flatten(&shred(&schema, &ParquetValue::Null));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Null, 0, 0),
            (1, ParquetValue::Null, 0, 0),
        ]
    );
}

#[test]
fn test_emission_order_matches_sorted_columns() {
    let model = TypeDescriptor::Struct(StructDescriptor::new(
        "Record",
        vec![
            FieldDescriptor::new("zeta", TypeDescriptor::Int32),
            FieldDescriptor::new("alpha", TypeDescriptor::Int32),
            FieldDescriptor::new("mu", TypeDescriptor::Int32),
        ],
    ));
    let schema = Schema::of(&model).unwrap();

    let value = record(vec![
        ("zeta", ParquetValue::Int32(3)),
        ("alpha", ParquetValue::Int32(1)),
        ("mu", ParquetValue::Int32(2)),
    ]);
    let flat = flatten(&shred(&schema, &value));
    assert_eq!(
        flat,
        vec![
            (0, ParquetValue::Int32(1), 0, 0),
            (1, ParquetValue::Int32(2), 0, 0),
            (2, ParquetValue::Int32(3), 0, 0),
        ]
    );
}

#[test]
fn test_traversal_is_deterministic() {
    let schema = Schema::of(&item_descriptor()).unwrap();
    let value = record(vec![
        ("id", ParquetValue::Int64(7)),
        ("tags", string_list(&["p", "q", "r"])),
    ]);
    assert_eq!(shred(&schema, &value), shred(&schema, &value));
}

#[test]
fn test_sink_error_aborts_traversal() {
    let schema = Schema::of(&item_descriptor()).unwrap();
    let value = record(vec![
        ("id", ParquetValue::Int64(7)),
        ("tags", string_list(&["p", "q"])),
    ]);

    let mut calls = 0usize;
    let mut sink = |_: usize, _: ColumnValue| -> Result<()> {
        calls += 1;
        if calls == 2 {
            Err(ParquetError::internal("buffer full"))
        } else {
            Ok(())
        }
    };
    let err = schema.traverse(&value, &mut sink).unwrap_err();
    assert!(err.to_string().contains("buffer full"));
    assert_eq!(calls, 2, "traversal stops at the first sink error");
}

#[test]
#[should_panic(expected = "does not match schema")]
fn test_shape_mismatch_panics() {
    let schema = Schema::of(&item_descriptor()).unwrap();
    // A scalar where a record is expected
    let mut sink = |_: usize, _: ColumnValue| -> Result<()> { Ok(()) };
    let _ = schema.traverse(&ParquetValue::Int64(1), &mut sink);
}
