//! Integration tests mapping entity fields through the type adapters.

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use siloxane_core::{
    ArrayCodec, ColumnValue, CollectionShape, Configuration, DeclaredType, ElementType, Embedded,
    FieldMetadata, JsonCodec, JsonType, ListArrayType, MappingError, Properties, SqlArray,
    SqlValue, TypeAdapter, enum_element, resolve,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct FormField {
    number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Form {
    name: String,
    form_fields: IndexSet<FormField>,
}

fn form(numbers: &[i32]) -> Form {
    Form {
        name: "survey".to_string(),
        form_fields: numbers.iter().map(|&number| FormField { number }).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SensorState {
    Online,
    Offline,
    Unknown,
}

enum_element!(SensorState as "sensor_state" {
    Online => "ONLINE",
    Offline => "OFFLINE",
    Unknown => "UNKNOWN",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    value: f64,
}

#[test]
fn locale_scenario() {
    let codec = JsonCodec::with_config(Arc::new(Configuration::default()));
    let value = codec.from_text(r#"{"locale":"en-US"}"#).unwrap();

    let map = value.as_object().expect("generic mapping");
    assert_eq!(map.get("locale"), Some(&Value::String("en-US".to_string())));
}

#[test]
fn json_roundtrip_is_value_equal() {
    let codec = JsonCodec::with_config(Arc::new(Configuration::default()));
    let value = json!({
        "id": 7,
        "labels": ["a", "b"],
        "nested": {"enabled": false, "ratio": 0.25, "missing": null}
    });

    let text = codec.to_text(&value).unwrap();
    let back: Value = codec.from_text_as(&text).unwrap();
    assert!(codec.equals(Some(&value), Some(&back)));
}

#[test]
fn set_fields_compare_equal_regardless_of_order() {
    let adapter = JsonType::<Form>::new(Arc::new(Configuration::default()));
    let first = form(&[1, 2, 3]);
    let second = form(&[3, 2, 1]);

    assert!(adapter.equals(Some(&first), Some(&second)).unwrap());

    let text_first = adapter.to_column(Some(&first)).unwrap();
    let text_second = adapter.to_column(Some(&second)).unwrap();
    assert_ne!(text_first, text_second);
}

#[test]
fn textual_equality_sees_set_order() {
    let adapter = JsonType::<Form>::serialized_eq(Arc::new(Configuration::default()));
    let first = form(&[1, 2, 3]);
    let second = form(&[3, 2, 1]);

    assert!(!adapter.equals(Some(&first), Some(&second)).unwrap());
}

#[test]
fn equals_is_reflexive() {
    let adapter = JsonType::<Form>::new(Arc::new(Configuration::default()));
    let value = form(&[4, 5]);
    assert!(adapter.equals(Some(&value), Some(&value)).unwrap());
    assert!(adapter.equals(None, None).unwrap());

    let textual = JsonType::<Form>::serialized_eq(Arc::new(Configuration::default()));
    assert!(textual.equals(Some(&value), Some(&value)).unwrap());
    assert!(textual.equals(None, None).unwrap());
}

#[test]
fn malformed_column_text_is_surfaced() {
    let adapter = JsonType::<Form>::new(Arc::new(Configuration::default()));
    let err = adapter
        .from_column(Some(ColumnValue::Text("{\"name\": ".to_string())))
        .unwrap_err();
    assert!(matches!(err, MappingError::Decode { .. }));
}

#[test]
fn json_type_from_properties() {
    let mut properties = Properties::new();
    properties.insert(siloxane_core::JSON_SORT_KEYS.to_string(), "true".to_string());
    properties.insert(siloxane_core::JSON_SQL_TYPE.to_string(), "json".to_string());
    let config = Arc::new(Configuration::from_properties(&properties).unwrap());

    let adapter = JsonType::<Reading>::new(config);
    let reading = Reading {
        sensor: "t-1".to_string(),
        value: 21.5,
    };

    assert_eq!(adapter.sql_type_name(), "json");
    assert_eq!(
        adapter.to_column(Some(&reading)).unwrap(),
        Some(ColumnValue::Text(r#"{"sensor":"t-1","value":21.5}"#.to_string()))
    );
}

#[test]
fn resolution_scenarios() {
    let field = FieldMetadata::new("Event", "sensorIds", DeclaredType::of::<Vec<i32>>());
    assert_eq!(resolve(&field).unwrap(), ElementType::Integer);

    let raw = FieldMetadata::new("Event", "sensorIds", DeclaredType::raw(CollectionShape::List));
    assert!(matches!(resolve(&raw), Err(MappingError::Resolution { .. })));
    assert!(matches!(
        ListArrayType::<Vec<i32>>::for_field(&raw),
        Err(MappingError::Resolution { .. })
    ));
}

#[test]
fn three_element_integer_list() {
    let field = FieldMetadata::new("Event", "sensorIds", DeclaredType::of::<Vec<i32>>());
    let adapter = ListArrayType::<Vec<i32>>::for_field(&field).unwrap();

    let column = adapter.to_column(Some(&vec![7, 8, 9])).unwrap();
    let Some(ColumnValue::Array(array)) = column.clone() else {
        panic!("Expected array column, got {:?}", column);
    };

    assert_eq!(array.len(), 3);
    assert_eq!(
        array.elements,
        vec![SqlValue::Integer(7), SqlValue::Integer(8), SqlValue::Integer(9)]
    );
    assert!(array.type_name.contains("integer"));
    assert!(array.type_name.ends_with("[]"));

    assert_eq!(adapter.from_column(column).unwrap(), Some(vec![7, 8, 9]));
}

#[test]
fn array_nulls_propagate() {
    let adapter = ListArrayType::<Vec<String>>::new();
    assert_eq!(adapter.to_column(None).unwrap(), None);
    assert_eq!(adapter.from_column(None).unwrap(), None);
    assert_eq!(adapter.deep_copy(None).unwrap(), None);
}

#[test]
fn enum_array_with_sql_type_override() {
    let field = FieldMetadata::new(
        "Event",
        "states",
        DeclaredType::of::<Vec<SensorState>>(),
    )
    .with_parameter("sql_array_type", "sensor_state");
    let adapter = ListArrayType::<Vec<SensorState>>::for_field(&field).unwrap();

    let states = vec![SensorState::Online, SensorState::Unknown, SensorState::Offline];
    let column = adapter.to_column(Some(&states)).unwrap();
    assert_eq!(adapter.sql_type_name(), "sensor_state[]");

    match &column {
        Some(ColumnValue::Array(array)) => assert_eq!(
            array.elements,
            vec![
                SqlValue::Enum("ONLINE".to_string()),
                SqlValue::Enum("UNKNOWN".to_string()),
                SqlValue::Enum("OFFLINE".to_string()),
            ]
        ),
        other => panic!("Expected array column, got {:?}", other),
    }
    assert_eq!(adapter.from_column(column).unwrap(), Some(states));
}

#[test]
fn enum_array_reads_text_elements() {
    let adapter = ListArrayType::<Vec<SensorState>>::new();
    let raw = ColumnValue::Array(SqlArray {
        type_name: "text[]".to_string(),
        element_type: ElementType::Text,
        elements: vec![SqlValue::Text("OFFLINE".to_string())],
    });
    assert_eq!(
        adapter.from_column(Some(raw)).unwrap(),
        Some(vec![SensorState::Offline])
    );

    let unknown = ColumnValue::Array(SqlArray {
        type_name: "text[]".to_string(),
        element_type: ElementType::Text,
        elements: vec![SqlValue::Text("BROKEN".to_string())],
    });
    assert!(matches!(
        adapter.from_column(Some(unknown)),
        Err(MappingError::Conversion { index: 0, .. })
    ));
}

#[test]
fn uuid_and_date_arrays_read_text_columns() {
    let ids = ListArrayType::<Vec<Uuid>>::new();
    let id = Uuid::from_u128(0x5eed);
    let raw = ColumnValue::Array(SqlArray {
        type_name: "text[]".to_string(),
        element_type: ElementType::Text,
        elements: vec![SqlValue::Text(id.to_string())],
    });
    assert_eq!(ids.from_column(Some(raw)).unwrap(), Some(vec![id]));

    let days = ListArrayType::<BTreeSet<NaiveDate>>::new();
    let day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let raw = ColumnValue::Array(SqlArray {
        type_name: "date[]".to_string(),
        element_type: ElementType::Date,
        elements: vec![SqlValue::Date(day), SqlValue::Date(day)],
    });
    let set = days.from_column(Some(raw)).unwrap().unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains(&day));
}

#[test]
fn embedded_elements_in_json_array() {
    let codec = ArrayCodec::<Vec<Embedded<Reading>>>::new();
    let readings = vec![
        Embedded(Reading {
            sensor: "a".to_string(),
            value: 1.0,
        }),
        Embedded(Reading {
            sensor: "b".to_string(),
            value: 2.0,
        }),
    ];

    let array = codec.to_column(Some(&readings)).unwrap().unwrap();
    assert_eq!(array.type_name, "jsonb[]");
    assert_eq!(array.elements[1], SqlValue::Json(json!({"sensor": "b", "value": 2.0})));

    assert_eq!(codec.from_column(Some(array)).unwrap(), Some(readings));
}

#[test]
fn embedded_element_missing_field_is_a_decode_error() {
    let adapter = ListArrayType::<Vec<Embedded<Reading>>>::new();
    let raw = ColumnValue::Array(SqlArray {
        type_name: "jsonb[]".to_string(),
        element_type: ElementType::Json,
        elements: vec![
            SqlValue::Json(json!({"sensor": "a", "value": 1.0})),
            SqlValue::Json(json!({"sensor": "b"})),
        ],
    });

    let err = adapter.from_column(Some(raw)).unwrap_err();
    assert!(matches!(err, MappingError::Decode { .. }));
    assert!(err.to_string().contains("missing field `value`"));
}

#[test]
fn set_arrays_compare_as_multisets() {
    let codec = ArrayCodec::<IndexSet<String>>::new();
    let a: IndexSet<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    let b: IndexSet<String> = ["z", "x", "y"].iter().map(|s| s.to_string()).collect();
    assert!(codec.equals(Some(&a), Some(&b)));

    let column_a = codec.to_column(Some(&a)).unwrap().unwrap();
    let column_b = codec.to_column(Some(&b)).unwrap().unwrap();
    let sorted = |array: SqlArray| {
        let mut texts: Vec<String> = array
            .elements
            .into_iter()
            .map(|v| match v {
                SqlValue::Text(s) => s,
                other => panic!("Expected text, got {:?}", other),
            })
            .collect();
        texts.sort();
        texts
    };
    assert_eq!(sorted(column_a), sorted(column_b));
}

#[test]
fn adapters_are_shared_between_threads() {
    let json = Arc::new(JsonType::<Form>::new(Arc::new(Configuration::default())));
    let array = Arc::new(ListArrayType::<Vec<i64>>::new());

    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let json = Arc::clone(&json);
            let array = Arc::clone(&array);
            thread::spawn(move || {
                let value = form(&[i as i32, 1, 2]);
                let copy = json.deep_copy(Some(&value)).unwrap();
                assert!(json.equals(Some(&value), copy.as_ref()).unwrap());

                let list = vec![i, i * 2];
                let column = array.to_column(Some(&list)).unwrap();
                assert_eq!(array.from_column(column).unwrap(), Some(list));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
