//! End-to-end loading of a complete metadata document, plus the semantic
//! failure modes a structurally valid document can still exhibit.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use logmd_model::{
    Interval, KnownIssueType, Lodt, LogTimestamp, LoggerMetadata, MappingType, ModelError,
};
use logmd_validate::{
    LoadError, RawDocument, SemanticError, load_logger_metadata, load_logger_metadata_slice,
    validate_semantics,
};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/TestLogger.json")
}

fn fixture() -> Value {
    serde_json::from_str(include_str!("fixtures/TestLogger.json")).expect("fixture parses")
}

fn load_value(value: &Value) -> Result<LoggerMetadata, LoadError> {
    load_logger_metadata_slice(value.to_string().as_bytes())
}

fn semantic_errors(value: &Value) -> Vec<SemanticError> {
    match load_value(value) {
        Err(LoadError::Semantic(report)) => report.errors,
        other => panic!("expected semantic failure, got {other:?}"),
    }
}

#[test]
fn loads_reference_document() {
    let md = load_logger_metadata(fixture_path()).expect("document loads");
    assert_eq!(md.logger_name, "TestLogger");
    assert_eq!(md.toa5_env_match.station_name.as_deref(), Some("TestLogger"));
    assert_eq!(md.toa5_env_match.logger_serial.as_deref(), Some("12342"));
    assert!(md.tz.as_ref().is_some_and(logmd_model::LoggerTz::is_utc));
    assert!(matches!(md.min_datetime, Some(LogTimestamp::Local(_))));
    assert_eq!(md.variants, ["abc", "def"]);
    assert_eq!(md.sensors.len(), 2);
    assert!(md.known_gaps[0].is_instant());
    assert!(!md.known_gaps[1].is_instant());
    assert!(md.skip_records[0].is_instant());
    assert!(md.is_ignored("Hello") && md.is_ignored("World"));
    assert_eq!(md.active_tables().count(), 2);
}

#[test]
fn decodes_table_definitions() {
    let md = load_logger_metadata(fixture_path()).expect("document loads");

    let daily = md.table("Daily").expect("Daily exists");
    assert_eq!(daily.prikey, Some(0));
    assert_eq!(daily.interval, Some(Interval::Day1));
    assert_eq!(daily.columns.len(), 8);
    assert_eq!(daily.columns[0].lodt, Some(Lodt::TS));
    assert_eq!(daily.known_issues[0].issue_type, KnownIssueType::Bad);
    assert_eq!(daily.known_issues[0].cols, ["PTemp_C_Min"]);
    // no variant columns, so the only projection is the identity
    assert_eq!(daily.variant_map(&md.variants).len(), 1);

    let hourly = md.table("Hourly").expect("Hourly exists");
    assert_eq!(hourly.interval, Some(Interval::Hour1));
    assert_eq!(hourly.columns.len(), 9);
    let air = hourly.column("AirT_C(42)").expect("variant column");
    assert_eq!(air.var.as_deref(), Some("abc"));
    assert_eq!(air.sens.as_deref(), Some("acme532"));
    assert_eq!(air.sql_name(), "airt_c_42");
    // abc, def, and the trailing full projection
    assert_eq!(hourly.variant_map(&md.variants).len(), 3);

    let mapping = hourly.mapping("Press_Humid").expect("mapping exists");
    assert_eq!(mapping.mapping_type, MappingType::View);
    assert_eq!(mapping.map.len(), 3);
    assert_eq!(mapping.map[0].new.name, "Timestamp");
}

#[test]
fn rejects_unknown_root_key() {
    let mut doc = fixture();
    doc["frobnicate"] = json!(1);
    assert!(matches!(load_value(&doc), Err(LoadError::Structural(_))));
}

#[test]
fn rejects_malformed_logger_name() {
    let mut doc = fixture();
    doc["logger_name"] = json!("9starts_with_digit");
    assert!(matches!(load_value(&doc), Err(LoadError::Structural(_))));
}

#[test]
fn rejects_malformed_timestamp_shape() {
    let mut doc = fixture();
    doc["known_gaps"][0]["time"] = json!("2021-06-19T13:00:00Z");
    assert!(matches!(load_value(&doc), Err(LoadError::Structural(_))));
}

#[test]
fn rejects_garbage_json() {
    assert!(matches!(
        load_logger_metadata_slice(b"{ not json"),
        Err(LoadError::Json(_))
    ));
}

#[test]
fn reports_unknown_variant() {
    let mut doc = fixture();
    doc["tables"]["Hourly"]["columns"][5]["var"] = json!("zzz");
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::UnknownVariant {
            table: "Hourly".to_string(),
            column: "AirT_C(42)".to_string(),
            value: "zzz".to_string(),
        }]
    );
}

#[test]
fn reports_unknown_sensor() {
    let mut doc = fixture();
    doc["tables"]["Hourly"]["columns"][7]["sens"] = json!("acme9000");
    let errors = semantic_errors(&doc);
    assert!(matches!(
        errors.as_slice(),
        [SemanticError::UnknownSensor { column, value, .. }]
            if column == "RelHumid" && value == "acme9000"
    ));
}

#[test]
fn reports_duplicate_column() {
    let mut doc = fixture();
    let dup = json!({ "name": "RECORD", "unit": "RN", "type": "NonNegInt" });
    doc["tables"]["Hourly"]["columns"]
        .as_array_mut()
        .expect("columns array")
        .push(dup);
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::DuplicateColumn {
            table: "Hourly".to_string(),
            name: "RECORD".to_string(),
        }]
    );
}

#[test]
fn reports_prikey_out_of_range() {
    let mut doc = fixture();
    doc["tables"]["Daily"]["prikey"] = json!(8);
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::InvalidPrimaryKey {
            table: "Daily".to_string(),
            index: 8,
            column_count: 8,
        }]
    );
}

#[test]
fn reports_unknown_issue_column() {
    let mut doc = fixture();
    doc["tables"]["Daily"]["known_issues"][0]["cols"] = json!(["Nope_C"]);
    let errors = semantic_errors(&doc);
    assert!(matches!(
        errors.as_slice(),
        [SemanticError::UnknownIssueColumn { name, .. }] if name == "Nope_C"
    ));
}

#[test]
fn reports_calendar_invalid_timestamp() {
    // passes the structural pattern but is not a real date
    let mut doc = fixture();
    doc["known_gaps"][0]["time"] = json!("2021-02-30 13:00:00Z");
    let errors = semantic_errors(&doc);
    assert!(matches!(
        errors.as_slice(),
        [SemanticError::InvalidTimestamp { location, .. }] if location == "known_gaps[0].time"
    ));
}

#[test]
fn reports_inverted_range() {
    let mut doc = fixture();
    doc["known_gaps"][1]["time"] = json!("2021-06-19 17:00:00Z");
    doc["known_gaps"][1]["end"] = json!("2021-06-19 15:00:00Z");
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::InvertedTimeRange {
            location: "known_gaps[1]".to_string(),
        }]
    );
}

#[test]
fn reports_inverted_range_with_mixed_endpoints() {
    // a zoned start and an offset-less end only order through the declared tz
    let mut doc = fixture();
    doc["known_gaps"][1]["time"] = json!("2021-06-19 17:00:00Z");
    doc["known_gaps"][1]["end"] = json!("2021-06-19 15:00:00");
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::InvertedTimeRange {
            location: "known_gaps[1]".to_string(),
        }]
    );
}

#[test]
fn accepts_zero_length_range() {
    let mut doc = fixture();
    doc["known_gaps"][1]["end"] = doc["known_gaps"][1]["time"].clone();
    load_value(&doc).expect("equal endpoints are not an inversion");
}

#[test]
fn reports_unknown_timezone() {
    let mut doc = fixture();
    doc["tz"] = json!("Nowhere/Special");
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::UnknownTimezone {
            value: "Nowhere/Special".to_string(),
        }]
    );
}

#[test]
fn reports_unparseable_value_type() {
    let mut doc = fixture();
    doc["tables"]["Hourly"]["columns"][2]["type"] = json!("Num(0)");
    let errors = semantic_errors(&doc);
    assert!(matches!(
        errors.as_slice(),
        [SemanticError::InvalidValueType { column, value, .. }]
            if column == "BattV_Min" && value == "Num(0)"
    ));
}

#[test]
fn reports_missing_timezone_for_local_timestamps() {
    let mut doc = fixture();
    doc.as_object_mut().expect("object").remove("tz");
    doc["known_gaps"][0]["time"] = json!("2021-06-19 13:00:00");
    let errors = semantic_errors(&doc);
    // min_datetime is offset-less too
    assert_eq!(
        errors,
        vec![
            SemanticError::MissingTimezone {
                location: "min_datetime".to_string(),
            },
            SemanticError::MissingTimezone {
                location: "known_gaps[0].time".to_string(),
            },
        ]
    );
}

#[test]
fn reports_overlapping_gaps() {
    let mut doc = fixture();
    doc["known_gaps"]
        .as_array_mut()
        .expect("gaps array")
        .push(json!({
            "time": "2021-06-19 16:00:00Z",
            "end": "2021-06-19 18:00:00Z",
            "why": "crosses the example gap"
        }));
    let errors = semantic_errors(&doc);
    assert_eq!(
        errors,
        vec![SemanticError::OverlappingTimeRanges {
            location: "known_gaps[1] and known_gaps[2]".to_string(),
        }]
    );
}

#[test]
fn checks_tokens_for_documents_built_in_code() {
    // serde decoding alone does not enforce the schema's token patterns, so
    // a document assembled without the structural pass is re-checked here
    let mut doc = fixture();
    doc["tables"]["Hourly"]["columns"][0]["name"] = json!("9TIMESTAMP");
    doc["tables"]["Hourly"]["mappings"]["Press_Humid"]["map"][1]["new"]["unit"] = json!("a\\b");
    let raw: RawDocument = serde_json::from_value(doc).expect("document decodes");
    let report = validate_semantics(&raw).expect_err("token violations");
    assert_eq!(
        report.errors,
        vec![
            SemanticError::InvalidToken {
                location: "tables.Hourly.columns[0].name".to_string(),
                source: ModelError::InvalidIdentifier("9TIMESTAMP".to_string()),
            },
            SemanticError::InvalidToken {
                location: "tables.Hourly.mappings.Press_Humid.map[1].new".to_string(),
                source: ModelError::InvalidUnit("a\\b".to_string()),
            },
        ]
    );
}

#[test]
fn ignored_table_with_definition_still_loads() {
    let mut doc = fixture();
    doc["ignore_tables"] = json!(["Daily"]);
    let md = load_value(&doc).expect("override is accepted");
    assert!(md.is_ignored("Daily"));
    let active: Vec<_> = md.active_tables().map(|t| t.name.as_str()).collect();
    assert_eq!(active, ["Hourly"]);
}

#[test]
fn accumulates_violations_in_category_order() {
    let mut doc = fixture();
    doc["tables"]["Hourly"]["columns"][5]["var"] = json!("zzz");
    doc["tables"]["Daily"]["prikey"] = json!(99);
    doc["tz"] = json!("Nowhere/Special");
    let errors = semantic_errors(&doc);
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], SemanticError::UnknownVariant { .. }));
    assert!(matches!(errors[1], SemanticError::InvalidPrimaryKey { .. }));
    assert!(matches!(errors[2], SemanticError::UnknownTimezone { .. }));
}
