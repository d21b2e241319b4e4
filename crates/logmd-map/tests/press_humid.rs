//! Applies a view mapping to a table loaded from a real document.

use std::path::Path;

use logmd_map::apply_view;
use logmd_model::BaseColumn;
use logmd_validate::load_logger_metadata;

#[test]
fn loaded_mapping_projects_the_documented_view() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../logmd-validate/tests/fixtures/TestLogger.json");
    let md = load_logger_metadata(path).expect("document loads");
    let hourly = md.table("Hourly").expect("Hourly exists");
    let mapping = hourly.mapping("Press_Humid").expect("mapping exists");

    let view = apply_view(hourly, mapping).expect("view applies");
    assert_eq!(
        view,
        vec![
            BaseColumn {
                name: "Timestamp".to_string(),
                unit: Some("TS".to_string()),
                prc: None,
            },
            BaseColumn {
                name: "BPress_Avg".to_string(),
                unit: Some("mbar".to_string()),
                prc: Some("Avg".to_string()),
            },
            BaseColumn {
                name: "RH_Smp".to_string(),
                unit: Some("%".to_string()),
                prc: Some("Smp".to_string()),
            },
        ]
    );
}
