//! Legacy wire-format loading.

use owid_model::CellValue;
use owid_table::OwidTable;

fn one_variable_payload() -> &'static str {
    r#"{
        "variables": {
            "2": {
                "id": 2,
                "name": "Population",
                "unit": "people",
                "datasetName": "Demographics",
                "years": [2019, 2020, 2020],
                "entities": [1, 1, 2],
                "values": [5.5, 4.2, 12.6]
            }
        },
        "entityKey": {
            "1": { "name": "Iceland", "code": "ISL" },
            "2": { "name": "France", "code": "FRA" }
        }
    }"#
}

#[test]
fn one_variable_produces_one_row_per_value() {
    let table = OwidTable::from_legacy_json(one_variable_payload()).expect("load");
    assert_eq!(table.num_rows(), 3);
    for row in table.rows() {
        assert!(row.contains_key("Population"));
        assert!(row.contains_key("entityName"));
        assert!(row.contains_key("entityCode"));
        assert!(row.contains_key("entityId"));
        assert!(row.contains_key("year"));
    }
    let first = &table.rows()[0];
    assert_eq!(first["entityName"], CellValue::from("Iceland"));
    assert_eq!(first["entityCode"], CellValue::from("ISL"));
    assert_eq!(first["entityId"], CellValue::Number(1.0));
    assert_eq!(first["year"], CellValue::Number(2019.0));
    assert_eq!(first["Population"], CellValue::Number(5.5));
}

#[test]
fn unit_conversion_rewrites_a_single_column_in_place() {
    let mut table = OwidTable::from_legacy_json(one_variable_payload()).expect("load");
    let modified = table.apply_unit_conversion_and_overwrite_legacy_column(100.0, "Population");
    assert_eq!(modified, 3);
    // Row order after the [year, day] sort: Iceland 2019, France 2020,
    // Iceland 2020.
    let values: Vec<f64> = table
        .rows()
        .iter()
        .filter_map(|row| row.get("Population").and_then(CellValue::as_f64))
        .collect();
    assert_eq!(values, vec![550.0, 1260.0, 420.0]);
}

#[test]
fn variables_sharing_time_and_entity_merge_into_one_row() {
    let json = r#"{
        "variables": {
            "2": {
                "id": 2, "name": "Population",
                "years": [2020], "entities": [1], "values": [364134]
            },
            "3": {
                "id": 3, "name": "GDP",
                "years": [2020], "entities": [1], "values": [21700]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    assert_eq!(table.num_rows(), 1);
    let row = &table.rows()[0];
    assert_eq!(row["Population"], CellValue::Number(364134.0));
    assert_eq!(row["GDP"], CellValue::Number(21700.0));
}

#[test]
fn duplicate_time_entity_values_keep_the_later_one() {
    let json = r#"{
        "variables": {
            "2": {
                "id": 2, "name": "Population",
                "years": [2020, 2020], "entities": [1, 1], "values": [1, 2]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.rows()[0]["Population"], CellValue::Number(2.0));
}

#[test]
fn daily_variables_register_a_day_column_and_normalize_epochs() {
    // zeroDay 2020-01-01 is 20 days before the reference epoch, so offset
    // 22 lands on offset 2.
    let json = r#"{
        "variables": {
            "4": {
                "id": 4, "name": "Cases",
                "display": { "yearIsDay": true, "zeroDay": "2020-01-01" },
                "years": [22], "entities": [1], "values": [10]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    assert!(table.has_day_column());
    assert_eq!(table.rows()[0]["day"], CellValue::Number(2.0));
    assert!(!table.rows()[0].contains_key("year"));
}

#[test]
fn mixed_daily_and_yearly_variables_prefer_the_day_axis() {
    let json = r#"{
        "variables": {
            "2": {
                "id": 2, "name": "Population",
                "years": [2020], "entities": [1], "values": [364134]
            },
            "4": {
                "id": 4, "name": "Cases",
                "display": { "yearIsDay": true },
                "years": [3], "entities": [1], "values": [10]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    assert!(table.has_column("year"));
    assert!(table.has_column("day"));
    let time = table.time_column().expect("time column");
    assert_eq!(time.slug(), "day");
}

#[test]
fn continent_variable_is_relabeled() {
    let json = r#"{
        "variables": {
            "123": {
                "id": 123, "name": "Countries Continents",
                "years": [2015], "entities": [1], "values": ["Europe"]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    let column = table.column_by_slug("Continent").expect("continent column");
    assert_eq!(column.spec.display_name(), "Continent");
    assert_eq!(table.rows()[0]["Continent"], CellValue::from("Europe"));
}

#[test]
fn entity_annotations_group_free_text_by_entity() {
    let json = r#"{
        "variables": {
            "5": {
                "id": 5, "name": "Cases",
                "display": {
                    "entityAnnotationsMap": "Iceland: includes dependencies: all\nFrance:"
                },
                "years": [2019, 2020], "entities": [1, 1], "values": [1, 2]
            }
        },
        "entityKey": {
            "1": { "name": "Iceland", "code": "ISL" },
            "2": { "name": "France", "code": "FRA" }
        }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    let spec = &table.column_by_slug("Cases").expect("cases column").spec;
    assert_eq!(spec.annotations_column_slug.as_deref(), Some("Cases-annotations"));
    // The first colon splits entity from text; later colons stay in the
    // text. Both of Iceland's rows carry the annotation.
    for row in table.rows() {
        assert_eq!(
            row["Cases-annotations"],
            CellValue::from("includes dependencies: all")
        );
    }
}

#[test]
fn day_only_rows_sort_after_yearly_rows() {
    let json = r#"{
        "variables": {
            "4": {
                "id": 4, "name": "Cases",
                "display": { "yearIsDay": true },
                "years": [3], "entities": [1], "values": [10]
            },
            "2": {
                "id": 2, "name": "Population",
                "years": [2020], "entities": [1], "values": [364134]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    assert_eq!(table.num_rows(), 2);
    // Rows without a year key sort after every yearly row.
    assert_eq!(table.rows()[0]["year"], CellValue::Number(2020.0));
    assert_eq!(table.rows()[1]["day"], CellValue::Number(3.0));
    assert!(!table.rows()[1].contains_key("year"));
}

#[test]
fn merged_rows_sort_by_year_then_day() {
    let json = r#"{
        "variables": {
            "2": {
                "id": 2, "name": "Population",
                "years": [2021, 2019, 2020], "entities": [1, 1, 1],
                "values": [3, 1, 2]
            }
        },
        "entityKey": { "1": { "name": "Iceland", "code": "ISL" } }
    }"#;
    let table = OwidTable::from_legacy_json(json).expect("load");
    let years: Vec<f64> = table
        .rows()
        .iter()
        .filter_map(|row| row.get("year").and_then(CellValue::as_f64))
        .collect();
    assert_eq!(years, vec![2019.0, 2020.0, 2021.0]);
}
