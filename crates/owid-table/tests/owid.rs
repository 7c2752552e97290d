//! OWID extension: entity indexing, time bounds, selection helpers.

use owid_model::{CellValue, Row, row_from_pairs};
use owid_table::{OwidTable, SELECTION_SLUG};

fn owid_rows() -> Vec<Row> {
    vec![
        row_from_pairs([
            ("entityName", CellValue::from("Iceland")),
            ("entityCode", CellValue::from("ISL")),
            ("entityId", 1.0.into()),
            ("year", 2019.0.into()),
            ("gdp", 20.0.into()),
        ]),
        row_from_pairs([
            ("entityName", CellValue::from("Iceland")),
            ("entityCode", CellValue::from("ISL")),
            ("entityId", 1.0.into()),
            ("year", 2020.0.into()),
            ("gdp", 21.0.into()),
            ("population", 364134.0.into()),
        ]),
        row_from_pairs([
            ("entityName", CellValue::from("France")),
            ("entityCode", CellValue::from("FRA")),
            ("entityId", 2.0.into()),
            ("year", 2020.0.into()),
            ("population", 67000000.0.into()),
        ]),
    ]
}

#[test]
fn entity_accessors_cover_all_rows() {
    let table = OwidTable::from_rows(owid_rows());
    assert_eq!(table.available_entities(), vec!["Iceland", "France"]);
    assert!(table.available_entities_set().contains("France"));
    assert_eq!(table.rows_by_entity_name("Iceland").len(), 2);
    assert_eq!(table.entity_index()["France"].len(), 1);
}

#[test]
fn entity_maps_are_bidirectional() {
    let table = OwidTable::from_rows(owid_rows());
    assert_eq!(table.entity_id_to_name_map()[&1], "Iceland");
    assert_eq!(table.entity_name_to_id_map()["France"], 2);
    assert_eq!(table.entity_code_to_name_map()["FRA"], "France");
    assert_eq!(table.entity_name_to_code_map()["Iceland"], "ISL");
}

#[test]
fn time_bounds_derive_from_years_only() {
    let table = OwidTable::from_rows(owid_rows());
    assert_eq!(table.min_time(), Some(2019));
    assert_eq!(table.max_time(), Some(2020));
    assert_eq!(table.all_times(), vec![2019, 2020]);

    let day_only = OwidTable::from_rows(vec![row_from_pairs([
        ("entityName", CellValue::from("Iceland")),
        ("entityCode", CellValue::from("ISL")),
        ("entityId", 1.0.into()),
        ("day", 3.0.into()),
    ])]);
    assert_eq!(day_only.min_time(), None);
    assert_eq!(day_only.max_time(), None);
    assert!(day_only.has_day_column());
}

#[test]
fn day_column_takes_time_axis_precedence() {
    let mut rows = owid_rows();
    rows[0].insert("day".to_string(), CellValue::Number(5.0));
    let table = OwidTable::from_rows(rows);
    assert_eq!(table.time_column().expect("time column").slug(), "day");
}

#[test]
fn entities_with_intersects_per_column_coverage() {
    let table = OwidTable::from_rows(owid_rows());
    // Single slug: direct pass-through.
    let gdp_only = table.entities_with(&["gdp"]);
    assert_eq!(gdp_only.len(), 1);
    assert!(gdp_only.contains("Iceland"));
    // Both slugs: only Iceland has gdp and population.
    let both = table.entities_with(&["gdp", "population"]);
    assert_eq!(both.len(), 1);
    assert!(both.contains("Iceland"));
    let population = table.entities_with(&["population"]);
    assert_eq!(population.len(), 2);
}

#[test]
fn selection_helpers_lazily_create_the_selection_column() {
    let mut table = OwidTable::from_rows(owid_rows());
    assert!(!table.has_column(SELECTION_SLUG));
    table.select_entity("Iceland");
    assert!(table.has_column(SELECTION_SLUG));
    assert_eq!(table.selected_rows().len(), 2);
    assert!(table.selected_entity_names().contains("Iceland"));

    table.deselect_entity("Iceland");
    assert!(table.selected_rows().is_empty());

    table.set_selected_entities(["France"]);
    assert_eq!(table.selected_rows().len(), 1);
    assert!(table.selected_entity_names().contains("France"));
}
