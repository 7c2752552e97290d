//! Filter and selection composition over the generic table core.

use owid_model::{CellValue, row_from_pairs};
use owid_table::Table;

fn population_rows() -> Vec<owid_model::Row> {
    vec![
        row_from_pairs([("name", CellValue::from("iceland")), ("population", 1.0.into())]),
        row_from_pairs([("name", CellValue::from("france")), ("population", 50.0.into())]),
        row_from_pairs([("name", CellValue::from("usa")), ("population", 300.0.into())]),
        row_from_pairs([("name", CellValue::from("canada")), ("population", 20.0.into())]),
    ]
}

#[test]
fn filters_compose_as_set_intersection() {
    let mut table = Table::from_rows(population_rows());
    table.add_filter_column(
        "population-filter",
        Box::new(|row, _| {
            row.get("population")
                .and_then(CellValue::as_f64)
                .unwrap_or(0.0)
                > 40.0
        }),
    );
    table.add_filter_column(
        "name-filter",
        Box::new(|row, _| {
            row.get("name")
                .and_then(CellValue::as_str)
                .is_some_and(|name| name.starts_with('u'))
        }),
    );
    let visible = table.unfiltered_rows();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["name"], CellValue::from("usa"));
}

#[test]
fn filter_results_are_written_back_into_rows() {
    let mut table = Table::from_rows(population_rows());
    table.add_filter_column(
        "population-filter",
        Box::new(|row, _| {
            row.get("population")
                .and_then(CellValue::as_f64)
                .unwrap_or(0.0)
                > 40.0
        }),
    );
    table.unfiltered_rows();
    assert_eq!(table.rows()[0]["population-filter"], CellValue::Boolean(false));
    assert_eq!(table.rows()[1]["population-filter"], CellValue::Boolean(true));
}

#[test]
fn no_filters_means_every_row_is_visible() {
    let mut table = Table::from_rows(population_rows());
    assert_eq!(table.unfiltered_rows().len(), 4);
}

#[test]
fn deleting_a_filter_column_restores_rows() {
    let mut table = Table::from_rows(population_rows());
    table.add_filter_column(
        "population-filter",
        Box::new(|row, _| {
            row.get("population")
                .and_then(CellValue::as_f64)
                .unwrap_or(0.0)
                > 40.0
        }),
    );
    assert_eq!(table.unfiltered_rows().len(), 2);
    table.delete_column_by_slug("population-filter");
    assert_eq!(table.unfiltered_rows().len(), 4);
    assert!(table.rows().iter().all(|row| !row.contains_key("population-filter")));
}
