//! Legacy wire-format types.
//!
//! The legacy format is sparse: one record per variable with parallel
//! `years`/`entities`/`values` arrays, plus a separate `entityKey` map
//! resolving integer entity ids to names and codes. The engine crate
//! densifies this into one row per entity/time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::DisplaySettings;
use crate::value::CellValue;

/// Top-level legacy payload: variables plus the entity key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyVariablesAndEntityKey {
    pub variables: BTreeMap<String, LegacyVariable>,
    pub entity_key: BTreeMap<String, LegacyEntityRecord>,
}

/// One variable's worth of sparse data and metadata.
///
/// `years`, `entities` and `values` are parallel arrays; absent `years` or
/// `entities` default to empty. When `display.yearIsDay` is set the
/// `years` array actually holds day offsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyVariable {
    pub id: i64,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub short_unit: Option<String>,
    pub description: Option<String>,
    pub coverage: Option<String>,
    pub dataset_id: Option<i64>,
    pub dataset_name: Option<String>,
    pub source: Option<LegacyVariableSource>,
    pub display: Option<DisplaySettings>,
    pub years: Vec<i64>,
    pub entities: Vec<i64>,
    pub values: Vec<CellValue>,
}

/// Provenance record attached to a legacy variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyVariableSource {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Entry in the legacy `entityKey` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyEntityRecord {
    pub id: Option<i64>,
    pub name: String,
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_with_mixed_value_types() {
        let json = r#"{
            "variables": {
                "42": {
                    "id": 42,
                    "name": "Population",
                    "years": [2019, 2020],
                    "entities": [1, 1],
                    "values": [360000, "360100"]
                }
            },
            "entityKey": {
                "1": { "name": "Iceland", "code": "ISL" }
            }
        }"#;
        let payload: LegacyVariablesAndEntityKey =
            serde_json::from_str(json).expect("parse legacy payload");
        let variable = &payload.variables["42"];
        assert_eq!(variable.years, vec![2019, 2020]);
        assert_eq!(variable.values[0], CellValue::Number(360000.0));
        assert_eq!(variable.values[1], CellValue::Text("360100".to_string()));
        assert_eq!(payload.entity_key["1"].name, "Iceland");
    }

    #[test]
    fn absent_arrays_default_to_empty() {
        let json = r#"{ "variables": { "7": { "id": 7 } }, "entityKey": {} }"#;
        let payload: LegacyVariablesAndEntityKey =
            serde_json::from_str(json).expect("parse legacy payload");
        let variable = &payload.variables["7"];
        assert!(variable.years.is_empty());
        assert!(variable.entities.is_empty());
        assert!(variable.values.is_empty());
    }
}
