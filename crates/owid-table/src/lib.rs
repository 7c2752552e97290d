pub mod column;
pub mod delimited;
pub mod legacy;
pub mod owid;
pub mod rolling;
pub mod table;

pub use column::{Column, ColumnRole, ComputeFn, PredicateFn};
pub use owid::{OwidTable, SELECTION_SLUG};
pub use rolling::RollingAverageOptions;
pub use table::Table;
