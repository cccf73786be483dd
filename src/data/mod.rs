/// Data layer: core types, import, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → rename headers → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, present columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  AND of criteria → filtered Dataset
///   └──────────┘
///        │
///        ├──▶ summary   counts per status, drill-down groups
///        └──▶ export    visible columns → CSV
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
