use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Canonical field names
// ---------------------------------------------------------------------------

/// Internal column names, independent of the spreadsheet's header text.
pub mod field {
    pub const DATETIME: &str = "datetime";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const FULL_NAME: &str = "full_name";
    pub const PLATE: &str = "plate";
    pub const FLEET_NUMBER: &str = "fleet_number";
    pub const STATUS: &str = "status";
    pub const PHOTO: &str = "photo";
    pub const PHOTO_URL: &str = "photo_url";

    pub const LOADING_CITY: &str = "loading_city";
    pub const LOADING_CLIENT: &str = "loading_client";
    pub const HOURS_WAITING_LOADING: &str = "hours_waiting_loading";
    pub const CURRENT_LOADING_CITY: &str = "current_loading_city";
    pub const LOADING_CLIENT_2: &str = "loading_client_2";
    pub const DESTINATION: &str = "destination";
    pub const CURRENT_CITY: &str = "current_city";
    pub const UNLOADING_CITY: &str = "unloading_city";
    pub const UNLOADING_CLIENT: &str = "unloading_client";
    pub const HOURS_WAITING_UNLOADING: &str = "hours_waiting_unloading";
    pub const EMPTY_CITY: &str = "empty_city";
    pub const HAS_CARGO: &str = "has_cargo";
    pub const NEXT_CARGO_CITY: &str = "next_cargo_city";
    pub const HOURS_WAITING_CARGO: &str = "hours_waiting_cargo";
}

/// Status given to rows that did not answer the position question.
pub const STATUS_NOT_INFORMED: &str = "not informed";

// ---------------------------------------------------------------------------
// CellValue – a single non-null cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from the spreadsheet.
/// Null cells are `None` at the use site, never a variant.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

// -- Manual Eq/Ord so CellValue can be grouped and sorted --
// Floats compare by `total_cmp`, matching the bit-level hash.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Bool(_) => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
                DateTime(_) => 4,
            }
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::DateTime(d) => d.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Spreadsheets store every number as a float; 101.0 is typed as "101".
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one check-in row
// ---------------------------------------------------------------------------

/// One check-in (one row of the source spreadsheet).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub datetime: Option<NaiveDateTime>,
    pub first_name: String,
    pub last_name: String,
    /// `first_name + " " + last_name`, trimmed. Empty when both parts are.
    pub full_name: String,
    pub plate: Option<String>,
    pub fleet_number: Option<CellValue>,
    pub status: String,
    /// Raw photo reference as text; `None` when missing or empty.
    pub photo_url: Option<String>,
    /// Every other column: mapped location/client/hours answers and passthrough headers.
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Uniform access by canonical column name. `None` for null or unknown columns.
    pub fn value(&self, column: &str) -> Option<CellValue> {
        match column {
            field::DATETIME => self.datetime.map(CellValue::DateTime),
            field::FIRST_NAME => Some(CellValue::Text(self.first_name.clone())),
            field::LAST_NAME => Some(CellValue::Text(self.last_name.clone())),
            field::FULL_NAME => Some(CellValue::Text(self.full_name.clone())),
            field::PLATE => self.plate.clone().map(CellValue::Text),
            field::FLEET_NUMBER => self.fleet_number.clone(),
            field::STATUS => Some(CellValue::Text(self.status.clone())),
            field::PHOTO_URL => self.photo_url.clone().map(CellValue::Text),
            other => self.fields.get(other).cloned(),
        }
    }

    /// Text rendering of a column, as shown in tables and exports.
    pub fn text(&self, column: &str) -> Option<String> {
        self.value(column).map(|v| v.to_string())
    }

    /// Fleet number compared as text.
    pub fn fleet_text(&self) -> Option<String> {
        self.fleet_number.as_ref().map(|v| v.to_string())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.datetime.map(|dt| dt.date())
    }
}

// ---------------------------------------------------------------------------
// Dataset – an immutable imported (or filtered) table
// ---------------------------------------------------------------------------

/// A table of check-ins in file row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Columns present in this dataset, by canonical name, in display order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { columns, records }
    }

    /// Whether the source had this column. Absent columns are never synthesized.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Same schema, different rows. Used to build filtered snapshots.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
