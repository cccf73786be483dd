pub mod gallery;
pub mod panels;
pub mod plot;
pub mod table;

use crate::data::model::field;

/// Header text for a canonical column.
pub fn column_label(column: &str) -> String {
    let known = match column {
        field::DATETIME => Some("Date/Time"),
        field::FULL_NAME => Some("Driver"),
        field::PLATE => Some("Plate"),
        field::FLEET_NUMBER => Some("Fleet"),
        field::STATUS => Some("Status"),
        field::PHOTO_URL => Some("Photo"),
        _ => None,
    };
    if let Some(label) = known {
        return label.to_string();
    }
    let spaced = column.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}
