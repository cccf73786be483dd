use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use super::model::{field, Dataset};
use crate::error::ExportError;

const BASE_COLUMNS: &[&str] = &[
    field::DATETIME,
    field::FULL_NAME,
    field::PLATE,
    field::FLEET_NUMBER,
    field::STATUS,
];

const LOCATION_COLUMNS: &[&str] = &[
    field::CURRENT_CITY,
    field::DESTINATION,
    field::LOADING_CITY,
    field::UNLOADING_CITY,
    field::EMPTY_CITY,
];

const WAITING_COLUMNS: &[&str] = &[
    field::HOURS_WAITING_LOADING,
    field::HOURS_WAITING_UNLOADING,
    field::HOURS_WAITING_CARGO,
];

/// Columns shown in the data table (and exported): base columns, two location
/// columns, one waiting-time column and the photo link, whichever exist.
pub fn visible_columns(dataset: &Dataset) -> Vec<String> {
    let present = |cols: &'static [&'static str], limit: usize| {
        cols.iter()
            .copied()
            .filter(|c| dataset.has_column(c))
            .take(limit)
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    let mut columns = present(BASE_COLUMNS, BASE_COLUMNS.len());
    columns.extend(present(LOCATION_COLUMNS, 2));
    columns.extend(present(WAITING_COLUMNS, 1));
    if dataset.has_column(field::PHOTO_URL) {
        columns.push(field::PHOTO_URL.to_string());
    }
    columns
}

/// `vehicle_data_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("vehicle_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Header plus one line per record. Values are written verbatim; nulls are empty.
pub fn write_csv<W: Write>(dataset: &Dataset, columns: &[String], writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(columns)?;
    for record in &dataset.records {
        out.write_record(
            columns
                .iter()
                .map(|c| record.text(c).unwrap_or_default()),
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write the visible columns of `dataset` to `path`.
pub fn export_to_path(dataset: &Dataset, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(dataset, &visible_columns(dataset), std::io::BufWriter::new(file))?;
    log::info!("Exported {} check-ins to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::{CellValue, Record};

    fn dataset() -> Dataset {
        let record = |name: &str, photo: Option<&str>| Record {
            datetime: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0),
            first_name: name.into(),
            last_name: String::new(),
            full_name: name.into(),
            plate: Some("ABC1234".into()),
            fleet_number: Some(CellValue::Float(101.0)),
            status: "Vazio".into(),
            photo_url: photo.map(str::to_string),
            fields: BTreeMap::from([
                (field::DESTINATION.to_string(), CellValue::Text("Santos, SP".into())),
                (field::HOURS_WAITING_CARGO.to_string(), CellValue::Integer(4)),
            ]),
        };
        Dataset::new(
            vec![
                field::DATETIME.into(),
                field::PLATE.into(),
                field::FLEET_NUMBER.into(),
                field::STATUS.into(),
                field::DESTINATION.into(),
                field::HOURS_WAITING_CARGO.into(),
                "Observação".into(),
                field::FULL_NAME.into(),
                field::PHOTO_URL.into(),
            ],
            vec![
                record("Ana", Some("https://example.com/a.jpg")),
                record("Rui", None),
            ],
        )
    }

    #[test]
    fn visible_columns_follow_table_layout() {
        assert_eq!(
            visible_columns(&dataset()),
            vec![
                "datetime",
                "full_name",
                "plate",
                "fleet_number",
                "status",
                "destination",
                "hours_waiting_cargo",
                "photo_url",
            ]
        );
    }

    #[test]
    fn file_name_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 5, 9)
            .unwrap();
        assert_eq!(export_file_name(now), "vehicle_data_20241231_230509.csv");
    }

    #[test]
    fn csv_reproduces_values_verbatim() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(&ds, &visible_columns(&ds), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "datetime,full_name,plate,fleet_number,status,destination,hours_waiting_cargo,photo_url"
        );
        assert_eq!(
            lines[1],
            "2024-05-01 08:00:00,Ana,ABC1234,101,Vazio,\"Santos, SP\",4,https://example.com/a.jpg"
        );
        assert_eq!(
            lines[2],
            "2024-05-01 08:00:00,Rui,ABC1234,101,Vazio,\"Santos, SP\",4,"
        );
    }

    #[test]
    fn export_writes_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out.csv");
        export_to_path(&dataset(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }
}
