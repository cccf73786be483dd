use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{field, Dataset, Record};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Inclusive range over the date part of `datetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Operator-selected criteria. `None` means "match all" for that field.
/// The default value is the identity filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: Option<String>,
    pub plate: Option<String>,
    /// Compared against the fleet number's text form.
    pub fleet_number: Option<String>,
    pub driver_full_name: Option<String>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// Whether every option is unset.
    pub fn is_identity(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// A record passes when it satisfies every set criterion.
    ///
    /// Criteria on columns the dataset does not have are ignored; the
    /// filter widgets for those columns are never offered.
    pub fn matches(&self, dataset: &Dataset, record: &Record) -> bool {
        if let Some(status) = &self.status {
            if dataset.has_column(field::STATUS) && record.status != *status {
                return false;
            }
        }
        if let Some(plate) = &self.plate {
            if dataset.has_column(field::PLATE) && record.plate.as_ref() != Some(plate) {
                return false;
            }
        }
        if let Some(fleet) = &self.fleet_number {
            if dataset.has_column(field::FLEET_NUMBER)
                && record.fleet_text().as_ref() != Some(fleet)
            {
                return false;
            }
        }
        if let Some(driver) = &self.driver_full_name {
            if record.full_name != *driver {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if dataset.has_column(field::DATETIME) {
                // Rows without a timestamp never fall inside a period.
                match record.date() {
                    Some(date) if range.contains(date) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// One line per set criterion, for showing what the current view is filtered by.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(status) = &self.status {
            lines.push(format!("Status: {status}"));
        }
        if let Some(plate) = &self.plate {
            lines.push(format!("Plate: {plate}"));
        }
        if let Some(fleet) = &self.fleet_number {
            lines.push(format!("Fleet: {fleet}"));
        }
        if let Some(driver) = &self.driver_full_name {
            lines.push(format!("Driver: {driver}"));
        }
        if let Some(range) = &self.date_range {
            lines.push(format!("Period: {} to {}", range.start, range.end));
        }
        lines
    }
}

/// Rows of `dataset` passing every set criterion, in original order.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    if criteria.is_identity() {
        return dataset.clone();
    }
    let records = dataset
        .records
        .iter()
        .filter(|r| criteria.matches(dataset, r))
        .cloned()
        .collect();
    dataset.with_records(records)
}

// ---------------------------------------------------------------------------
// Filter options: the values offered by each widget
// ---------------------------------------------------------------------------

/// Selectable values per filter, computed from a full dataset.
/// A list is empty when the dataset lacks that column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub plates: Vec<String>,
    pub fleet_numbers: Vec<String>,
    pub drivers: Vec<String>,
    /// Earliest and latest date among valid timestamps.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        fn sorted_unique<'a>(
            dataset: &'a Dataset,
            column: &str,
            value: impl Fn(&'a Record) -> Option<String>,
        ) -> Vec<String> {
            if !dataset.has_column(column) {
                return Vec::new();
            }
            dataset
                .records
                .iter()
                .filter_map(value)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let statuses = sorted_unique(dataset, field::STATUS, |r| Some(r.status.clone()));
        let plates = sorted_unique(dataset, field::PLATE, |r| r.plate.clone());
        let fleet_numbers = sorted_unique(dataset, field::FLEET_NUMBER, Record::fleet_text);
        let drivers = sorted_unique(dataset, field::FULL_NAME, |r| Some(r.full_name.clone()));

        let date_bounds = if dataset.has_column(field::DATETIME) {
            let dates = dataset.records.iter().filter_map(Record::date);
            dates.fold(None, |bounds, d| match bounds {
                None => Some((d, d)),
                Some((lo, hi)) => Some((d.min(lo), d.max(hi))),
            })
        } else {
            None
        };

        FilterOptions {
            statuses,
            plates,
            fleet_numbers,
            drivers,
            date_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::CellValue;

    fn record(status: &str, plate: &str, fleet: i64, name: &str, date: Option<(i32, u32, u32)>) -> Record {
        Record {
            datetime: date.map(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap()
            }),
            first_name: name.into(),
            last_name: String::new(),
            full_name: name.into(),
            plate: Some(plate.into()),
            fleet_number: Some(CellValue::Integer(fleet)),
            status: status.into(),
            photo_url: None,
            fields: BTreeMap::new(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                field::DATETIME.into(),
                field::PLATE.into(),
                field::FLEET_NUMBER.into(),
                field::STATUS.into(),
                field::FULL_NAME.into(),
            ],
            vec![
                record("Vazio", "ABC1234", 101, "Ana", Some((2024, 5, 1))),
                record("Vazio", "XYZ9876", 102, "Rui", Some((2024, 5, 3))),
                record("Aguardando descarga", "JKL5555", 103, "Ana", None),
            ],
        )
    }

    #[test]
    fn identity_returns_everything_in_order() {
        let ds = dataset();
        let out = filter(&ds, &FilterCriteria::default());
        assert_eq!(out, ds);
    }

    #[test]
    fn criteria_are_combined_with_and() {
        let ds = dataset();
        let criteria = FilterCriteria {
            status: Some("Vazio".into()),
            plate: Some("ABC1234".into()),
            ..Default::default()
        };
        let out = filter(&ds, &criteria);
        assert_eq!(out.records, vec![ds.records[0].clone()]);
        assert_eq!(out.columns, ds.columns);
    }

    #[test]
    fn date_range_is_inclusive_and_skips_missing_dates() {
        let ds = dataset();
        let criteria = FilterCriteria {
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            }),
            ..Default::default()
        };
        let out = filter(&ds, &criteria);
        let plates: Vec<_> = out.records.iter().map(|r| r.plate.clone().unwrap()).collect();
        assert_eq!(plates, vec!["ABC1234", "XYZ9876"]);

        let single_day = FilterCriteria {
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            }),
            ..Default::default()
        };
        assert_eq!(filter(&ds, &single_day).len(), 1);
    }

    #[test]
    fn fleet_number_compares_as_text() {
        let ds = dataset();
        let criteria = FilterCriteria {
            fleet_number: Some("102".into()),
            ..Default::default()
        };
        let out = filter(&ds, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records[0].full_name, "Rui");

        let padded = FilterCriteria {
            fleet_number: Some("0102".into()),
            ..Default::default()
        };
        assert!(filter(&ds, &padded).is_empty());
    }

    #[test]
    fn driver_filter_keeps_every_match_in_order() {
        let ds = dataset();
        let criteria = FilterCriteria {
            driver_full_name: Some("Ana".into()),
            ..Default::default()
        };
        let out = filter(&ds, &criteria);
        let statuses: Vec<_> = out.records.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, vec!["Vazio", "Aguardando descarga"]);
    }

    #[test]
    fn criteria_on_absent_columns_are_ignored() {
        let mut ds = dataset();
        ds.columns.retain(|c| c != field::PLATE && c != field::DATETIME);
        let criteria = FilterCriteria {
            plate: Some("nope".into()),
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            }),
            ..Default::default()
        };
        assert_eq!(filter(&ds, &criteria).len(), 3);
    }

    #[test]
    fn options_are_sorted_unique_values() {
        let opts = FilterOptions::from_dataset(&dataset());
        assert_eq!(opts.statuses, vec!["Aguardando descarga", "Vazio"]);
        assert_eq!(opts.fleet_numbers, vec!["101", "102", "103"]);
        assert_eq!(opts.drivers, vec!["Ana", "Rui"]);
        assert_eq!(
            opts.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
            ))
        );
    }

    #[test]
    fn options_have_no_dates_without_valid_timestamps() {
        let mut ds = dataset();
        for r in &mut ds.records {
            r.datetime = None;
        }
        assert_eq!(FilterOptions::from_dataset(&ds).date_bounds, None);
    }

    #[test]
    fn describe_lists_only_set_criteria() {
        assert!(FilterCriteria::default().describe().is_empty());
        let criteria = FilterCriteria {
            fleet_number: Some("007".into()),
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            }),
            ..Default::default()
        };
        assert_eq!(
            criteria.describe(),
            vec!["Fleet: 007", "Period: 2024-05-01 to 2024-05-03"]
        );
    }
}
