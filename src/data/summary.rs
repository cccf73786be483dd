use std::collections::{HashMap, HashSet};

use super::model::{field, CellValue, Dataset};

/// Status answers that get a dedicated drill-down.
pub const STATUS_WAITING_LOADING: &str = "Aguardando carregamento";
pub const STATUS_WAITING_UNLOADING: &str = "Aguardando descarga";
pub const STATUS_EMPTY: &str = "Vazio";

/// Answer to "already has cargo?" counted as yes.
const HAS_CARGO_YES: &str = "Sim";

// ---------------------------------------------------------------------------
// Tallies
// ---------------------------------------------------------------------------

/// Count records per raw value of `column`, nulls excluded.
///
/// Values of different kinds stay apart: `Integer(101)` and `Text("101")` are
/// two entries even though they display alike. Ordered by count (highest
/// first), ties by first appearance.
pub fn count_by(dataset: &Dataset, column: &str) -> Vec<(CellValue, usize)> {
    let mut counts: Vec<(CellValue, usize)> = Vec::new();
    let mut slot: HashMap<CellValue, usize> = HashMap::new();

    for value in dataset.records.iter().filter_map(|r| r.value(column)) {
        match slot.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Number of distinct non-null values, or `None` when the column is absent.
pub fn distinct_count(dataset: &Dataset, column: &str) -> Option<usize> {
    if !dataset.has_column(column) {
        return None;
    }
    let distinct: HashSet<String> = dataset
        .records
        .iter()
        .filter_map(|r| r.text(column))
        .collect();
    Some(distinct.len())
}

/// Headline numbers for the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total: usize,
    pub with_photo: usize,
    pub by_status: Vec<(String, usize)>,
}

pub fn overview(dataset: &Dataset) -> Overview {
    Overview {
        total: dataset.len(),
        with_photo: dataset
            .records
            .iter()
            .filter(|r| r.photo_url.is_some())
            .count(),
        by_status: count_by(dataset, field::STATUS)
            .into_iter()
            .map(|(status, n)| (status.to_string(), n))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Per-status drill-down
// ---------------------------------------------------------------------------

/// Records sharing one status, with the metrics relevant to that status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusGroup {
    pub status: String,
    /// Indices into the dataset's records.
    pub records: Vec<usize>,
    pub cities: Option<usize>,
    pub clients: Option<usize>,
    /// Empty trucks that already have their next load lined up.
    pub with_cargo: Option<usize>,
}

impl StatusGroup {
    pub fn total(&self) -> usize {
        self.records.len()
    }
}

/// One group per status, in order of first appearance.
pub fn status_groups(dataset: &Dataset) -> Vec<StatusGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, r) in dataset.records.iter().enumerate() {
        let entry = members.entry(r.status.as_str()).or_default();
        if entry.is_empty() {
            order.push(r.status.as_str());
        }
        entry.push(i);
    }

    order
        .into_iter()
        .map(|status| {
            let records = members.remove(status).unwrap_or_default();
            let subset = dataset.with_records(
                records
                    .iter()
                    .map(|&i| dataset.records[i].clone())
                    .collect(),
            );
            let (cities, clients, with_cargo) = match status {
                STATUS_WAITING_LOADING => (
                    distinct_count(&subset, field::LOADING_CITY),
                    distinct_count(&subset, field::LOADING_CLIENT),
                    None,
                ),
                STATUS_WAITING_UNLOADING => (
                    distinct_count(&subset, field::UNLOADING_CITY),
                    distinct_count(&subset, field::UNLOADING_CLIENT),
                    None,
                ),
                STATUS_EMPTY => (
                    distinct_count(&subset, field::EMPTY_CITY),
                    None,
                    subset.has_column(field::HAS_CARGO).then(|| {
                        subset
                            .records
                            .iter()
                            .filter(|r| r.text(field::HAS_CARGO).as_deref() == Some(HAS_CARGO_YES))
                            .count()
                    }),
                ),
                _ => (None, None, None),
            };
            StatusGroup {
                status: status.to_string(),
                records,
                cities,
                clients,
                with_cargo,
            }
        })
        .collect()
}

/// Column-name fragments marking a place column, in canonical and form spelling.
const PLACE_MARKERS: &[&str] = &["city", "client", "cidade", "cliente"];

/// Columns listed inside a status drill-down: identity columns, then up to three
/// city/client columns, including unmapped form headers such as "Cidade de origem".
pub fn drill_down_columns(dataset: &Dataset) -> Vec<String> {
    let mut columns: Vec<String> = [field::FULL_NAME, field::PLATE, field::FLEET_NUMBER]
        .into_iter()
        .filter(|c| dataset.has_column(c))
        .map(str::to_string)
        .collect();
    columns.extend(
        dataset
            .columns
            .iter()
            .filter(|c| {
                let lower = c.to_lowercase();
                PLACE_MARKERS.iter().any(|m| lower.contains(m))
            })
            .take(3)
            .cloned(),
    );
    columns
}
