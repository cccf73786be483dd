use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use super::model::{field, CellValue, Dataset, Record, STATUS_NOT_INFORMED};
use crate::error::ImportError;

// ---------------------------------------------------------------------------
// Header vocabulary
// ---------------------------------------------------------------------------

/// Form question (spreadsheet header) → canonical column name.
/// Headers not listed here are kept verbatim.
const HEADER_MAP: &[(&str, &str)] = &[
    ("DateTime", field::DATETIME),
    ("Nome", field::FIRST_NAME),
    ("Sobrenome", field::LAST_NAME),
    ("Placa Veículo", field::PLATE),
    ("Número de Frota", field::FLEET_NUMBER),
    ("Qual a sua posição atual?", field::STATUS),
    (
        "Qual a cidade em que esta aguardando o carregamento?",
        field::LOADING_CITY,
    ),
    ("Em qual cliente você está?", field::LOADING_CLIENT),
    (
        "Há quantas horas você esta aguardando para carregar?",
        field::HOURS_WAITING_LOADING,
    ),
    (
        "Em qual cidade você esta carregando?",
        field::CURRENT_LOADING_CITY,
    ),
    ("Em qual cliente você está? 2", field::LOADING_CLIENT_2),
    ("Qual a cidade de destino?", field::DESTINATION),
    ("Qual a cidade que você esta agora?", field::CURRENT_CITY),
    ("Aguardando descarga em qual cidade?", field::UNLOADING_CITY),
    ("Aguardando descarga em qual cliente?", field::UNLOADING_CLIENT),
    (
        "Há quantas horas esta aguardando a descarga?",
        field::HOURS_WAITING_UNLOADING,
    ),
    ("Está vazio em qual cidade?", field::EMPTY_CITY),
    ("Já tem carga?", field::HAS_CARGO),
    (
        "Se sim, qual a cidade em que vai carregar?",
        field::NEXT_CARGO_CITY,
    ),
    (
        "Se não tem carga, por favor informar há quantas horas esta aguardando?",
        field::HOURS_WAITING_CARGO,
    ),
    ("TIRAR FOTO DO KM ATUAL DO VEÍCULO", field::PHOTO),
];

/// Canonical name for a source header.
pub fn canonical_name(header: &str) -> &str {
    HEADER_MAP
        .iter()
        .find(|(source, _)| *source == header)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(header)
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// How the input bytes are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Anything calamine reads: xlsx, xlsm, xlsb, xls, ods.
    Spreadsheet,
    Csv,
}

impl SourceFormat {
    /// Format from the file extension, if it is one we know.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            "csv" | "txt" => Some(SourceFormat::Csv),
            _ => None,
        }
    }

    /// Guess from the content: ZIP (xlsx/ods) and OLE (xls) containers are spreadsheets.
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SourceFormat::Spreadsheet
        } else {
            SourceFormat::Csv
        }
    }
}

/// Import a check-in file from disk. Format by extension, else by content.
pub fn load_file(path: &Path) -> Result<Dataset, ImportError> {
    let bytes = read_bytes(path)?;
    let format = SourceFormat::from_extension(path).unwrap_or_else(|| SourceFormat::sniff(&bytes));
    import_as(&bytes, format)
}

/// Import raw file bytes, detecting the format from the content.
pub fn import(bytes: &[u8]) -> Result<Dataset, ImportError> {
    import_as(bytes, SourceFormat::sniff(bytes))
}

/// Import raw file bytes in a known format.
///
/// Either the whole file becomes a [`Dataset`] or an [`ImportError`] is returned;
/// per-cell problems (such as an unparseable timestamp) only null that cell.
pub fn import_as(bytes: &[u8], format: SourceFormat) -> Result<Dataset, ImportError> {
    let raw = match format {
        SourceFormat::Spreadsheet => read_spreadsheet(bytes)?,
        SourceFormat::Csv => read_csv(bytes)?,
    };
    let dataset = normalize(raw);
    log::info!(
        "Imported {} check-ins with columns {:?}",
        dataset.len(),
        dataset.columns
    );
    Ok(dataset)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ImportError> {
    std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Raw table readers
// ---------------------------------------------------------------------------

/// Header row plus typed cells, before any renaming.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<CellValue>>>,
}

fn unnamed(index: usize) -> String {
    format!("Unnamed: {index}")
}

/// First worksheet; first row is the header.
fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)??;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ImportError::MissingHeader)?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match spreadsheet_cell(cell) {
            Some(value) => value.to_string(),
            None => unnamed(i),
        })
        .collect();

    let rows = rows
        .map(|row| {
            (0..headers.len())
                .map(|i| row.get(i).and_then(spreadsheet_cell))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Integer(*i)),
        Data::Float(f) => Some(CellValue::Float(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(dt.as_f64())),
        ),
        Data::DateTimeIso(s) => Some(
            parse_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
        ),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

/// CSV layout: header row, `;` or `,` separated, UTF-8.
fn read_csv(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                unnamed(i)
            } else {
                h.to_string()
            }
        })
        .collect();
    if headers.is_empty() {
        return Err(ImportError::MissingHeader);
    }

    let text_only: Vec<bool> = headers
        .iter()
        .map(|h| TEXT_COLUMNS.contains(&canonical_name(h)))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<Option<CellValue>> = (0..headers.len())
            .map(|i| {
                let raw = record.get(i)?;
                if text_only[i] {
                    (!raw.is_empty()).then(|| CellValue::Text(raw.to_string()))
                } else {
                    guess_cell_type(raw)
                }
            })
            .collect();
        if cells.iter().any(Option::is_some) {
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    if first_line.contains(&b';') {
        b';'
    } else {
        b','
    }
}

/// Columns whose CSV cells are never reinterpreted as numbers.
const TEXT_COLUMNS: &[&str] = &[
    field::FIRST_NAME,
    field::LAST_NAME,
    field::PLATE,
    field::STATUS,
    field::PHOTO,
];

/// Optional sign, digits, optional fraction. Rejects `nan`/`inf` spellings
/// and exponents, which `f64::from_str` would otherwise accept.
fn is_plain_number(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((int_part, frac_part)) => all_digits(int_part) && all_digits(frac_part),
        None => all_digits(unsigned),
    }
}

/// Type a CSV cell. A number is only kept when it renders back exactly as
/// typed, so "007", "1.50" and "-0" stay text.
fn guess_cell_type(s: &str) -> Option<CellValue> {
    if s.is_empty() {
        return None;
    }
    if is_plain_number(s) {
        let number = match s.parse::<i64>() {
            Ok(i) => Some(CellValue::Integer(i)),
            Err(_) => s.parse::<f64>().ok().map(CellValue::Float),
        };
        if let Some(value) = number.filter(|v| v.to_string() == s) {
            return Some(value);
        }
    }
    if s == "true" || s == "false" {
        return Some(CellValue::Bool(s == "true"));
    }
    Some(CellValue::Text(s.to_string()))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Permissive timestamp parsing. Ambiguous dates are read day-first.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn datetime_cell(value: CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(dt),
        CellValue::Text(s) => parse_datetime(&s),
        _ => None,
    }
}

/// Rename headers, derive `full_name`/`photo_url`, default `status`, parse `datetime`.
fn normalize(raw: RawTable) -> Dataset {
    let renamed: Vec<String> = raw
        .headers
        .iter()
        .map(|h| canonical_name(h).to_string())
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(renamed.len() + 3);
    for name in &renamed {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    let had_status = columns.iter().any(|c| c == field::STATUS);
    for derived in [field::FULL_NAME, field::PHOTO_URL, field::STATUS] {
        if !columns.iter().any(|c| c == derived) {
            columns.push(derived.to_string());
        }
    }
    if !had_status {
        log::debug!("No status column; every row is '{STATUS_NOT_INFORMED}'");
    }

    let mut bad_datetimes = 0usize;
    let records: Vec<Record> = raw
        .rows
        .into_iter()
        .map(|row| {
            let mut cells: BTreeMap<String, CellValue> = renamed
                .iter()
                .zip(row)
                .filter_map(|(name, value)| value.map(|v| (name.clone(), v)))
                .collect();

            let datetime = cells.remove(field::DATETIME).and_then(|v| {
                let parsed = datetime_cell(v);
                if parsed.is_none() {
                    bad_datetimes += 1;
                }
                parsed
            });
            let first_name = cells
                .remove(field::FIRST_NAME)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let last_name = cells
                .remove(field::LAST_NAME)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let full_name = format!("{first_name} {last_name}").trim().to_string();
            let plate = cells.remove(field::PLATE).map(|v| v.to_string());
            let fleet_number = cells.remove(field::FLEET_NUMBER);
            let status = cells
                .remove(field::STATUS)
                .map(|v| v.to_string())
                .unwrap_or_else(|| STATUS_NOT_INFORMED.to_string());
            let photo_url = cells
                .get(field::PHOTO)
                .map(|v| v.to_string())
                .filter(|url| !url.is_empty());

            Record {
                datetime,
                first_name,
                last_name,
                full_name,
                plate,
                fleet_number,
                status,
                photo_url,
                fields: cells,
            }
        })
        .collect();

    if bad_datetimes > 0 {
        log::debug!("{bad_datetimes} timestamp(s) could not be parsed and were left empty");
    }

    Dataset::new(columns, records)
}

// ---------------------------------------------------------------------------
// Import memoization
// ---------------------------------------------------------------------------

/// Imported snapshots keyed by content hash, so reloading the same file is free.
pub struct ImportCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, Arc<Dataset>>,
}

impl ImportCache {
    pub fn new(capacity: usize) -> Self {
        ImportCache {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    /// Import `bytes`, or return the snapshot already built from identical bytes.
    /// Without a known `format` the content decides, as in [`import`].
    pub fn import(
        &mut self,
        bytes: &[u8],
        format: Option<SourceFormat>,
    ) -> Result<Arc<Dataset>, ImportError> {
        let key = content_key(bytes, format.unwrap_or_else(|| SourceFormat::sniff(bytes)));
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("Import cache hit ({} check-ins)", dataset.len());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(match format {
            Some(format) => import_as(bytes, format)?,
            None => import(bytes)?,
        });
        if self.capacity > 0 {
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
            }
            self.order.push_back(key.clone());
            self.entries.insert(key, Arc::clone(&dataset));
            log::debug!("Import cache holds {} snapshot(s)", self.len());
        }
        Ok(dataset)
    }

    /// Read a file and import it through the cache. A zero-capacity cache
    /// imports directly without hashing.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<Dataset>, ImportError> {
        if self.capacity == 0 {
            return load_file(path).map(Arc::new);
        }
        let bytes = read_bytes(path)?;
        self.import(&bytes, SourceFormat::from_extension(path))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn content_key(bytes: &[u8], format: SourceFormat) -> String {
    let digest = Sha256::digest(bytes);
    format!("{format:?}:{}", hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    const HEADER: &str = "DateTime,Nome,Sobrenome,Placa Veículo,Número de Frota,\
Qual a sua posição atual?,Qual a cidade que você esta agora?,Observação,TIRAR FOTO DO KM ATUAL DO VEÍCULO";

    fn csv_dataset(lines: &[&str]) -> Dataset {
        let mut text = String::from(HEADER);
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        import_as(text.as_bytes(), SourceFormat::Csv).expect("csv import")
    }

    #[test]
    fn full_name_joins_and_trims() {
        let ds = csv_dataset(&[
            "2024-05-01 08:00:00,Ana,,ABC1234,101,Vazio,Curitiba,,",
            "2024-05-01 09:00:00,,,XYZ9876,102,Vazio,Curitiba,,",
            "2024-05-01 10:00:00,João,Silva,JKL5555,103,Vazio,Curitiba,,",
        ]);
        let names: Vec<&str> = ds.records.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "", "João Silva"]);
    }

    #[test]
    fn missing_status_defaults_per_row() {
        let ds = csv_dataset(&[
            "2024-05-01 08:00:00,Ana,Lima,ABC1234,101,,Curitiba,,",
            "2024-05-01 09:00:00,Rui,Costa,XYZ9876,102,Aguardando descarga,Curitiba,,",
        ]);
        assert_eq!(ds.records[0].status, STATUS_NOT_INFORMED);
        assert_eq!(ds.records[1].status, "Aguardando descarga");
    }

    #[test]
    fn missing_status_column_defaults_every_row() {
        let ds = import_as(b"Nome,Sobrenome\nAna,Lima\nRui,Costa\n", SourceFormat::Csv).unwrap();
        assert!(ds.has_column(field::STATUS));
        assert!(ds.records.iter().all(|r| r.status == STATUS_NOT_INFORMED));
        assert!(!ds.has_column(field::PLATE));
        assert!(ds.records.iter().all(|r| r.plate.is_none()));
    }

    #[test]
    fn headers_are_renamed_and_unknown_ones_pass_through() {
        let ds = csv_dataset(&["2024-05-01 08:00:00,Ana,Lima,ABC1234,101,Vazio,Curitiba,ok,"]);
        assert_eq!(
            ds.columns,
            vec![
                "datetime",
                "first_name",
                "last_name",
                "plate",
                "fleet_number",
                "status",
                "current_city",
                "Observação",
                "photo",
                "full_name",
                "photo_url",
            ]
        );
        let r = &ds.records[0];
        assert_eq!(r.text("Observação").as_deref(), Some("ok"));
        assert_eq!(r.text(field::CURRENT_CITY).as_deref(), Some("Curitiba"));
        assert_eq!(r.plate.as_deref(), Some("ABC1234"));
        assert_eq!(r.fleet_text().as_deref(), Some("101"));
    }

    #[test]
    fn photo_url_is_null_when_missing_or_empty() {
        let ds = csv_dataset(&[
            "2024-05-01 08:00:00,Ana,Lima,ABC1234,101,Vazio,Curitiba,,https://example.com/km.jpg",
            "2024-05-01 09:00:00,Rui,Costa,XYZ9876,102,Vazio,Curitiba,,",
        ]);
        assert_eq!(
            ds.records[0].photo_url.as_deref(),
            Some("https://example.com/km.jpg")
        );
        assert_eq!(ds.records[1].photo_url, None);

        let without_column = import_as(b"Nome\nAna\n", SourceFormat::Csv).unwrap();
        assert!(without_column.has_column(field::PHOTO_URL));
        assert_eq!(without_column.records[0].photo_url, None);
    }

    #[test]
    fn unparseable_datetime_becomes_null() {
        let ds = csv_dataset(&[
            "not a date,Ana,Lima,ABC1234,101,Vazio,Curitiba,,",
            "01/05/2024 08:30,Rui,Costa,XYZ9876,102,Vazio,Curitiba,,",
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].datetime, None);
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(ds.records[1].datetime, Some(expected));
    }

    #[test]
    fn parse_datetime_accepts_common_forms() {
        let noon = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-09 12:00:00"), Some(noon));
        assert_eq!(parse_datetime("2024-03-09T12:00:00"), Some(noon));
        assert_eq!(parse_datetime("2024-03-09T12:00:00-03:00"), Some(noon));
        assert_eq!(parse_datetime("09/03/2024 12:00"), Some(noon));
        assert_eq!(
            parse_datetime("2024-03-09"),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn semicolon_csv_with_bom_and_blank_rows() {
        let text = "\u{FEFF}Nome;Placa Veículo;Qual a sua posição atual?\nAna;ABC1234;Vazio\n;;\nRui;XYZ9876;\n";
        let ds = import(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].first_name, "Ana");
        assert_eq!(ds.records[1].plate.as_deref(), Some("XYZ9876"));
        assert_eq!(ds.records[1].status, STATUS_NOT_INFORMED);
    }

    #[test]
    fn importing_same_bytes_twice_is_identical() {
        let text = format!("{HEADER}\n2024-05-01 08:00:00,Ana,Lima,ABC1234,101,Vazio,Curitiba,,x");
        let a = import(text.as_bytes()).unwrap();
        let b = import(text.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            import_as(b"", SourceFormat::Csv),
            Err(ImportError::MissingHeader)
        ));
    }

    #[test]
    fn garbage_spreadsheet_is_an_error() {
        let bytes = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1 definitely not a workbook";
        assert_eq!(SourceFormat::sniff(bytes), SourceFormat::Spreadsheet);
        assert!(import(bytes).is_err());
    }

    fn xlsx_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = [
            "DateTime",
            "Nome",
            "Sobrenome",
            "Número de Frota",
            "Qual a sua posição atual?",
            "TIRAR FOTO DO KM ATUAL DO VEÍCULO",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "2024-05-02 07:15:00").unwrap();
        sheet.write_string(1, 1, "João").unwrap();
        sheet.write_string(1, 2, "Silva").unwrap();
        sheet.write_number(1, 3, 101.0).unwrap();
        sheet.write_string(1, 4, "Aguardando carregamento").unwrap();
        sheet.write_string(1, 5, "https://example.com/1.jpg").unwrap();
        sheet.write_string(2, 1, "Ana").unwrap();
        sheet.write_number(2, 3, 7.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn xlsx_import_normalizes_rows() {
        let bytes = xlsx_bytes();
        assert_eq!(SourceFormat::sniff(&bytes), SourceFormat::Spreadsheet);

        let ds = import(&bytes).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records[0];
        assert_eq!(first.full_name, "João Silva");
        assert_eq!(first.fleet_text().as_deref(), Some("101"));
        assert_eq!(first.status, "Aguardando carregamento");
        assert_eq!(first.photo_url.as_deref(), Some("https://example.com/1.jpg"));
        assert_eq!(
            first.date(),
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );

        let second = &ds.records[1];
        assert_eq!(second.full_name, "Ana");
        assert_eq!(second.status, STATUS_NOT_INFORMED);
        assert_eq!(second.datetime, None);
        assert_eq!(second.photo_url, None);
    }

    #[test]
    fn cache_returns_same_snapshot_for_same_bytes() {
        let bytes = xlsx_bytes();
        let mut cache = ImportCache::new(2);
        let a = cache.import(&bytes, Some(SourceFormat::Spreadsheet)).unwrap();
        let b = cache.import(&bytes, Some(SourceFormat::Spreadsheet)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_evicts_oldest_entry() {
        let mut cache = ImportCache::new(2);
        let first = cache.import(b"Nome\nA\n", Some(SourceFormat::Csv)).unwrap();
        cache.import(b"Nome\nB\n", Some(SourceFormat::Csv)).unwrap();
        cache.import(b"Nome\nC\n", Some(SourceFormat::Csv)).unwrap();
        assert_eq!(cache.len(), 2);

        let again = cache.import(b"Nome\nA\n", Some(SourceFormat::Csv)).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(*first, *again);
    }

    #[test]
    fn failed_import_is_not_cached() {
        let mut cache = ImportCache::new(4);
        assert!(cache.import(b"", Some(SourceFormat::Csv)).is_err());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let err = load_file(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[test]
    fn extension_wins_over_sniffing() {
        assert_eq!(
            SourceFormat::from_extension(Path::new("checkins.XLSX")),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(
            SourceFormat::from_extension(Path::new("checkins.csv")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(SourceFormat::from_extension(Path::new("checkins")), None);
    }

    #[test]
    fn number_like_names_stay_verbatim() {
        let text = "Nome,Sobrenome,Placa Veículo,Número de Frota,Qual a sua posição atual?\n\
Nan,Inf,0123ABC,007,Vazio\n\
Infinity,Silva,1e5,0101,NaN\n";
        let ds = import_as(text.as_bytes(), SourceFormat::Csv).unwrap();

        let first = &ds.records[0];
        assert_eq!(first.first_name, "Nan");
        assert_eq!(first.last_name, "Inf");
        assert_eq!(first.full_name, "Nan Inf");
        assert_eq!(first.plate.as_deref(), Some("0123ABC"));

        let second = &ds.records[1];
        assert_eq!(second.full_name, "Infinity Silva");
        assert_eq!(second.plate.as_deref(), Some("1e5"));
        assert_eq!(second.status, "NaN");
    }

    #[test]
    fn leading_zero_fleet_numbers_are_kept_as_typed() {
        let text = "Número de Frota,Observação\n007,1.50\n0101,-0\n101,2.5\n";
        let ds = import_as(text.as_bytes(), SourceFormat::Csv).unwrap();
        let fleets: Vec<_> = ds.records.iter().map(|r| r.fleet_text().unwrap()).collect();
        assert_eq!(fleets, vec!["007", "0101", "101"]);
        assert_eq!(ds.records[0].fleet_number, Some(CellValue::Text("007".into())));
        assert_eq!(ds.records[2].fleet_number, Some(CellValue::Integer(101)));

        assert_eq!(ds.records[0].text("Observação").as_deref(), Some("1.50"));
        assert_eq!(ds.records[1].text("Observação").as_deref(), Some("-0"));
        assert_eq!(ds.records[2].value("Observação"), Some(CellValue::Float(2.5)));
    }

    #[test]
    fn guess_cell_type_rejects_special_floats() {
        for raw in ["nan", "NaN", "inf", "-Infinity", "1e3", "+5", ".5", "5."] {
            assert_eq!(guess_cell_type(raw), Some(CellValue::Text(raw.into())), "{raw}");
        }
        assert_eq!(guess_cell_type("-12"), Some(CellValue::Integer(-12)));
        assert_eq!(guess_cell_type("0"), Some(CellValue::Integer(0)));
        assert_eq!(guess_cell_type("true"), Some(CellValue::Bool(true)));
        assert_eq!(guess_cell_type(""), None);
    }

    #[test]
    fn cache_sniffs_when_format_is_unknown() {
        let bytes = xlsx_bytes();
        let mut cache = ImportCache::new(2);
        let sniffed = cache.import(&bytes, None).unwrap();
        let explicit = cache.import(&bytes, Some(SourceFormat::Spreadsheet)).unwrap();
        assert!(Arc::ptr_eq(&sniffed, &explicit));
        assert_eq!(sniffed.len(), 2);
    }

    #[test]
    fn zero_capacity_cache_loads_directly() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("checkins.csv");
        std::fs::write(&path, "Nome,Sobrenome\nAna,Lima\n").unwrap();

        let mut cache = ImportCache::new(0);
        let a = cache.load_file(&path).unwrap();
        let b = cache.load_file(&path).unwrap();
        assert_eq!(a.records[0].full_name, "Ana Lima");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 0);
    }
}
