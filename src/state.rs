use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::config::ViewerConfig;
use crate::data::export::export_to_path;
use crate::data::filter::{filter, DateRange, FilterCriteria, FilterOptions};
use crate::data::loader::{ImportCache, SourceFormat};
use crate::data::model::Dataset;
use crate::error::{ExportError, ImportError};
use crate::photo::PhotoFetcher;
use crate::ui::gallery::PhotoCache;

// ---------------------------------------------------------------------------
// Session: the current snapshots, replaced wholesale by each action
// ---------------------------------------------------------------------------

/// Current Dataset and Filtered Dataset. Handlers return a new `Session`
/// instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub dataset: Option<Arc<Dataset>>,
    pub filtered: Option<Arc<Dataset>>,
    /// Criteria that produced `filtered`.
    pub criteria: FilterCriteria,
}

impl Session {
    /// Fresh session over a newly imported dataset, unfiltered.
    pub fn with_dataset(dataset: Arc<Dataset>) -> Self {
        Session {
            filtered: Some(Arc::clone(&dataset)),
            dataset: Some(dataset),
            criteria: FilterCriteria::default(),
        }
    }

    pub fn apply_filters(&self, criteria: FilterCriteria) -> Self {
        let Some(dataset) = &self.dataset else {
            return self.clone();
        };
        let filtered = if criteria.is_identity() {
            Arc::clone(dataset)
        } else {
            Arc::new(filter(dataset, &criteria))
        };
        Session {
            dataset: Some(Arc::clone(dataset)),
            filtered: Some(filtered),
            criteria,
        }
    }

    /// Identity criteria over the original dataset.
    pub fn clear_filters(&self) -> Self {
        self.apply_filters(FilterCriteria::default())
    }

    /// What the views render: the filtered snapshot, else the full one.
    pub fn display(&self) -> Option<Arc<Dataset>> {
        self.filtered.as_ref().or(self.dataset.as_ref()).cloned()
    }
}

// ---------------------------------------------------------------------------
// Filter widgets' pending selection
// ---------------------------------------------------------------------------

/// Selections in the side panel, applied only when the operator presses Apply.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDraft {
    pub status: Option<String>,
    pub plate: Option<String>,
    pub fleet_number: Option<String>,
    pub driver: Option<String>,
    pub limit_period: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterDraft {
    /// Everything set to "All"; the period spans the whole dataset.
    pub fn for_options(options: &FilterOptions) -> Self {
        let (start, end) = options.date_bounds.unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            (today, today)
        });
        FilterDraft {
            status: None,
            plate: None,
            fleet_number: None,
            driver: None,
            limit_period: false,
            start,
            end,
        }
    }

    /// Keep the picked dates within the dataset's dates.
    pub fn clamp_dates(&mut self, min: NaiveDate, max: NaiveDate) {
        self.start = self.start.clamp(min, max);
        self.end = self.end.clamp(min, max);
    }

    pub fn to_criteria(&self, options: &FilterOptions) -> FilterCriteria {
        let date_range = (self.limit_period && options.date_bounds.is_some()).then(|| DateRange {
            start: self.start.min(self.end),
            end: self.start.max(self.end),
        });
        FilterCriteria {
            status: self.status.clone(),
            plate: self.plate.clone(),
            fleet_number: self.fleet_number.clone(),
            driver_full_name: self.driver.clone(),
            date_range,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Gallery,
    Table,
    Status,
}

/// Feedback shown under the load / filter buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,
    pub session: Session,
    /// Values offered by the filter widgets, from the full dataset.
    pub options: FilterOptions,
    pub draft: FilterDraft,
    /// File chosen in the side panel, imported on "Load data".
    pub selected_file: Option<PathBuf>,
    pub import_cache: ImportCache,
    pub photos: PhotoCache,
    /// `None` when the HTTP client could not be built; every photo then fails.
    pub fetcher: Option<PhotoFetcher>,
    pub color_map: Option<ColorMap>,
    pub tab: Tab,
    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let fetcher = match PhotoFetcher::new(config.photo_timeout()) {
            Ok(f) => Some(f),
            Err(e) => {
                log::error!("Photo downloads disabled: {e}");
                None
            }
        };
        let options = FilterOptions::default();
        Self {
            import_cache: ImportCache::new(config.import_cache_entries),
            config,
            session: Session::default(),
            draft: FilterDraft::for_options(&options),
            options,
            selected_file: None,
            photos: PhotoCache::default(),
            fetcher,
            color_map: None,
            tab: Tab::Gallery,
            notice: None,
        }
    }

    /// Import the file picked in the side panel.
    pub fn load_selected_file(&mut self) {
        if let Some(path) = self.selected_file.clone() {
            // Failures are reported through `notice`.
            let _ = self.import_path(&path);
        }
    }

    pub fn import_path(&mut self, path: &Path) -> Result<(), ImportError> {
        let result = self.import_cache.load_file(path);
        self.finish_import(result)
    }

    /// Import in-memory file contents, such as a file dropped on the window.
    /// The format is sniffed when `format` is `None`.
    pub fn import_bytes(&mut self, bytes: &[u8], format: Option<SourceFormat>) -> Result<(), ImportError> {
        let result = self.import_cache.import(bytes, format);
        self.finish_import(result)
    }

    /// Install a new dataset, or report the failure and keep the current one.
    fn finish_import(&mut self, result: Result<Arc<Dataset>, ImportError>) -> Result<(), ImportError> {
        match result {
            Ok(dataset) => {
                self.options = FilterOptions::from_dataset(&dataset);
                self.draft = FilterDraft::for_options(&self.options);
                self.color_map = Some(ColorMap::new(&self.options.statuses));
                self.session = Session::with_dataset(dataset);
                self.photos.clear();
                self.notice = Some(Notice::Success("Data loaded successfully".into()));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.notice = Some(Notice::Error(format!("Error loading spreadsheet: {e}")));
                Err(e)
            }
        }
    }

    pub fn apply_filters(&mut self) {
        let criteria = self.draft.to_criteria(&self.options);
        self.session = self.session.apply_filters(criteria);
        let found = self.session.display().map_or(0, |ds| ds.len());
        self.notice = Some(if found > 0 {
            Notice::Success(format!("{found} record(s) found"))
        } else {
            Notice::Warning("No records match the selected filters".into())
        });
    }

    pub fn clear_filters(&mut self) {
        self.session = self.session.clear_filters();
        self.draft = FilterDraft::for_options(&self.options);
        self.notice = Some(Notice::Success("Filters removed".into()));
    }

    /// Export what the table currently shows.
    pub fn export_display(&mut self, path: &Path) -> Result<(), ExportError> {
        let Some(dataset) = self.session.display() else {
            return Ok(());
        };
        match export_to_path(&dataset, path) {
            Ok(()) => {
                self.notice = Some(Notice::Success(format!(
                    "Exported {} record(s) to {}",
                    dataset.len(),
                    path.display()
                )));
                Ok(())
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.notice = Some(Notice::Error(format!("Export failed: {e}")));
                Err(e)
            }
        }
    }
}
