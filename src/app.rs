use std::path::Path;

use eframe::egui::{self, Ui};

use crate::config::ViewerConfig;
use crate::data::loader::SourceFormat;
use crate::state::{AppState, Tab};
use crate::ui::{gallery, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FleetKmViewerApp {
    pub state: AppState,
}

impl FleetKmViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Import a spreadsheet dropped on the window. Only the first file counts.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if let Some(path) = file.path {
            self.state.selected_file = Some(path);
            self.state.load_selected_file();
        } else if let Some(bytes) = file.bytes {
            let format = SourceFormat::from_extension(Path::new(&file.name));
            // Failures are reported through `notice`.
            let _ = self.state.import_bytes(&bytes, format);
        }
    }
}

impl eframe::App for FleetKmViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: load, filters, statistics ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.session.dataset.is_none() {
                panels::welcome(ui);
                return;
            }

            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut self.state.tab, Tab::Gallery, "Photos");
                ui.selectable_value(&mut self.state.tab, Tab::Table, "Data table");
                ui.selectable_value(&mut self.state.tab, Tab::Status, "Status distribution");
            });
            ui.separator();

            match self.state.tab {
                Tab::Gallery => gallery::gallery(ui, &mut self.state),
                Tab::Table => table::data_table(ui, &mut self.state),
                Tab::Status => plot::status_distribution(ui, &self.state),
            }
        });
    }
}
