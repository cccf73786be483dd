use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::export_file_name;
use crate::data::model::field;
use crate::data::summary::overview;
use crate::state::{AppState, Notice};

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods", "csv"];

// ---------------------------------------------------------------------------
// Left side panel – load, filters, statistics
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Load data");
            if ui.button("Choose spreadsheet…").clicked() {
                state.selected_file = pick_file();
            }
            match &state.selected_file {
                Some(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    ui.label(name);
                }
                None => {
                    ui.weak("No file selected");
                }
            }
            if state.selected_file.is_some()
                && ui
                    .add(egui::Button::new(RichText::new("Load data").strong()))
                    .clicked()
            {
                state.load_selected_file();
            }
            notice(ui, state.notice.as_ref());
            ui.separator();

            if state.session.dataset.is_none() {
                return;
            }
            filters(ui, state);
            ui.separator();
            statistics(ui, state);
        });
}

fn notice(ui: &mut Ui, notice: Option<&Notice>) {
    match notice {
        Some(Notice::Success(msg)) => {
            ui.colored_label(Color32::from_rgb(60, 170, 90), msg);
        }
        Some(Notice::Warning(msg)) => {
            ui.colored_label(Color32::from_rgb(230, 160, 30), msg);
        }
        Some(Notice::Error(msg)) => {
            ui.colored_label(Color32::RED, msg);
        }
        None => {}
    }
}

/// A combo box with an "All" entry. Hidden when there is nothing to choose from.
fn choice(ui: &mut Ui, id: &str, label: &str, options: &[String], selected: &mut Option<String>) {
    if options.is_empty() {
        return;
    }
    ui.label(label);
    let text = selected.clone().unwrap_or_else(|| "All".to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(selected, None, "All");
            for option in options {
                ui.selectable_value(selected, Some(option.clone()), option);
            }
        });
}

fn filters(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");

    choice(ui, "status_filter", "Status:", &state.options.statuses, &mut state.draft.status);
    choice(ui, "plate_filter", "Vehicle plate:", &state.options.plates, &mut state.draft.plate);
    choice(
        ui,
        "fleet_filter",
        "Fleet number:",
        &state.options.fleet_numbers,
        &mut state.draft.fleet_number,
    );
    choice(ui, "driver_filter", "Driver:", &state.options.drivers, &mut state.draft.driver);

    ui.add_space(4.0);
    match state.options.date_bounds {
        Some((min, max)) => {
            ui.strong("Period");
            ui.checkbox(&mut state.draft.limit_period, "Limit to period");
            let draft = &mut state.draft;
            ui.add_enabled_ui(draft.limit_period, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut draft.start).id_salt("start_date"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut draft.end).id_salt("end_date"));
                });
            });
            draft.clamp_dates(min, max);
        }
        None if state.session.dataset.as_ref().is_some_and(|ds| ds.has_column(field::DATETIME)) => {
            ui.weak("No valid dates to filter by");
        }
        None => {}
    }

    ui.add_space(4.0);
    if ui
        .add(egui::Button::new(RichText::new("Apply filters").strong()))
        .clicked()
    {
        state.apply_filters();
    }
    if ui.button("Clear filters").clicked() {
        state.clear_filters();
    }

    let active = state.session.criteria.describe();
    if !active.is_empty() {
        ui.add_space(4.0);
        ui.weak("Active filters:");
        for line in active {
            ui.label(line);
        }
    }
}

/// Headline numbers over the full dataset.
fn statistics(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.session.dataset else {
        return;
    };
    let stats = overview(dataset);

    ui.heading("Statistics");
    ui.label(format!("Total records: {}", stats.total));
    ui.label(format!("With photo: {}", stats.with_photo));
    ui.strong("By status:");
    for (status, count) in &stats.by_status {
        let color = state
            .color_map
            .as_ref()
            .map(|cm| cm.color_for(status))
            .unwrap_or(Color32::GRAY);
        ui.label(RichText::new(format!("• {status}: {count}")).color(color));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.session.display().is_some_and(|ds| !ds.is_empty());
            if ui.add_enabled(can_export, egui::Button::new("Export CSV…")).clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(all), Some(shown)) = (&state.session.dataset, state.session.display()) {
            ui.label(format!(
                "{} check-ins loaded, {} visible",
                all.len(),
                shown.len()
            ));
        }
    });
}

/// Shown in the central panel until a dataset is loaded.
pub fn welcome(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("Load a spreadsheet from the left panel to start.");
        ui.add_space(12.0);
        ui.label("1. Choose the check-in spreadsheet (xlsx, xls, ods or csv), or drop it on the window.");
        ui.label("2. Press \"Load data\".");
        ui.label("3. Pick filters and press \"Apply filters\".");
        ui.label("4. Browse photos, the data table or the status breakdown.");
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_file() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open check-in spreadsheet")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xls", "xlsm", "xlsb"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}

/// Pick a file and import it right away.
pub fn open_file_dialog(state: &mut AppState) {
    if let Some(path) = pick_file() {
        state.selected_file = Some(path);
        state.load_selected_file();
    }
}

/// Ask where to save the displayed rows, then export them.
pub fn export_dialog(state: &mut AppState) {
    let name = export_file_name(chrono::Local::now().naive_local());
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(name)
        .add_filter("CSV", &["csv"]);
    if let Some(dir) = &state.config.export_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(path) = dialog.save_file() {
        // Failures are reported through `notice`.
        let _ = state.export_display(&path);
    }
}
