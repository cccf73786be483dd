use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use super::column_label;
use crate::data::model::field;
use crate::data::summary::{count_by, drill_down_columns, status_groups, StatusGroup};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Status distribution (chart + drill-down)
// ---------------------------------------------------------------------------

/// Render the status bar chart and the per-status breakdown.
pub fn status_distribution(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.session.display() else {
        return;
    };
    if dataset.is_empty() {
        ui.label("No status data to show.");
        return;
    }

    ui.heading("Status distribution");

    let counts = count_by(&dataset, field::STATUS);
    Plot::new("status_chart")
        .height(260.0)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .y_axis_label("Vehicles")
        .show(ui, |plot_ui| {
            for (i, (status, count)) in counts.iter().enumerate() {
                let status = status.to_string();
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(&status))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let bar = Bar::new(i as f64, *count as f64).width(0.6);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&status).color(color));
            }
        });

    ui.add_space(8.0);
    ui.heading("Details by status");

    let columns = drill_down_columns(&dataset);
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for group in status_groups(&dataset) {
                let header = format!("{} ({} vehicles)", group.status, group.total());
                egui::CollapsingHeader::new(RichText::new(header).strong())
                    .id_salt(&group.status)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        metrics(ui, &group);
                        ui.add_space(4.0);

                        if columns.is_empty() {
                            return;
                        }
                        egui::Grid::new(("drill_down", &group.status))
                            .striped(true)
                            .show(ui, |ui: &mut Ui| {
                                for column in &columns {
                                    ui.strong(column_label(column));
                                }
                                ui.end_row();
                                for &i in &group.records {
                                    let record = &dataset.records[i];
                                    for column in &columns {
                                        ui.label(record.text(column).unwrap_or_default());
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            }
        });
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.vertical(|ui: &mut Ui| {
        ui.weak(label);
        ui.heading(value.to_string());
    });
}

fn metrics(ui: &mut Ui, group: &StatusGroup) {
    ui.horizontal(|ui: &mut Ui| {
        if let Some(cities) = group.cities {
            metric(ui, "Cities", cities);
            ui.separator();
        }
        if let Some(clients) = group.clients {
            metric(ui, "Clients", clients);
            ui.separator();
        }
        if let Some(with_cargo) = group.with_cargo {
            metric(ui, "With cargo", with_cargo);
            ui.separator();
        }
        metric(ui, "Total vehicles", group.total());
    });
}
