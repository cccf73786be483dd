use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::column_label;
use super::panels::export_dialog;
use crate::data::export::visible_columns;
use crate::data::model::field;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

/// Render the data table of the displayed dataset with the export button.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.session.display() else {
        return;
    };

    ui.heading("Data table");
    if !dataset.is_empty() && ui.button("Download filtered data (CSV)").clicked() {
        export_dialog(state);
    }
    ui.add_space(4.0);

    let columns = visible_columns(&dataset);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(500.0)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(ROW_HEIGHT, |mut header| {
            for column in &columns {
                header.col(|ui| {
                    ui.strong(column_label(column));
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, dataset.len(), |mut row| {
                let record = &dataset.records[row.index()];
                for column in &columns {
                    row.col(|ui| {
                        if column == field::PHOTO_URL {
                            match &record.photo_url {
                                Some(url) => {
                                    ui.hyperlink_to("Open", url);
                                }
                                None => {
                                    ui.label(RichText::new("No photo").weak());
                                }
                            }
                        } else {
                            ui.label(record.text(column).unwrap_or_default());
                        }
                    });
                }
            });
        });
}
