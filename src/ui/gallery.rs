use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, RichText, ScrollArea, TextureHandle, TextureOptions, Ui};
use image::DynamicImage;

use crate::data::model::Record;
use crate::photo::PhotoFetcher;
use crate::state::AppState;

/// Longest side of a gallery texture, in pixels.
const MAX_TEXTURE_SIDE: u32 = 800;

// ---------------------------------------------------------------------------
// Photo cache: one fetch per URL per session
// ---------------------------------------------------------------------------

pub enum PhotoSlot {
    Ready(TextureHandle),
    /// Download or decode failed; rendered as a placeholder.
    Failed(String),
}

#[derive(Default)]
pub struct PhotoCache {
    slots: HashMap<String, PhotoSlot>,
}

impl PhotoCache {
    pub fn get(&self, url: &str) -> Option<&PhotoSlot> {
        self.slots.get(url)
    }

    /// Download, decode and upload `url`. Failures are cached too.
    pub fn fetch(&mut self, ctx: &egui::Context, fetcher: Option<&PhotoFetcher>, url: &str) {
        let slot = match fetcher {
            None => PhotoSlot::Failed("photo downloads are disabled".into()),
            Some(fetcher) => match fetcher.fetch(url) {
                Ok(img) => PhotoSlot::Ready(ctx.load_texture(url, to_color_image(&img), TextureOptions::LINEAR)),
                Err(e) => {
                    log::warn!("Photo {url}: {e}");
                    PhotoSlot::Failed(e.to_string())
                }
            },
        };
        self.slots.insert(url.to_string(), slot);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

fn to_color_image(img: &DynamicImage) -> ColorImage {
    let rgba = img.thumbnail(MAX_TEXTURE_SIDE, MAX_TEXTURE_SIDE).to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

// ---------------------------------------------------------------------------
// Gallery tab
// ---------------------------------------------------------------------------

/// Render the photo cards of the displayed dataset in a grid.
pub fn gallery(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.session.display() else {
        return;
    };
    if dataset.is_empty() {
        ui.label("No records match the selected filters.");
        return;
    }

    ui.heading(format!("Odometer photos ({} records)", dataset.len()));
    ui.add_space(4.0);

    let per_row = state.config.gallery_columns.max(1);
    // Fetches block the frame, so at most one per frame.
    let mut fetched = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for chunk in dataset.records.chunks(per_row) {
                ui.columns(per_row, |cols| {
                    for (col, record) in cols.iter_mut().zip(chunk) {
                        card(col, record, &mut state.photos, state.fetcher.as_ref(), &mut fetched);
                    }
                });
                ui.add_space(6.0);
            }
        });
}

/// What a card does with its photo this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhotoStep<'a> {
    /// No link on the record: placeholder, never fetched.
    NoPhoto,
    Fetch(&'a str),
    /// Render the cached slot, or a spinner until a later frame fetches it.
    Show(&'a str),
}

fn photo_step<'a>(photo_url: Option<&'a str>, photos: &PhotoCache, fetched_this_frame: bool) -> PhotoStep<'a> {
    match photo_url {
        None => PhotoStep::NoPhoto,
        Some(url) if photos.get(url).is_none() && !fetched_this_frame => PhotoStep::Fetch(url),
        Some(url) => PhotoStep::Show(url),
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn card(
    ui: &mut Ui,
    record: &Record,
    photos: &mut PhotoCache,
    fetcher: Option<&PhotoFetcher>,
    fetched: &mut bool,
) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());

        let plate = or_na(record.plate.clone());
        ui.strong(&record.full_name);
        ui.label(format!("Plate: {plate} | Fleet: {}", or_na(record.fleet_text())));
        ui.label(format!("Status: {}", record.status));
        ui.label(or_na(record.datetime.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())));

        let url = match photo_step(record.photo_url.as_deref(), photos, *fetched) {
            PhotoStep::NoPhoto => {
                ui.label(RichText::new("No photo available").italics().weak());
                return;
            }
            PhotoStep::Fetch(url) => {
                photos.fetch(ui.ctx(), fetcher, url);
                *fetched = true;
                url
            }
            PhotoStep::Show(url) => url,
        };

        match photos.get(url) {
            Some(PhotoSlot::Ready(texture)) => {
                ui.add(egui::Image::new(texture).max_width(ui.available_width()));
                ui.small(format!("Vehicle odometer - {plate}"));
            }
            Some(PhotoSlot::Failed(reason)) => {
                ui.colored_label(Color32::from_rgb(230, 160, 30), "Could not load image")
                    .on_hover_text(reason);
            }
            None => {
                ui.spinner();
                ui.ctx().request_repaint();
            }
        }
        ui.hyperlink_to("Open image in browser", url);
    });
}
