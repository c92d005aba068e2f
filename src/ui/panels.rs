use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use spectral_lines::config::RunConfig;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – offset and system widgets
// ---------------------------------------------------------------------------

/// Render the left panel: tolerance offset and per-system results.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Identification");
    ui.separator();

    if state.inputs.is_none() {
        ui.label("No run loaded.");
        return;
    }

    // ---- Tolerance offset ----
    ui.strong("Tolerance offset");
    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            egui::DragValue::new(&mut state.offset)
                .speed(0.005)
                .range(0.0..=f64::MAX)
                .max_decimals(4),
        );
        if ui.button("Re-run").clicked() {
            if let Err(e) = state.rerun() {
                state.report_error(e);
            }
        }
    });
    ui.checkbox(&mut state.show_significant, "Show points above mean");
    ui.separator();

    let Some(identification) = state.identification.as_ref() else {
        return;
    };

    let (lo, hi) = identification.spectrum().wavelength_range();
    ui.label(format!("λ range: {lo:.2} – {hi:.2}"));
    ui.label(format!(
        "Mean intensity: {:.3}  ({} of {} points above)",
        identification.mean_intensity(),
        identification.filtered().len(),
        identification.spectrum().len()
    ));
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Systems");
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    // Clone what we need so we can mutate state inside the loop.
    let results = state
        .identification
        .as_ref()
        .map(|i| i.results().to_vec())
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for result in &results {
                let name = result.system_name();
                let mut text = RichText::new(format!(
                    "{name}  ({}/{})",
                    result.match_count(),
                    result.reference_count()
                ));
                if let Some(colors) = &state.colors {
                    text = text.color(colors.color_for(name));
                }

                let mut visible = state.is_visible(name);
                if ui.checkbox(&mut visible, text).changed() {
                    state.toggle_system(name);
                }

                egui::CollapsingHeader::new("windows")
                    .id_salt(name)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if result.windows().is_empty() {
                            ui.label("no line found");
                        }
                        for (i, window) in result.windows().iter().enumerate() {
                            let peaks: Vec<String> = window
                                .peaks
                                .iter()
                                .map(|m| format!("{:.3}", m.wavelength))
                                .collect();
                            ui.label(format!(
                                "{}: λ {} ×{}  I_max={} at {}",
                                i + 1,
                                window.reference,
                                window.candidates,
                                window.max_intensity,
                                peaks.join(", ")
                            ));
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open run…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            let can_export = state.identification.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export results"))
                .clicked()
            {
                match state.export() {
                    Ok(path) => {
                        state.status_message = Some(format!("Saved {}", path.display()));
                    }
                    Err(e) => state.report_error(e),
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Save figure"))
                .clicked()
            {
                // The image arrives as an `Event::Screenshot` in a later frame.
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                state.figure_requested = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ident) = &state.identification {
            ui.label(format!(
                "{} systems, {} lines found, offset {}",
                ident.results().len(),
                ident.total_matches(),
                ident.offset()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.separator();
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open run configuration")
        .add_filter("Run configuration", &["json"])
        .pick_file();

    if let Some(path) = file {
        let loaded = RunConfig::from_file(&path)
            .map_err(anyhow::Error::from)
            .and_then(|config| state.open_config(config));
        match loaded {
            Ok(()) => {
                log::info!("Opened run configuration {}", path.display());
            }
            Err(e) => state.report_error(e),
        }
    }
}
