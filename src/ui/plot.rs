use eframe::egui::{Color32, Rect, Ui};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotPoints, PlotUi, Points};
use spectral_lines::identify::SystemOverlay;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render the spectrum with the identified lines in the central panel.
/// Returns the plot's screen area when one was drawn.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) -> Option<Rect> {
    let identification = match &state.identification {
        Some(ident) => ident,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a run configuration  (File → Open run…)");
            });
            return None;
        }
    };

    let plot = Plot::new("spectral_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Lambda")
        .y_axis_label("Intensity")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = identification
                .spectrum()
                .measurements()
                .iter()
                .map(|m| [m.wavelength, m.intensity])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name("Spectrum")
                    .color(Color32::LIGHT_BLUE)
                    .width(0.8),
            );

            plot_ui.hline(
                HLine::new(identification.mean_intensity())
                    .name("Mean intensity")
                    .color(Color32::LIGHT_GRAY)
                    .width(1.2),
            );

            if state.show_significant {
                let significant: PlotPoints = identification
                    .filtered()
                    .measurements()
                    .iter()
                    .map(|m| [m.wavelength, m.intensity])
                    .collect();
                plot_ui.points(
                    Points::new(significant)
                        .name("Above mean")
                        .color(Color32::DARK_GRAY)
                        .radius(1.5),
                );
            }

            for overlay in &state.overlays {
                if !state.is_visible(&overlay.system_name) {
                    continue;
                }
                let color = state
                    .colors
                    .as_ref()
                    .map(|c| c.color_for(&overlay.system_name))
                    .unwrap_or(Color32::GRAY);
                draw_overlay(plot_ui, overlay, color);
            }
        });
    Some(plot.response.rect)
}

/// Polylines for one system: a vertical segment per match (intensity to
/// system level) and one horizontal segment across the matched range.
///
/// A system without matches yields a single empty polyline so it still
/// shows up in the legend.
fn overlay_segments(overlay: &SystemOverlay) -> Vec<Vec<[f64; 2]>> {
    let Some((left, right)) = overlay.span else {
        return vec![Vec::new()];
    };

    let mut segments: Vec<Vec<[f64; 2]>> = overlay
        .markers
        .iter()
        .map(|m| vec![[m.wavelength, m.intensity], [m.wavelength, overlay.level]])
        .collect();
    segments.push(vec![[left, overlay.level], [right, overlay.level]]);
    segments
}

/// Draw a system's segments dashed, all under the system's legend name.
fn draw_overlay(plot_ui: &mut PlotUi, overlay: &SystemOverlay, color: Color32) {
    for segment in overlay_segments(overlay) {
        plot_ui.line(
            Line::new(PlotPoints::from(segment))
                .name(&overlay.system_name)
                .color(color)
                .style(LineStyle::dashed_dense())
                .width(0.8),
        );
    }
}
