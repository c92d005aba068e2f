use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SpectralLinesApp {
    pub state: AppState,
}

impl SpectralLinesApp {
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Save the plot once the requested screenshot has arrived.
    fn take_screenshot(&mut self, ctx: &egui::Context) {
        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(screenshot) = screenshot else {
            return;
        };

        self.state.figure_requested = false;
        match self.state.save_figure(&screenshot, ctx.pixels_per_point()) {
            Ok(path) => {
                self.state.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => self.state.report_error(e),
        }
    }
}

impl eframe::App for SpectralLinesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.figure_requested {
            self.take_screenshot(ctx);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: offset + systems ----
        egui::SidePanel::left("systems_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            self.state.plot_rect = plot::spectral_plot(ui, &self.state);
        });
    }
}
