use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{ColorImage, Rect};
use spectral_lines::config::{RunConfig, DEFAULT_TOLERANCE_OFFSET};
use spectral_lines::export::{export_identification, save_figure};
use spectral_lines::identify::{build_overlays, Identification, LogReporter, SystemOverlay};
use spectral_lines::pipeline::{load_inputs, LoadedInputs};

use crate::color::SystemColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Run configuration (None until the user opens one).
    pub config: Option<RunConfig>,

    /// Spectrum and reference systems loaded from `config`.
    pub inputs: Option<LoadedInputs>,

    /// Result of the last successful match run.
    pub identification: Option<Identification>,

    /// Annotation layout derived from `identification` (cached).
    pub overlays: Vec<SystemOverlay>,

    /// Colour per reference system.
    pub colors: Option<SystemColors>,

    /// Systems whose annotations are hidden in the plot.
    pub hidden_systems: BTreeSet<String>,

    /// Tolerance offset being edited in the side panel.
    pub offset: f64,

    /// Draw the significant (above-mean) points as a scatter.
    pub show_significant: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Screen area of the plot in the last frame, in points.
    pub plot_rect: Option<Rect>,

    /// A screenshot was requested and the figure is waiting for it.
    pub figure_requested: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: None,
            inputs: None,
            identification: None,
            overlays: Vec::new(),
            colors: None,
            hidden_systems: BTreeSet::new(),
            offset: DEFAULT_TOLERANCE_OFFSET,
            show_significant: false,
            status_message: None,
            plot_rect: None,
            figure_requested: false,
        }
    }
}

impl AppState {
    /// Load the inputs named by `config` and run the identification.
    pub fn open_config(&mut self, config: RunConfig) -> Result<()> {
        let inputs = load_inputs(&config).context("loading run inputs")?;
        self.offset = config.tolerance_offset;
        self.colors = Some(SystemColors::new(
            inputs.systems.iter().map(|s| s.name()),
        ));
        self.hidden_systems.clear();
        self.inputs = Some(inputs);
        self.config = Some(config);
        self.rerun()
    }

    /// Re-match the loaded inputs with the current `offset`.
    pub fn rerun(&mut self) -> Result<()> {
        let inputs = self.inputs.as_ref().context("no inputs loaded")?;
        let identification = inputs
            .identify(self.offset, &mut LogReporter)
            .context("identifying systems")?;
        self.overlays = build_overlays(&identification);
        self.identification = Some(identification);
        self.status_message = None;
        Ok(())
    }

    /// Ingest an already computed identification (e.g. from the command line).
    pub fn set_identification(&mut self, config: RunConfig, inputs: LoadedInputs, identification: Identification) {
        self.offset = identification.offset();
        self.colors = Some(SystemColors::new(
            identification.results().iter().map(|r| r.system_name()),
        ));
        self.overlays = build_overlays(&identification);
        self.identification = Some(identification);
        self.inputs = Some(inputs);
        self.config = Some(config);
        self.hidden_systems.clear();
        self.status_message = None;
    }

    fn output_dir(&self) -> Result<PathBuf> {
        let config = self.config.as_ref().context("no run configuration")?;
        Ok(config
            .output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("resultats")))
    }

    /// Export the current identification next to the configured output path.
    pub fn export(&self) -> Result<PathBuf> {
        let identification = self
            .identification
            .as_ref()
            .context("nothing to export yet")?;
        let config = self.config.as_ref().context("no run configuration")?;
        Ok(export_identification(identification, &self.output_dir()?, config.output_format)?)
    }

    /// Crop a window screenshot to the plot and save it as a PNG figure.
    pub fn save_figure(&self, screenshot: &ColorImage, pixels_per_point: f32) -> Result<PathBuf> {
        let figure = match self.plot_rect {
            Some(rect) => screenshot.region(&rect, Some(pixels_per_point)),
            None => screenshot.clone(),
        };
        let [width, height] = figure.size;
        let path = save_figure(
            width as u32,
            height as u32,
            figure.as_raw().to_vec(),
            &self.output_dir()?,
        )
        .context("saving figure")?;
        Ok(path)
    }

    /// Toggle a system's annotations on or off.
    pub fn toggle_system(&mut self, system: &str) {
        if !self.hidden_systems.remove(system) {
            self.hidden_systems.insert(system.to_string());
        }
    }

    pub fn is_visible(&self, system: &str) -> bool {
        !self.hidden_systems.contains(system)
    }

    /// Show every system.
    pub fn show_all(&mut self) {
        self.hidden_systems.clear();
    }

    /// Hide every system.
    pub fn hide_all(&mut self) {
        self.hidden_systems = self
            .overlays
            .iter()
            .map(|o| o.system_name.clone())
            .collect();
    }

    /// Record a failure for the status bar.
    pub fn report_error(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral_lines::data::{MeasuredSpectrum, ReferenceSystem};

    fn inputs() -> LoadedInputs {
        LoadedInputs {
            spectrum: MeasuredSpectrum::from_pairs([
                (500.0, 10.0),
                (500.1, 50.0),
                (500.3, 5.0),
                (600.0, 80.0),
            ])
            .unwrap(),
            systems: vec![
                ReferenceSystem::from_wavelengths("A", [500.05]).unwrap(),
                ReferenceSystem::from_wavelengths("B", [550.0]).unwrap(),
            ],
        }
    }

    #[test]
    fn rerun_with_new_offset() {
        let mut state = AppState {
            inputs: Some(inputs()),
            ..AppState::default()
        };
        state.rerun().unwrap();
        assert_eq!(state.overlays.len(), 2);

        state.offset = 0.01;
        state.rerun().unwrap();
        let ident = state.identification.as_ref().unwrap();
        assert_eq!(ident.result("A").unwrap().match_count(), 0);
    }

    #[test]
    fn invalid_offset_keeps_previous_result() {
        let mut state = AppState {
            inputs: Some(inputs()),
            ..AppState::default()
        };
        state.rerun().unwrap();
        state.offset = 0.0;
        assert!(state.rerun().is_err());
        assert_eq!(state.identification.as_ref().unwrap().offset(), DEFAULT_TOLERANCE_OFFSET);
    }

    fn state_writing_to(dir: &str) -> (AppState, PathBuf) {
        let out = std::env::temp_dir()
            .join(format!("spectral-lines-state-{}", std::process::id()))
            .join(dir);
        let mut config = RunConfig::new("unused.csv", Vec::new());
        config.output_path = Some(out.clone());
        let state = AppState {
            config: Some(config),
            ..AppState::default()
        };
        (state, out)
    }

    #[test]
    fn figure_is_cropped_to_the_plot() {
        let (mut state, out) = state_writing_to("cropped");
        state.plot_rect = Some(Rect::from_min_max([1.0, 1.0].into(), [3.0, 2.0].into()));
        let screenshot = ColorImage::new([4, 3], eframe::egui::Color32::WHITE);

        let path = state.save_figure(&screenshot, 1.0).unwrap();
        assert!(path.starts_with(&out));
        assert_eq!(image::image_dimensions(&path).unwrap(), (2, 1));
    }

    #[test]
    fn figure_without_plot_keeps_whole_window() {
        let (state, _) = state_writing_to("whole");
        let screenshot = ColorImage::new([4, 3], eframe::egui::Color32::WHITE);
        let path = state.save_figure(&screenshot, 1.0).unwrap();
        assert_eq!(image::image_dimensions(&path).unwrap(), (4, 3));
    }

    #[test]
    fn visibility_toggles() {
        let mut state = AppState {
            inputs: Some(inputs()),
            ..AppState::default()
        };
        state.rerun().unwrap();
        state.toggle_system("A");
        assert!(!state.is_visible("A"));
        state.toggle_system("A");
        assert!(state.is_visible("A"));
        state.hide_all();
        assert!(!state.is_visible("B"));
        state.show_all();
        assert!(state.is_visible("B"));
    }
}
