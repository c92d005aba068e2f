mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use app::SpectralLinesApp;
use clap::Parser;
use eframe::egui;
use spectral_lines::config::{parse_system_source, RunConfig, SystemSource};
use spectral_lines::export::{export_identification, ExportFormat};
use spectral_lines::identify::LogReporter;
use spectral_lines::pipeline::load_inputs;
use state::AppState;

/// Identify reference emission lines in a measured spectrum.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON run configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measured spectrum (.csv, .tsv, .txt, .json, .parquet).
    #[arg(short, long)]
    spectrum: Option<PathBuf>,

    /// Reference system as NAME=PATH; repeat for several systems.
    #[arg(long = "system", value_name = "NAME=PATH", value_parser = parse_system_source)]
    systems: Vec<SystemSource>,

    /// Half-width of the tolerance window around each reference line.
    #[arg(short, long)]
    offset: Option<f64>,

    /// Directory for exported results.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export format (csv or json).
    #[arg(long)]
    format: Option<String>,

    /// Run without opening the viewer.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    /// Merge the config file (if any) with command line overrides.
    fn run_config(&self) -> Result<Option<RunConfig>> {
        let mut config = match (&self.config, &self.spectrum) {
            (Some(path), _) => RunConfig::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?,
            (None, Some(spectrum)) => RunConfig::new(spectrum, Vec::new()),
            (None, None) => {
                if !self.systems.is_empty() {
                    bail!("--system needs --spectrum or --config");
                }
                return Ok(None);
            }
        };

        if self.config.is_some() {
            if let Some(spectrum) = &self.spectrum {
                config.spectrum_source = spectrum.clone();
            }
        }
        config.reference_systems.extend(self.systems.iter().cloned());
        if let Some(offset) = self.offset {
            config.tolerance_offset = offset;
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }
        if let Some(format) = &self.format {
            config.output_format = format.parse::<ExportFormat>()?;
        }
        config.validate()?;
        Ok(Some(config))
    }
}

fn run_headless(config: &RunConfig) -> Result<()> {
    let inputs = load_inputs(config)?;
    let identification = inputs.identify(config.tolerance_offset, &mut LogReporter)?;

    for result in identification.results() {
        log::info!(
            "{}: {}/{} lines, {} matched points",
            result.system_name(),
            result.match_count(),
            result.reference_count(),
            result.matches().len()
        );
    }

    if let Some(dir) = &config.output_path {
        export_identification(&identification, dir, config.output_format)?;
    }
    Ok(())
}

fn run_viewer(config: Option<RunConfig>) -> Result<()> {
    let mut state = AppState::default();
    if let Some(config) = config {
        let inputs = load_inputs(&config)?;
        let identification = inputs.identify(config.tolerance_offset, &mut LogReporter)?;
        state.set_identification(config, inputs, identification);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Spectral Lines – Peak Identification",
        options,
        Box::new(|_cc| Ok(Box::new(SpectralLinesApp::with_state(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = cli.run_config().and_then(|config| match config {
        Some(config) if cli.headless => run_headless(&config),
        None if cli.headless => Err(anyhow::anyhow!(
            "--headless needs --config or --spectrum with --system"
        )),
        config => run_viewer(config),
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
