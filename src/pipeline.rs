use crate::config::RunConfig;
use crate::data::loader::{load_reference_system, load_spectrum};
use crate::data::{MeasuredSpectrum, ReferenceSystem};
use crate::error::Result;
use crate::identify::{identify, Identification, MatchReporter};

/// Inputs of a run, loaded once so the matcher can be re-run cheaply with
/// another offset.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub spectrum: MeasuredSpectrum,
    pub systems: Vec<ReferenceSystem>,
}

impl LoadedInputs {
    pub fn identify(&self, offset: f64, reporter: &mut dyn MatchReporter) -> Result<Identification> {
        identify(self.spectrum.clone(), &self.systems, offset, reporter)
    }
}

/// Load the spectrum and every reference system named in `config`.
pub fn load_inputs(config: &RunConfig) -> Result<LoadedInputs> {
    config.validate()?;
    let spectrum = load_spectrum(&config.spectrum_source)?;
    let systems = config
        .reference_systems
        .iter()
        .map(|s| load_reference_system(&s.name, &s.source))
        .collect::<Result<Vec<_>>>()?;
    Ok(LoadedInputs { spectrum, systems })
}

/// Entry point: load, filter, match every system with the configured offset.
pub fn run(config: &RunConfig, reporter: &mut dyn MatchReporter) -> Result<Identification> {
    load_inputs(config)?.identify(config.tolerance_offset, reporter)
}
