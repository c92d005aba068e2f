//! Peak identification: window matching of reference systems against the
//! significant part of a measured spectrum.

pub mod matcher;
pub mod overlay;
pub mod report;

use std::collections::BTreeSet;

use crate::data::{filter_significant, FilteredSpectrum, MeasuredSpectrum, ReferenceSystem};
use crate::error::{Error, Result};

pub use matcher::{match_system, match_system_with, SystemMatch, ToleranceWindow, WindowOutcome};
pub use overlay::{build_overlays, SystemOverlay};
pub use report::{LogReporter, MatchReporter, Recorder, ReportEvent, Silent};

// ---------------------------------------------------------------------------
// Identification – everything a consumer needs after one run
// ---------------------------------------------------------------------------

/// Result of matching every configured system against one spectrum.
#[derive(Debug, Clone)]
pub struct Identification {
    spectrum: MeasuredSpectrum,
    filtered: FilteredSpectrum,
    offset: f64,
    results: Vec<SystemMatch>,
}

impl Identification {
    /// The full measured spectrum (for the baseline curve).
    pub fn spectrum(&self) -> &MeasuredSpectrum {
        &self.spectrum
    }

    pub fn filtered(&self) -> &FilteredSpectrum {
        &self.filtered
    }

    pub fn mean_intensity(&self) -> f64 {
        self.filtered.threshold()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Per-system results in configuration order.
    pub fn results(&self) -> &[SystemMatch] {
        &self.results
    }

    pub fn result(&self, system: &str) -> Option<&SystemMatch> {
        self.results.iter().find(|r| r.system_name() == system)
    }

    pub fn total_matches(&self) -> usize {
        self.results.iter().map(SystemMatch::match_count).sum()
    }
}

/// Reject a tolerance offset that cannot describe a window.
pub fn validate_offset(offset: f64) -> Result<()> {
    if offset.is_finite() && offset > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "tolerance offset must be a positive number, got {offset}"
        )))
    }
}

/// Filter the spectrum once, then match each system against it.
///
/// Fails before doing any work if the offset is not strictly positive, no
/// system is given, or two systems share a name.
pub fn identify(
    spectrum: MeasuredSpectrum,
    systems: &[ReferenceSystem],
    offset: f64,
    reporter: &mut dyn MatchReporter,
) -> Result<Identification> {
    validate_offset(offset)?;
    if systems.is_empty() {
        return Err(Error::Input("no reference systems to identify".into()));
    }
    let mut seen = BTreeSet::new();
    for system in systems {
        if !seen.insert(system.name()) {
            return Err(Error::Config(format!(
                "duplicate reference system name {:?}",
                system.name()
            )));
        }
    }

    let filtered = filter_significant(&spectrum);
    let results = systems
        .iter()
        .map(|system| match_system_with(&filtered, system, offset, &mut *reporter))
        .collect();

    Ok(Identification {
        spectrum,
        filtered,
        offset,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum() -> MeasuredSpectrum {
        MeasuredSpectrum::from_pairs([(500.0, 10.0), (500.1, 50.0), (500.3, 5.0), (600.0, 80.0)])
            .unwrap()
    }

    #[test]
    fn results_keep_system_order() {
        let systems = vec![
            ReferenceSystem::from_wavelengths("B", [550.0]).unwrap(),
            ReferenceSystem::from_wavelengths("A", [500.05]).unwrap(),
        ];
        let ident = identify(spectrum(), &systems, 0.1, &mut Silent).unwrap();
        let names: Vec<&str> = ident.results().iter().map(|r| r.system_name()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(ident.result("A").unwrap().match_count(), 1);
        assert_eq!(ident.total_matches(), 1);
        assert!((ident.mean_intensity() - 36.25).abs() < 1e-12);
    }

    #[test]
    fn non_positive_offsets_are_config_errors() {
        let systems = vec![ReferenceSystem::from_wavelengths("A", [500.05]).unwrap()];
        for offset in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = identify(spectrum(), &systems, offset, &mut Silent).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "offset {offset}");
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let systems = vec![
            ReferenceSystem::from_wavelengths("N2", [337.1]).unwrap(),
            ReferenceSystem::from_wavelengths("N2", [357.7]).unwrap(),
        ];
        let err = identify(spectrum(), &systems, 0.1, &mut Silent).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("N2")));
    }

    #[test]
    fn no_systems_is_an_input_error() {
        let err = identify(spectrum(), &[], 0.1, &mut Silent).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
