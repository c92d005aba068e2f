use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Measurement – one (wavelength, intensity) sample
// ---------------------------------------------------------------------------

/// A single point of a measured spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub wavelength: f64,
    pub intensity: f64,
}

impl Measurement {
    pub const fn new(wavelength: f64, intensity: f64) -> Self {
        Self {
            wavelength,
            intensity,
        }
    }
}

impl From<(f64, f64)> for Measurement {
    fn from((wavelength, intensity): (f64, f64)) -> Self {
        Self::new(wavelength, intensity)
    }
}

// ---------------------------------------------------------------------------
// MeasuredSpectrum – the full experimental spectrum
// ---------------------------------------------------------------------------

/// The measured spectrum as loaded, in source order.
///
/// Usually sorted by wavelength, but nothing downstream relies on it.
/// Never empty: construction rejects an empty point list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredSpectrum {
    measurements: Vec<Measurement>,
}

impl MeasuredSpectrum {
    pub fn new(measurements: Vec<Measurement>) -> Result<Self> {
        if measurements.is_empty() {
            return Err(Error::Input("measured spectrum has no points".into()));
        }
        Ok(Self { measurements })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(pairs.into_iter().map(Measurement::from).collect())
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Arithmetic mean of all intensities.
    pub fn mean_intensity(&self) -> f64 {
        super::filter::mean_intensity(&self.measurements)
    }

    /// `(min, max)` intensity, NaNs ignored.
    pub fn intensity_range(&self) -> (f64, f64) {
        min_max(self.measurements.iter().map(|m| m.intensity))
    }

    /// `(min, max)` wavelength, NaNs ignored.
    pub fn wavelength_range(&self) -> (f64, f64) {
        min_max(self.measurements.iter().map(|m| m.wavelength))
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

// ---------------------------------------------------------------------------
// Reference systems
// ---------------------------------------------------------------------------

/// One characteristic wavelength of a reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub wavelength: f64,
}

/// A named, ordered set of reference lines (e.g. the N2 second positive
/// system or the Balmer series).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSystem {
    name: String,
    lines: Vec<ReferenceLine>,
}

impl ReferenceSystem {
    pub fn new(name: impl Into<String>, lines: Vec<ReferenceLine>) -> Result<Self> {
        let name = name.into();
        if lines.is_empty() {
            return Err(Error::Input(format!(
                "reference system {name:?} has no lines"
            )));
        }
        Ok(Self { name, lines })
    }

    pub fn from_wavelengths<I>(name: impl Into<String>, wavelengths: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let lines = wavelengths
            .into_iter()
            .map(|wavelength| ReferenceLine { wavelength })
            .collect();
        Self::new(name, lines)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[ReferenceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spectrum_is_an_input_error() {
        let err = MeasuredSpectrum::new(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn empty_system_is_an_input_error() {
        let err = ReferenceSystem::from_wavelengths("N2", [0.0_f64; 0]).unwrap_err();
        assert!(matches!(err, Error::Input(msg) if msg.contains("N2")));
    }

    #[test]
    fn ranges_skip_nan() {
        let sp = MeasuredSpectrum::from_pairs([(500.0, 3.0), (501.0, f64::NAN), (499.0, 7.0)])
            .unwrap();
        assert_eq!(sp.intensity_range(), (3.0, 7.0));
        assert_eq!(sp.wavelength_range(), (499.0, 501.0));
    }
}
