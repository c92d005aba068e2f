use super::model::{MeasuredSpectrum, Measurement};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Significance filter: keep points above the mean intensity
// ---------------------------------------------------------------------------

/// Arithmetic mean of the intensities. NaN propagates; an empty slice gives NaN.
pub fn mean_intensity(measurements: &[Measurement]) -> f64 {
    let sum: f64 = measurements.iter().map(|m| m.intensity).sum();
    sum / measurements.len() as f64
}

/// The significant subset of a measured spectrum.
///
/// Holds copies of the kept points in source order together with their
/// index in the source spectrum, so a match mask over this view can always be
/// traced back to the raw data.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSpectrum {
    threshold: f64,
    measurements: Vec<Measurement>,
    source_indices: Vec<usize>,
}

impl FilteredSpectrum {
    /// The mean intensity used as the (exclusive) threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Index of each kept point in the source spectrum.
    pub fn source_indices(&self) -> &[usize] {
        &self.source_indices
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Promote the view to a spectrum of its own, e.g. to filter it again.
    ///
    /// Filtering the result a second time uses the higher mean of the
    /// filtered points and generally drops more of them.
    pub fn to_spectrum(&self) -> Result<MeasuredSpectrum> {
        MeasuredSpectrum::new(self.measurements.clone())
    }
}

/// Keep every point whose intensity is strictly greater than the spectrum's
/// mean intensity.
pub fn filter_significant(spectrum: &MeasuredSpectrum) -> FilteredSpectrum {
    let threshold = spectrum.mean_intensity();
    let (source_indices, measurements): (Vec<usize>, Vec<Measurement>) = spectrum
        .measurements()
        .iter()
        .enumerate()
        .filter(|(_, m)| m.intensity > threshold)
        .map(|(i, m)| (i, *m))
        .unzip();

    log::debug!(
        "significance filter: mean intensity {threshold}, kept {}/{} points",
        measurements.len(),
        spectrum.len()
    );

    FilteredSpectrum {
        threshold,
        measurements,
        source_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> MeasuredSpectrum {
        MeasuredSpectrum::from_pairs([(500.0, 10.0), (500.1, 50.0), (500.3, 5.0), (600.0, 80.0)])
            .unwrap()
    }

    #[test]
    fn keeps_points_above_mean_in_order() {
        let sp = scenario();
        let filtered = filter_significant(&sp);
        assert!((filtered.threshold() - 36.25).abs() < 1e-12);
        assert_eq!(
            filtered.measurements(),
            &[Measurement::new(500.1, 50.0), Measurement::new(600.0, 80.0)]
        );
        assert_eq!(filtered.source_indices(), &[1, 3]);
    }

    #[test]
    fn every_kept_point_is_above_threshold_and_in_source() {
        let sp = MeasuredSpectrum::from_pairs(
            (0..200).map(|i| (400.0 + i as f64 * 0.05, ((i * 37) % 101) as f64)),
        )
        .unwrap();
        let filtered = filter_significant(&sp);
        for (m, &idx) in filtered.measurements().iter().zip(filtered.source_indices()) {
            assert!(m.intensity > sp.mean_intensity());
            assert_eq!(sp.measurements()[idx], *m);
        }
    }

    #[test]
    fn value_equal_to_mean_is_dropped() {
        let sp = MeasuredSpectrum::from_pairs([(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)]).unwrap();
        assert!(filter_significant(&sp).is_empty());
    }

    #[test]
    fn refiltering_is_not_a_fixed_point() {
        let sp = scenario();
        let once = filter_significant(&sp);
        let twice = filter_significant(&once.to_spectrum().unwrap());
        assert!(twice.threshold() > once.threshold());
        assert_eq!(twice.measurements(), &[Measurement::new(600.0, 80.0)]);
    }

    #[test]
    fn nan_intensity_poisons_the_mean() {
        let sp = MeasuredSpectrum::from_pairs([(1.0, 2.0), (2.0, f64::NAN), (3.0, 9.0)]).unwrap();
        let filtered = filter_significant(&sp);
        assert!(filtered.threshold().is_nan());
        assert!(filtered.is_empty());
    }
}
