use serde::Serialize;

use super::report::{MatchReporter, Silent};
use crate::data::{FilteredSpectrum, Measurement, ReferenceSystem};

// ---------------------------------------------------------------------------
// Tolerance window
// ---------------------------------------------------------------------------

/// `[center - offset, center + offset]`, inclusive on both ends.
///
/// A negative offset inverts the bounds and simply contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceWindow {
    pub center: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ToleranceWindow {
    pub fn around(center: f64, offset: f64) -> Self {
        Self {
            center,
            lower: center - offset,
            upper: center + offset,
        }
    }

    #[inline]
    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength >= self.lower && wavelength <= self.upper
    }
}

// ---------------------------------------------------------------------------
// Match results
// ---------------------------------------------------------------------------

/// What one satisfied window contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowOutcome {
    /// Reference wavelength the window is centred on.
    pub reference: f64,
    /// Filtered points inside the window.
    pub candidates: usize,
    pub max_intensity: f64,
    /// Every point reaching `max_intensity` (more than one on exact ties).
    pub peaks: Vec<Measurement>,
}

/// Per-system result of the window matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemMatch {
    system_name: String,
    offset: f64,
    reference_count: usize,
    match_count: usize,
    /// One flag per point of the filtered spectrum.
    mask: Vec<bool>,
    matches: Vec<Measurement>,
    windows: Vec<WindowOutcome>,
}

impl SystemMatch {
    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Number of reference lines in the system.
    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    /// Number of windows that contained at least one filtered point.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Selection mask over the filtered spectrum the match ran against.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Union of all selected points, in filtered-spectrum order, each point
    /// at most once.
    pub fn matches(&self) -> &[Measurement] {
        &self.matches
    }

    /// Satisfied windows in reference-line order.
    pub fn windows(&self) -> &[WindowOutcome] {
        &self.windows
    }
}

// ---------------------------------------------------------------------------
// Window matcher
// ---------------------------------------------------------------------------

/// Match one reference system against a filtered spectrum.
pub fn match_system(filtered: &FilteredSpectrum, system: &ReferenceSystem, offset: f64) -> SystemMatch {
    match_system_with(filtered, system, offset, &mut Silent)
}

/// Same as [`match_system`], narrating each window to `reporter`.
///
/// For every reference line, in system order, the filtered points inside
/// the tolerance window are collected. An empty window is skipped. Otherwise
/// the window counts as one match and every point at the window's maximum
/// intensity joins the selection mask. Windows may overlap; a point already
/// selected stays selected and is not counted again.
pub fn match_system_with(
    filtered: &FilteredSpectrum,
    system: &ReferenceSystem,
    offset: f64,
    reporter: &mut dyn MatchReporter,
) -> SystemMatch {
    let points = filtered.measurements();
    let mut mask = vec![false; points.len()];
    let mut windows = Vec::new();

    reporter.system_started(system.name(), offset);

    for line in system.lines() {
        let window = ToleranceWindow::around(line.wavelength, offset);
        let inside: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, m)| window.contains(m.wavelength))
            .map(|(i, _)| i)
            .collect();

        if inside.is_empty() {
            continue;
        }

        // NaN intensities are skipped by `max`; an all-NaN window still
        // counts but selects nothing.
        let max_intensity = inside
            .iter()
            .map(|&i| points[i].intensity)
            .fold(f64::NAN, f64::max);

        let mut peaks = Vec::new();
        for &i in &inside {
            if points[i].intensity == max_intensity {
                mask[i] = true;
                peaks.push(points[i]);
            }
        }

        let outcome = WindowOutcome {
            reference: line.wavelength,
            candidates: inside.len(),
            max_intensity,
            peaks,
        };
        reporter.window_matched(windows.len() + 1, &outcome);
        windows.push(outcome);
    }

    let matches = points
        .iter()
        .zip(&mask)
        .filter(|(_, &selected)| selected)
        .map(|(m, _)| *m)
        .collect();

    let result = SystemMatch {
        system_name: system.name().to_string(),
        offset,
        reference_count: system.len(),
        match_count: windows.len(),
        mask,
        matches,
        windows,
    };
    reporter.system_finished(&result);
    result
}
