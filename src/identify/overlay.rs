use super::Identification;
use crate::data::Measurement;

/// Fraction of the intensity span between two consecutive system levels.
const LEVEL_STEP_FRACTION: f64 = 0.05;

// ---------------------------------------------------------------------------
// Annotation layout for plotting consumers
// ---------------------------------------------------------------------------

/// Where to draw one system's annotations.
///
/// Each marker gets a vertical segment from its intensity up (or down) to
/// `level`; a horizontal segment at `level` spans `span`.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemOverlay {
    pub system_name: String,
    pub level: f64,
    /// `(min, max)` matched wavelength; `None` when nothing matched.
    pub span: Option<(f64, f64)>,
    pub markers: Vec<Measurement>,
}

/// One overlay per system, in result order, each on its own level.
///
/// Levels start at the middle of the spectrum's intensity range and climb by
/// a twentieth of that range per system.
pub fn build_overlays(identification: &Identification) -> Vec<SystemOverlay> {
    let (lo, hi) = identification.spectrum().intensity_range();
    let span = hi - lo;
    let step = if span.is_finite() && span > 0.0 {
        span * LEVEL_STEP_FRACTION
    } else {
        1.0
    };
    let base = ((hi + lo) / 2.0).round();

    identification
        .results()
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let markers = result.matches().to_vec();
            let span = markers.iter().fold(None, |acc: Option<(f64, f64)>, m| {
                Some(match acc {
                    None => (m.wavelength, m.wavelength),
                    Some((a, b)) => (a.min(m.wavelength), b.max(m.wavelength)),
                })
            });
            SystemOverlay {
                system_name: result.system_name().to_string(),
                level: base + step * i as f64,
                span,
                markers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MeasuredSpectrum, ReferenceSystem};
    use crate::identify::{identify, Silent};

    #[test]
    fn levels_are_distinct_and_spans_cover_markers() {
        let sp = MeasuredSpectrum::from_pairs([
            (500.0, 0.0),
            (500.1, 50.0),
            (500.3, 5.0),
            (600.0, 80.0),
            (601.0, 100.0),
        ])
        .unwrap();
        let systems = vec![
            ReferenceSystem::from_wavelengths("A", [500.05, 600.0]).unwrap(),
            ReferenceSystem::from_wavelengths("B", [550.0]).unwrap(),
        ];
        let ident = identify(sp, &systems, 0.1, &mut Silent).unwrap();
        let overlays = build_overlays(&ident);

        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].level, 50.0);
        assert_eq!(overlays[1].level, 55.0);
        assert_eq!(overlays[0].span, Some((500.1, 600.0)));
        assert_eq!(overlays[0].markers.len(), 2);
        assert_eq!(overlays[1].span, None);
        assert!(overlays[1].markers.is_empty());
    }

    #[test]
    fn flat_spectrum_uses_unit_step() {
        let sp = MeasuredSpectrum::from_pairs([(1.0, 3.0), (2.0, 3.0)]).unwrap();
        let systems = vec![
            ReferenceSystem::from_wavelengths("A", [1.0]).unwrap(),
            ReferenceSystem::from_wavelengths("B", [2.0]).unwrap(),
        ];
        let ident = identify(sp, &systems, 0.1, &mut Silent).unwrap();
        let levels: Vec<f64> = build_overlays(&ident).iter().map(|o| o.level).collect();
        assert_eq!(levels, vec![3.0, 4.0]);
    }
}
