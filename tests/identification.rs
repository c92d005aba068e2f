use std::path::PathBuf;

use spectral_lines::config::{RunConfig, SystemSource};
use spectral_lines::data::{filter_significant, MeasuredSpectrum, Measurement, ReferenceSystem};
use spectral_lines::export::{export_identification, ExportFormat};
use spectral_lines::identify::{identify, match_system, Recorder, ReportEvent, Silent};
use spectral_lines::pipeline::run;
use spectral_lines::Error;

fn scenario_spectrum() -> MeasuredSpectrum {
    MeasuredSpectrum::from_pairs([(500.0, 10.0), (500.1, 50.0), (500.3, 5.0), (600.0, 80.0)]).unwrap()
}

/// A noisy spectrum with a handful of emission lines, deterministic.
fn synthetic_spectrum() -> MeasuredSpectrum {
    let lines = [(337.13, 400.0), (357.69, 250.0), (380.49, 120.0), (486.13, 300.0)];
    MeasuredSpectrum::from_pairs((0..8000).map(|i| {
        let wl = 300.0 + i as f64 * 0.025;
        let noise = ((i * 7919) % 97) as f64 / 10.0;
        let signal: f64 = lines
            .iter()
            .map(|&(mu, amp)| amp * (-(wl - mu).powi(2) / (2.0 * 0.05_f64.powi(2))).exp())
            .sum();
        (wl, 20.0 + noise + signal)
    }))
    .unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("spectral-lines-it-{}", std::process::id()))
        .join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn scenario_match_and_no_match() {
    let systems = vec![
        ReferenceSystem::from_wavelengths("A", [500.05]).unwrap(),
        ReferenceSystem::from_wavelengths("B", [550.0]).unwrap(),
    ];
    let ident = identify(scenario_spectrum(), &systems, 0.1, &mut Silent).unwrap();

    assert!((ident.mean_intensity() - 36.25).abs() < 1e-12);
    assert_eq!(
        ident.filtered().measurements(),
        &[Measurement::new(500.1, 50.0), Measurement::new(600.0, 80.0)]
    );

    let a = ident.result("A").unwrap();
    assert_eq!(a.match_count(), 1);
    assert_eq!(a.matches(), &[Measurement::new(500.1, 50.0)]);

    let b = ident.result("B").unwrap();
    assert_eq!(b.match_count(), 0);
    assert!(b.matches().is_empty());
}

#[test]
fn scenario_tie_counts_one_window() {
    let sp = MeasuredSpectrum::from_pairs([(400.0, 1.0), (501.0, 60.0), (501.05, 60.0), (650.0, 2.0)])
        .unwrap();
    let system = ReferenceSystem::from_wavelengths("T", [501.02]).unwrap();
    let result = match_system(&filter_significant(&sp), &system, 0.1);
    assert_eq!(result.match_count(), 1);
    assert_eq!(
        result.matches(),
        &[Measurement::new(501.0, 60.0), Measurement::new(501.05, 60.0)]
    );
}

#[test]
fn properties_hold_on_synthetic_data() {
    let sp = synthetic_spectrum();
    let filtered = filter_significant(&sp);
    let mean = sp.mean_intensity();
    let offset = 0.1;

    for m in filtered.measurements() {
        assert!(m.intensity > mean);
        assert!(sp.measurements().contains(m));
    }

    let system = ReferenceSystem::from_wavelengths(
        "N2",
        [315.93, 337.13, 353.67, 357.69, 371.05, 375.54, 380.49, 405.94],
    )
    .unwrap();
    let result = match_system(&filtered, &system, offset);
    assert_eq!(result, match_system(&filtered, &system, offset));
    assert!(result.match_count() <= system.len());
    assert!(result.match_count() >= 3);

    for window in result.windows() {
        let inside: Vec<&Measurement> = filtered
            .measurements()
            .iter()
            .filter(|m| {
                m.wavelength >= window.reference - offset && m.wavelength <= window.reference + offset
            })
            .collect();
        for peak in &window.peaks {
            assert!(inside.contains(&peak));
            assert!(inside.iter().all(|m| m.intensity <= peak.intensity));
        }
    }
}

#[test]
fn reporter_narrates_each_system() {
    let systems = vec![
        ReferenceSystem::from_wavelengths("A", [500.05]).unwrap(),
        ReferenceSystem::from_wavelengths("B", [550.0]).unwrap(),
    ];
    let mut recorder = Recorder::default();
    identify(scenario_spectrum(), &systems, 0.1, &mut recorder).unwrap();

    let finished: Vec<(String, usize)> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            ReportEvent::Finished { system, match_count } => Some((system.clone(), *match_count)),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![("A".to_string(), 1), ("B".to_string(), 0)]);
}

#[test]
fn pipeline_from_files_to_export() {
    let dir = scratch_dir("pipeline");
    std::fs::write(dir.join("spectrum.csv"), "500.0,10\n500.1,50\n500.3,5\n600.0,80\n").unwrap();
    std::fs::write(dir.join("a.csv"), "lambda,comment\n500.05,first\n600.0,second\n").unwrap();
    std::fs::write(dir.join("b.json"), "[550.0]").unwrap();

    let mut config = RunConfig::new(
        "spectrum.csv",
        vec![
            SystemSource { name: "A".into(), source: "a.csv".into() },
            SystemSource { name: "B".into(), source: "b.json".into() },
        ],
    );
    config.resolve_relative_to(&dir);

    let ident = run(&config, &mut Silent).unwrap();
    assert_eq!(ident.result("A").unwrap().match_count(), 2);
    assert_eq!(ident.result("B").unwrap().match_count(), 0);

    let out = export_identification(&ident, &dir.join("resultats"), ExportFormat::Csv).unwrap();
    let text = std::fs::read_to_string(out).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn empty_spectrum_aborts_the_run() {
    let dir = scratch_dir("empty");
    std::fs::write(dir.join("spectrum.csv"), "").unwrap();
    std::fs::write(dir.join("a.csv"), "wavelength\n500.0\n").unwrap();

    let mut config = RunConfig::new(
        "spectrum.csv",
        vec![SystemSource { name: "A".into(), source: "a.csv".into() }],
    );
    config.resolve_relative_to(&dir);

    assert!(matches!(run(&config, &mut Silent), Err(Error::Input(_))));
}

#[test]
fn non_positive_offset_aborts_the_run() {
    let mut config = RunConfig::new(
        "unused.csv",
        vec![SystemSource { name: "A".into(), source: "a.csv".into() }],
    );
    config.tolerance_offset = 0.0;
    assert!(matches!(run(&config, &mut Silent), Err(Error::Config(_))));
}
