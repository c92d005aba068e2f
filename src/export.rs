use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::data::Measurement;
use crate::error::{Error, Result};
use crate::identify::{Identification, WindowOutcome};

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::Config(format!("unsupported export format: {other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Serialized shapes
// ---------------------------------------------------------------------------

/// One CSV row: a single emitted peak of one window.
#[derive(Debug, Serialize)]
struct PeakRow<'a> {
    system: &'a str,
    reference_wavelength: f64,
    wavelength: f64,
    intensity: f64,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tolerance_offset: f64,
    mean_intensity: f64,
    spectrum_points: usize,
    significant_points: usize,
    systems: Vec<SystemReport<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemReport<'a> {
    name: &'a str,
    match_count: usize,
    reference_count: usize,
    matches: &'a [Measurement],
    windows: &'a [WindowOutcome],
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write one row per emitted peak.
pub fn write_csv<W: Write>(identification: &Identification, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for result in identification.results() {
        for window in result.windows() {
            for peak in &window.peaks {
                writer.serialize(PeakRow {
                    system: result.system_name(),
                    reference_wavelength: window.reference,
                    wavelength: peak.wavelength,
                    intensity: peak.intensity,
                })?;
            }
        }
    }
    writer
        .flush()
        .map_err(|e| Error::Csv(csv::Error::from(e)))
}

/// Write the run summary and every system's matches and windows.
pub fn write_json<W: Write>(identification: &Identification, out: W) -> Result<()> {
    let report = Report {
        tolerance_offset: identification.offset(),
        mean_intensity: identification.mean_intensity(),
        spectrum_points: identification.spectrum().len(),
        significant_points: identification.filtered().len(),
        systems: identification
            .results()
            .iter()
            .map(|r| SystemReport {
                name: r.system_name(),
                match_count: r.match_count(),
                reference_count: r.reference_count(),
                matches: r.matches(),
                windows: r.windows(),
            })
            .collect(),
    };
    let mut out = out;
    serde_json::to_writer_pretty(&mut out, &report)?;
    out.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Artifacts on disk
// ---------------------------------------------------------------------------

/// Artifact file stem for the current local time, e.g.
/// `Identification 2024-05-01 14-03-22`.
pub fn timestamped_stem(prefix: &str) -> String {
    format!("{prefix} {}", Local::now().format("%Y-%m-%d %H-%M-%S"))
}

/// Create `<stem>.<ext>` in `dir`, falling back to `<stem> (2).<ext>`,
/// `<stem> (3).<ext>`... Existing files are never truncated.
fn create_unique(dir: &Path, stem: &str, extension: &str) -> Result<(PathBuf, File)> {
    let mut n = 1u32;
    loop {
        let name = if n == 1 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem} ({n}).{extension}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(Error::io(&path, e)),
        }
    }
}

/// Write the identification into `dir` (created if missing) and return the
/// path of the new file.
pub fn export_identification(
    identification: &Identification,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let (path, file) = create_unique(dir, &timestamped_stem("Identification"), format.extension())?;
    let out = BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(identification, out)?,
        ExportFormat::Json => write_json(identification, out)?,
    }
    log::info!("Exported identification to {}", path.display());
    Ok(path)
}

/// Save an RGBA8 capture of the rendered plot as `Fig <timestamp>.png`
/// in `dir` (created if missing).
pub fn save_figure(width: u32, height: u32, rgba: Vec<u8>, dir: &Path) -> Result<PathBuf> {
    let figure = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        Error::Input(format!("figure buffer does not hold {width}x{height} RGBA pixels"))
    })?;
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let (path, file) = create_unique(dir, &timestamped_stem("Fig"), "png")?;
    let mut out = BufWriter::new(file);
    figure.write_to(&mut out, image::ImageFormat::Png)?;
    out.flush().map_err(|e| Error::io(&path, e))?;
    log::info!("Saved figure {width}x{height} to {}", path.display());
    Ok(path)
}
