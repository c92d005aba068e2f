use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::identify::validate_offset;

/// Default half-width of the tolerance window, in spectrum units.
pub const DEFAULT_TOLERANCE_OFFSET: f64 = 0.1;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// One named reference system and the file its lines come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSource {
    pub name: String,
    pub source: PathBuf,
}

/// Everything one identification run needs.
///
/// JSON layout:
///
/// ```json
/// {
///   "spectrumSource": "donnees/spectrum.csv",
///   "referenceSystems": [
///     { "name": "N2", "source": "donnees/second_positive_system_n2.csv" },
///     { "name": "H-Balmer Lines", "source": "donnees/balmer.csv" }
///   ],
///   "toleranceOffset": 0.1,
///   "outputPath": "resultats",
///   "outputFormat": "csv"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub spectrum_source: PathBuf,
    pub reference_systems: Vec<SystemSource>,
    #[serde(default = "default_offset")]
    pub tolerance_offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub output_format: ExportFormat,
}

fn default_offset() -> f64 {
    DEFAULT_TOLERANCE_OFFSET
}

impl RunConfig {
    pub fn new(spectrum_source: impl Into<PathBuf>, reference_systems: Vec<SystemSource>) -> Self {
        Self {
            spectrum_source: spectrum_source.into(),
            reference_systems,
            tolerance_offset: DEFAULT_TOLERANCE_OFFSET,
            output_path: None,
            output_format: ExportFormat::default(),
        }
    }

    /// Read a JSON config file. Relative paths inside it are resolved
    /// against the file's own directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: RunConfig = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        config.validate()?;
        Ok(config)
    }

    /// Prefix every relative path with `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.spectrum_source);
        for system in &mut self.reference_systems {
            resolve(&mut system.source);
        }
        if let Some(out) = self.output_path.as_mut() {
            resolve(out);
        }
    }

    /// Check the parts that do not need the input files.
    pub fn validate(&self) -> Result<()> {
        validate_offset(self.tolerance_offset)?;
        if self.reference_systems.is_empty() {
            return Err(Error::Input("no reference systems configured".into()));
        }
        let mut seen = BTreeSet::new();
        for system in &self.reference_systems {
            if system.name.trim().is_empty() {
                return Err(Error::Config("reference system with an empty name".into()));
            }
            if !seen.insert(system.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate reference system name {:?}",
                    system.name
                )));
            }
        }
        Ok(())
    }
}

/// Parse a `NAME=PATH` pair as given on the command line.
pub fn parse_system_source(arg: &str) -> std::result::Result<SystemSource, String> {
    let (name, source) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got {arg:?}"))?;
    let name = name.trim();
    if name.is_empty() || source.trim().is_empty() {
        return Err(format!("expected NAME=PATH, got {arg:?}"));
    }
    Ok(SystemSource {
        name: name.to_string(),
        source: PathBuf::from(source.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spectral-lines-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_and_relative_paths() {
        let dir = scratch_dir();
        let path = dir.join("run.json");
        std::fs::write(
            &path,
            r#"{
                "spectrumSource": "spectrum.csv",
                "referenceSystems": [{ "name": "N2", "source": "/abs/n2.csv" }],
                "outputPath": "resultats"
            }"#,
        )
        .unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.tolerance_offset, DEFAULT_TOLERANCE_OFFSET);
        assert_eq!(config.output_format, ExportFormat::Csv);
        assert_eq!(config.spectrum_source, dir.join("spectrum.csv"));
        assert_eq!(config.reference_systems[0].source, PathBuf::from("/abs/n2.csv"));
        assert_eq!(config.output_path, Some(dir.join("resultats")));
    }

    #[test]
    fn invalid_offset_in_file() {
        let path = scratch_dir().join("zero.json");
        std::fs::write(
            &path,
            r#"{ "spectrumSource": "s.csv",
                 "referenceSystems": [{ "name": "A", "source": "a.csv" }],
                 "toleranceOffset": 0 }"#,
        )
        .unwrap();
        assert!(matches!(RunConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let path = scratch_dir().join("broken.json");
        std::fs::write(&path, r#"{ "spectrumSource": 3 }"#).unwrap();
        assert!(matches!(RunConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_lists() {
        let mut config = RunConfig::new("s.csv", Vec::new());
        assert!(matches!(config.validate(), Err(Error::Input(_))));

        config.reference_systems = vec![
            SystemSource { name: "H2".into(), source: "a.csv".into() },
            SystemSource { name: "H2".into(), source: "b.csv".into() },
        ];
        assert!(matches!(config.validate(), Err(Error::Config(m)) if m.contains("H2")));
    }

    #[test]
    fn system_source_from_cli() {
        let s = parse_system_source("H-Balmer Lines=data/balmer.csv").unwrap();
        assert_eq!(s.name, "H-Balmer Lines");
        assert_eq!(s.source, PathBuf::from("data/balmer.csv"));
        assert!(parse_system_source("no-separator").is_err());
        assert!(parse_system_source("=x.csv").is_err());
    }
}
