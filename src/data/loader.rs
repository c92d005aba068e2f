use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float64Type, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{MeasuredSpectrum, Measurement, ReferenceLine, ReferenceSystem};
use crate::error::{Error, Result};

const WAVELENGTH_COLUMNS: [&str; 2] = ["wavelength", "lambda"];
const INTENSITY_COLUMNS: [&str; 2] = ["intensity", "I"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a measured spectrum.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`            – two comma-separated columns, no header
/// * `.tsv` / `.txt`   – two tab-separated columns, no header
/// * `.json`           – `[[wavelength, intensity], ...]` or
///                       `[{ "wavelength": .., "intensity": .. }, ...]`
/// * `.parquet`        – `wavelength` / `intensity` columns (or the first two)
pub fn load_spectrum(path: &Path) -> Result<MeasuredSpectrum> {
    let spectrum = match extension(path).as_str() {
        "csv" => load_delimited_spectrum(path, b',')?,
        "tsv" | "txt" => load_delimited_spectrum(path, b'\t')?,
        "json" => load_json_spectrum(path)?,
        "parquet" | "pq" => load_parquet_spectrum(path)?,
        other => {
            return Err(Error::data_format(
                origin(path),
                format!("unsupported spectrum file extension: .{other}"),
            ))
        }
    };
    log::info!(
        "Loaded {} spectrum points from {}",
        spectrum.len(),
        path.display()
    );
    Ok(spectrum)
}

/// Load the lines of one reference system.
///
/// * `.csv`  – header row with a `wavelength` (or `lambda`) column; other
///             columns are ignored
/// * `.json` – `[337.13, 357.69, ...]` or `[{ "wavelength": .. }, ...]`
pub fn load_reference_system(name: &str, path: &Path) -> Result<ReferenceSystem> {
    let lines = match extension(path).as_str() {
        "csv" => load_csv_lines(path)?,
        "json" => load_json_lines(path)?,
        other => {
            return Err(Error::data_format(
                origin(path),
                format!("unsupported reference file extension: .{other}"),
            ))
        }
    };
    let system = ReferenceSystem::new(name, lines)?;
    log::info!(
        "Loaded reference system {name:?}: {} lines from {}",
        system.len(),
        path.display()
    );
    Ok(system)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn origin(path: &Path) -> String {
    path.display().to_string()
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::io(path, e))
}

fn parse_number(token: &str, origin: &str, row: usize, column: &str) -> Result<f64> {
    let value = token.parse::<f64>().map_err(|_| {
        Error::data_format(origin, format!("row {row}, {column}: '{token}' is not a number"))
    })?;
    ensure_finite(value, origin, row, column)
}

fn ensure_finite(value: f64, origin: &str, row: usize, column: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::data_format(
            origin,
            format!("row {row}, {column}: {value} is not a finite number"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Headerless two-column table, one measurement per row.
fn load_delimited_spectrum(path: &Path, delimiter: u8) -> Result<MeasuredSpectrum> {
    let origin = origin(path);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let mut points = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != 2 {
            return Err(Error::data_format(
                &origin,
                format!("row {row_no}: expected 2 columns, found {}", record.len()),
            ));
        }
        let wavelength = parse_number(&record[0], &origin, row_no, "wavelength")?;
        let intensity = parse_number(&record[1], &origin, row_no, "intensity")?;
        points.push(Measurement::new(wavelength, intensity));
    }

    MeasuredSpectrum::new(points)
}

/// Reference table with a header; only the wavelength column is read.
fn load_csv_lines(path: &Path) -> Result<Vec<ReferenceLine>> {
    let origin = origin(path);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let column = reader
        .headers()?
        .iter()
        .position(|h| WAVELENGTH_COLUMNS.iter().any(|c| h.eq_ignore_ascii_case(c)))
        .ok_or_else(|| Error::data_format(&origin, "missing 'wavelength' column"))?;

    let mut lines = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let token = record.get(column).unwrap_or("");
        let wavelength = parse_number(token, &origin, row_no, "wavelength")?;
        lines.push(ReferenceLine { wavelength });
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

fn read_json_array(path: &Path) -> Result<Vec<JsonValue>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    match serde_json::from_str::<JsonValue>(&text)? {
        JsonValue::Array(rows) => Ok(rows),
        _ => Err(Error::data_format(origin(path), "expected a top-level JSON array")),
    }
}

fn field<'a>(obj: &'a Map<String, JsonValue>, names: &[&str]) -> Option<&'a JsonValue> {
    names.iter().find_map(|n| obj.get(*n))
}

fn json_number(val: Option<&JsonValue>, origin: &str, row: usize, column: &str) -> Result<f64> {
    let value = val.and_then(JsonValue::as_f64).ok_or_else(|| {
        Error::data_format(origin, format!("row {row}: missing or non-numeric {column}"))
    })?;
    ensure_finite(value, origin, row, column)
}

fn load_json_spectrum(path: &Path) -> Result<MeasuredSpectrum> {
    let origin = origin(path);
    let rows = read_json_array(path)?;

    let mut points = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let (wavelength, intensity) = match row {
            JsonValue::Array(pair) if pair.len() == 2 => (pair.first(), pair.get(1)),
            JsonValue::Object(obj) => (
                field(obj, &WAVELENGTH_COLUMNS),
                field(obj, &INTENSITY_COLUMNS),
            ),
            _ => {
                return Err(Error::data_format(
                    &origin,
                    format!("row {i}: expected a [wavelength, intensity] pair or an object"),
                ))
            }
        };
        points.push(Measurement::new(
            json_number(wavelength, &origin, i, "wavelength")?,
            json_number(intensity, &origin, i, "intensity")?,
        ));
    }

    MeasuredSpectrum::new(points)
}

fn load_json_lines(path: &Path) -> Result<Vec<ReferenceLine>> {
    let origin = origin(path);
    read_json_array(path)?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let value = match row {
                JsonValue::Object(obj) => field(obj, &WAVELENGTH_COLUMNS),
                other => Some(other),
            };
            json_number(value, &origin, i, "wavelength").map(|wavelength| ReferenceLine { wavelength })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a spectrum stored as two numeric Parquet columns.
///
/// Columns are looked up by name (`wavelength`/`lambda`, `intensity`/`I`);
/// without those names the first two columns are used. Any numeric Arrow
/// type is accepted and cast to Float64. Nulls are rejected.
fn load_parquet_spectrum(path: &Path) -> Result<MeasuredSpectrum> {
    let origin = origin(path);
    let reader = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?.build()?;

    let mut points = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let (w_idx, i_idx) = locate_columns(&batch.schema(), &origin)?;

        let offset = points.len();
        let wavelengths = float_column(batch.column(w_idx), &origin, "wavelength", offset)?;
        let intensities = float_column(batch.column(i_idx), &origin, "intensity", offset)?;

        for (j, (w, i)) in wavelengths.into_iter().zip(intensities).enumerate() {
            points.push(Measurement::new(
                ensure_finite(w, &origin, offset + j, "wavelength")?,
                ensure_finite(i, &origin, offset + j, "intensity")?,
            ));
        }
    }

    MeasuredSpectrum::new(points)
}

fn locate_columns(schema: &Schema, origin: &str) -> Result<(usize, usize)> {
    let find = |names: &[&str]| names.iter().find_map(|n| schema.index_of(n).ok());
    match (find(&WAVELENGTH_COLUMNS), find(&INTENSITY_COLUMNS)) {
        (Some(w), Some(i)) => Ok((w, i)),
        _ if schema.fields().len() >= 2 => Ok((0, 1)),
        _ => Err(Error::data_format(
            origin,
            "parquet file needs wavelength and intensity columns",
        )),
    }
}

fn float_column(col: &ArrayRef, origin: &str, name: &str, row_offset: usize) -> Result<Vec<f64>> {
    if !col.data_type().is_numeric() {
        return Err(Error::data_format(
            origin,
            format!("{name} column has type {:?}, expected a number", col.data_type()),
        ));
    }
    let cast = arrow::compute::cast(col, &DataType::Float64)?;
    cast.as_primitive::<Float64Type>()
        .iter()
        .enumerate()
        .map(|(j, v)| {
            v.ok_or_else(|| {
                Error::data_format(origin, format!("row {}: null {name}", row_offset + j))
            })
        })
        .collect()
}
