/// Data layer: core types, loading, and the significance filter.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MeasuredSpectrum / ReferenceSystem
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ MeasuredSpectrum │  Vec<Measurement>, never empty
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  intensity > mean → FilteredSpectrum
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;

pub use filter::{filter_significant, mean_intensity, FilteredSpectrum};
pub use model::{MeasuredSpectrum, Measurement, ReferenceLine, ReferenceSystem};
