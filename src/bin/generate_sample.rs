use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// N2 second positive system band heads (nm).
const N2_SECOND_POSITIVE: [f64; 8] = [315.93, 337.13, 353.67, 357.69, 371.05, 375.54, 380.49, 405.94];

/// Hydrogen Balmer lines (nm).
const H_BALMER: [f64; 4] = [410.17, 434.05, 486.13, 656.28];

/// Lines absent from the synthetic spectrum, to give some empty windows.
const DECOYS: [f64; 2] = [520.0, 590.0];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavelengths: &[f64],
    peaks: &[(f64, f64, f64)],
    baseline: f64,
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&wl| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wl, mu, sigma, amp))
                .sum();
            baseline + signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_reference_csv(path: &str, lines: &[f64]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create reference file");
    writer
        .write_record(["lambda", "source"])
        .expect("Failed to write header");
    for wl in lines {
        writer
            .write_record([format!("{wl}"), "synthetic".to_string()])
            .expect("Failed to write reference line");
    }
    writer.flush().expect("Failed to flush reference file");
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Wavelengths: 300 → 700 nm, step 0.02
    let wavelengths: Vec<f64> = (0..20_000).map(|i| 300.0 + i as f64 * 0.02).collect();

    // Emission lines, slightly shifted from their reference positions.
    let mut peaks: Vec<(f64, f64, f64)> = Vec::new();
    for (i, &wl) in N2_SECOND_POSITIVE.iter().enumerate() {
        let shift = rng.gauss(0.0, 0.03);
        peaks.push((wl + shift, 0.08, 400.0 / (1.0 + i as f64 * 0.4)));
    }
    for (i, &wl) in H_BALMER.iter().enumerate() {
        let shift = rng.gauss(0.0, 0.03);
        peaks.push((wl + shift, 0.1, 150.0 + 100.0 * i as f64));
    }

    let intensities = generate_spectrum(&wavelengths, &peaks, 20.0, 2.0, &mut rng);

    // Headerless CSV
    let spectrum_csv = "sample_spectrum.csv";
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(spectrum_csv)
        .expect("Failed to create spectrum file");
    for (wl, i) in wavelengths.iter().zip(&intensities) {
        writer
            .write_record([format!("{wl:.2}"), format!("{i:.4}")])
            .expect("Failed to write spectrum row");
    }
    writer.flush().expect("Failed to flush spectrum file");

    // Parquet with named columns
    let schema = Arc::new(Schema::new(vec![
        Field::new("wavelength", DataType::Float64, false),
        Field::new("intensity", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wavelengths.clone())),
            Arc::new(Float64Array::from(intensities)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let spectrum_parquet = "sample_spectrum.parquet";
    let file = std::fs::File::create(spectrum_parquet).expect("Failed to create output file");
    let mut parquet_writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    parquet_writer.write(&batch).expect("Failed to write batch");
    parquet_writer.close().expect("Failed to close writer");

    // Reference systems
    let mut n2_with_decoys = N2_SECOND_POSITIVE.to_vec();
    n2_with_decoys.extend_from_slice(&DECOYS);
    write_reference_csv("second_positive_system_n2.csv", &n2_with_decoys);
    write_reference_csv("h_balmer_lines.csv", &H_BALMER);

    // Run configuration
    let config = json!({
        "spectrumSource": spectrum_csv,
        "referenceSystems": [
            { "name": "N2", "source": "second_positive_system_n2.csv" },
            { "name": "H-Balmer Lines", "source": "h_balmer_lines.csv" }
        ],
        "toleranceOffset": 0.1,
        "outputPath": "resultats",
        "outputFormat": "csv"
    });
    let config_path = "sample_run.json";
    std::fs::write(
        config_path,
        serde_json::to_string_pretty(&config).expect("Failed to encode config"),
    )
    .expect("Failed to write config");

    println!(
        "Wrote {} points to {spectrum_csv} and {spectrum_parquet}, run config in {config_path}",
        wavelengths.len()
    );
}
