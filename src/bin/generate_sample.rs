//! Write a synthetic weekly light curve as FITS and Parquet, plus a
//! parameter file pointing at it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use gamma_lc::config::{DataConfig, Params, PlotConfig, SelectionConfig};
use gamma_lc::data::fits::{write_bintable, FitsColumn};

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic light curve and a parameter file")]
struct Args {
    /// Output directory
    #[arg(default_value = ".")]
    dir: PathBuf,
}

/// MJD of the mission reference epoch (MET 0).
const MJD_REF: f64 = 51910.0;
const DAY: f64 = 86400.0;
const FIRST_MJD: f64 = 54682.65;
const BIN_DAYS: f64 = 7.0;
const N_BINS: usize = 80;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

/// Columns of a FermiPy-style light curve.
#[derive(Default)]
struct LightCurve {
    tmin: Vec<f64>,
    tmax: Vec<f64>,
    tmin_mjd: Vec<f64>,
    tmax_mjd: Vec<f64>,
    flux: Vec<f64>,
    flux_err: Vec<f64>,
    eflux: Vec<f64>,
    eflux_err: Vec<f64>,
    ts: Vec<f64>,
    param_values: Vec<Vec<f64>>,
    param_errors: Vec<Vec<f64>>,
}

/// A quiescent source with two flares; a few bins are too faint to pass the cuts.
fn simulate(rng: &mut SimpleRng) -> LightCurve {
    let mut lc = LightCurve::default();
    let flare = |mjd: f64, peak: f64, width: f64| (-(mjd - peak).powi(2) / (2.0 * width * width)).exp();

    for i in 0..N_BINS {
        let start = FIRST_MJD + i as f64 * BIN_DAYS;
        let end = start + BIN_DAYS;
        let mid = (start + end) / 2.0;

        let level = 1.5e-7 + 6e-7 * flare(mid, 54900.0, 20.0) + 3e-7 * flare(mid, 55150.0, 12.0);
        let flux = (level * rng.gauss(1.0, 0.15)).max(1e-9);
        let flux_err = 0.2 * level + 2e-8 * rng.next_f64();
        let ts = ((flux / flux_err).powi(2) * rng.gauss(1.0, 0.1)).max(0.0);
        let index = rng.gauss(2.4, 0.15) - 0.3 * (level / 9e-7);
        let index_err = 0.08 + 0.4 / ts.sqrt().max(1.0);
        let eflux = flux * 1.6e-4 * rng.gauss(1.0, 0.05);

        lc.tmin.push((start - MJD_REF) * DAY);
        lc.tmax.push((end - MJD_REF) * DAY);
        lc.tmin_mjd.push(start);
        lc.tmax_mjd.push(end);
        lc.flux.push(flux);
        lc.flux_err.push(flux_err);
        lc.eflux.push(eflux);
        lc.eflux_err.push(eflux * flux_err / flux);
        lc.ts.push(ts);
        lc.param_values.push(vec![flux * 1e3, index, 1000.0]);
        lc.param_errors.push(vec![flux_err * 1e3, index_err, 0.0]);
    }
    lc
}

impl LightCurve {
    fn scalars(&self) -> [(&'static str, &Vec<f64>); 9] {
        [
            ("tmin", &self.tmin),
            ("tmax", &self.tmax),
            ("tmin_mjd", &self.tmin_mjd),
            ("tmax_mjd", &self.tmax_mjd),
            ("flux", &self.flux),
            ("flux_err", &self.flux_err),
            ("eflux", &self.eflux),
            ("eflux_err", &self.eflux_err),
            ("ts", &self.ts),
        ]
    }

    fn write_fits(&self, path: &std::path::Path) -> Result<()> {
        let mut columns: Vec<(&str, FitsColumn)> = self
            .scalars()
            .into_iter()
            .map(|(name, v)| (name, FitsColumn::Scalar(v.clone())))
            .collect();
        columns.push(("param_values", FitsColumn::Vector(self.param_values.clone())));
        columns.push(("param_errors", FitsColumn::Vector(self.param_errors.clone())));

        write_bintable(path, "LIGHTCURVE", &columns).with_context(|| format!("writing {}", path.display()))
    }

    fn write_parquet(&self, path: &std::path::Path) -> Result<()> {
        let list_type = DataType::List(Arc::new(Field::new("item", DataType::Float64, true)));

        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (name, values) in self.scalars() {
            fields.push(Field::new(name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values.clone())));
        }
        for (name, rows) in [("param_values", &self.param_values), ("param_errors", &self.param_errors)] {
            let mut builder = ListBuilder::new(Float64Builder::new());
            for row in rows {
                builder.values().append_slice(row);
                builder.append(true);
            }
            fields.push(Field::new(name, list_type.clone(), false));
            arrays.push(Arc::new(builder.finish()));
        }

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { dir } = Args::parse();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let lc = simulate(&mut rng);

    let fits_path = dir.join("sample_lc.fits");
    lc.write_fits(&fits_path)?;
    log::info!("Wrote {N_BINS} time bins to {}", fits_path.display());

    let parquet_path = dir.join("sample_lc.parquet");
    lc.write_parquet(&parquet_path)?;
    log::info!("Wrote {N_BINS} time bins to {}", parquet_path.display());

    let params = Params {
        data: DataConfig {
            tag: "SampleSource".into(),
            path: PathBuf::from("sample_lc.fits"),
            sources: [("SampleSource (parquet)".to_string(), PathBuf::from("sample_lc.parquet"))]
                .into_iter()
                .collect(),
        },
        selection: SelectionConfig::default(),
        plot: PlotConfig {
            plot_title: "Sample Source".into(),
            plot_name: "sample_lc.svg".into(),
            ..PlotConfig::default()
        },
    };
    let params_path = dir.join("params_sample.yaml");
    std::fs::write(&params_path, params.to_yaml()?).with_context(|| format!("writing {}", params_path.display()))?;

    println!(
        "Wrote {N_BINS} weekly bins to {} and {}, parameters to {}",
        fits_path.display(),
        parquet_path.display(),
        params_path.display()
    );
    Ok(())
}
