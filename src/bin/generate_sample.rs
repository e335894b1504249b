//! Writes synthetic admissions datasets for both dashboards:
//! `gems_with_coordinates.csv`, `gems_with_coordinates.parquet` and
//! `accessible_excellence.csv`. Values are deliberately messy in places
//! (`N/A`, blanks, missing coordinates) so the normaliser has work to do.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

#[derive(Parser, Debug)]
#[command(name = "generate_sample", about = "Write synthetic admissions datasets")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Institutions per dataset
    #[arg(short = 'n', long, default_value_t = 150)]
    count: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const GEMS_HEADER: [&str; 12] = [
    "Institution Name",
    "City location of institution (HD2022)",
    "State abbreviation (HD2022)",
    "Control of institution (IPEDS)",
    "Acceptance Rate 2022 (IPEDS)",
    "6 Year Grad Rate 2022 (IPEDS)",
    "FTFT Grad Rate (6 Years) 2015-2016 Cohort (Bain)",
    "Yield Rate 2022 (IPEDS)",
    "Earnings-to-Price Ratio (Itzkowitz)",
    "Average net price over four years (Itkowitz)",
    "Latitude",
    "Longitude",
];

const EXCELLENCE_HEADER: [&str; 7] = [
    "Institution Name",
    "City location of institution (HD2022)",
    "State abbreviation (HD2022)",
    "Control of institution (IPEDS)",
    "Fit Rating for Accessible Excellence List",
    "Latitude",
    "Longitude",
];

/// (state, city, latitude, longitude)
const PLACES: [(&str, &str, f64, f64); 12] = [
    ("PA", "State College", 40.79, -77.86),
    ("NY", "Ithaca", 42.44, -76.50),
    ("OH", "Oberlin", 41.29, -82.22),
    ("CA", "Claremont", 34.10, -117.72),
    ("TX", "Austin", 30.27, -97.74),
    ("MN", "Northfield", 44.46, -93.16),
    ("GA", "Athens", 33.96, -83.38),
    ("WA", "Walla Walla", 46.06, -118.34),
    ("VA", "Lexington", 37.78, -79.44),
    ("IL", "Galesburg", 40.95, -90.37),
    ("NC", "Davidson", 35.50, -80.85),
    ("CO", "Golden", 39.76, -105.22),
];

const NAME_PREFIX: [&str; 10] = [
    "Harbor", "Summit", "Riverbend", "Oakridge", "Lakeside", "Granite", "Maple", "Westfield",
    "Northgate", "Cedar",
];
const NAME_SUFFIX: [&str; 5] = ["College", "University", "State University", "Institute", "Polytechnic"];
const FIT_RATINGS: [&str; 3] = ["★★★", "★★☆", "★☆☆"];

/// SplitMix64: small, seedable, and plenty for fake admissions data.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }

    fn chance(&mut self, p: f64) -> bool {
        self.uniform(0.0, 1.0) < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `None` with probability `p_missing`, otherwise a fresh draw.
    fn unless_missing<T>(&mut self, p_missing: f64, draw: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.chance(p_missing) {
            None
        } else {
            Some(draw(self))
        }
    }
}

/// One synthetic institution; optional fields are the ones that get blanked.
struct Synthetic {
    name: String,
    city: String,
    state: String,
    control: i64,
    admission: Option<f64>,
    graduation: Option<f64>,
    cohort_graduation: Option<f64>,
    yield_rate: Option<f64>,
    ratio: Option<f64>,
    cost: Option<f64>,
    coords: Option<(f64, f64)>,
    fit_rating: &'static str,
}

fn synthesize(rng: &mut SampleRng, i: usize) -> Synthetic {
    let (state, city, lat, lon) = *rng.pick(&PLACES);
    let name = format!("{} {} {}", rng.pick(&NAME_PREFIX), rng.pick(&NAME_SUFFIX), i + 1);
    let admission = rng.uniform(0.05, 0.98);
    let graduation = (1.05 - admission * 0.6 + rng.uniform(-0.15, 0.1)).clamp(0.1, 0.99);

    Synthetic {
        name,
        city: city.to_string(),
        state: state.to_string(),
        // Occasional unmapped control code.
        control: if rng.chance(0.03) { 3 } else if rng.chance(0.45) { 1 } else { 2 },
        admission: rng.unless_missing(0.06, |_| admission),
        graduation: rng.unless_missing(0.04, |_| graduation),
        cohort_graduation: rng.unless_missing(0.2, |r| {
            (graduation + r.uniform(-0.08, 0.05)).clamp(0.05, 0.99)
        }),
        yield_rate: rng.unless_missing(0.08, |r| r.uniform(0.1, 0.8)),
        // One extreme outlier keeps the slider cap honest.
        ratio: if i == 7 {
            Some(37.5)
        } else {
            rng.unless_missing(0.1, |r| r.uniform(0.2, 4.5))
        },
        cost: rng.unless_missing(0.07, |r| r.uniform(20_000.0, 160_000.0).round()),
        coords: rng.unless_missing(0.05, |r| {
            (lat + r.uniform(-1.5, 1.5), lon + r.uniform(-1.5, 1.5))
        }),
        fit_rating: *rng.pick(&FIT_RATINGS),
    }
}

fn percent(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| format!("{:.0}%", v * 100.0))
}

fn dollars(v: Option<f64>) -> String {
    match v {
        Some(v) => {
            let whole = v as u64;
            format!("${},{:03}", whole / 1000, whole % 1000)
        }
        None => "N/A".to_string(),
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn write_gems_csv(path: &Path, rows: &[Synthetic]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(GEMS_HEADER)?;
    for r in rows {
        wtr.write_record([
            r.name.clone(),
            r.city.clone(),
            r.state.clone(),
            r.control.to_string(),
            percent(r.admission),
            percent(r.graduation),
            percent(r.cohort_graduation),
            percent(r.yield_rate),
            r.ratio.map(|v| format!("{v:.2}")).unwrap_or_default(),
            dollars(r.cost),
            opt(r.coords.map(|c| c.0)),
            opt(r.coords.map(|c| c.1)),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_gems_parquet(path: &Path, rows: &[Synthetic]) -> Result<()> {
    let text = |f: &dyn Fn(&Synthetic) -> String| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: &dyn Fn(&Synthetic) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        text(&|r| r.name.clone()),
        text(&|r| r.city.clone()),
        text(&|r| r.state.clone()),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.control).collect::<Vec<_>>())),
        text(&|r| percent(r.admission)),
        text(&|r| percent(r.graduation)),
        text(&|r| percent(r.cohort_graduation)),
        text(&|r| percent(r.yield_rate)),
        float(&|r| r.ratio),
        text(&|r| dollars(r.cost)),
        float(&|r| r.coords.map(|c| c.0)),
        float(&|r| r.coords.map(|c| c.1)),
    ];

    let fields: Vec<Field> = GEMS_HEADER
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_excellence_csv(path: &Path, rows: &[Synthetic]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(EXCELLENCE_HEADER)?;
    for r in rows {
        wtr.write_record([
            r.name.clone(),
            r.city.clone(),
            r.state.clone(),
            r.control.to_string(),
            r.fit_rating.to_string(),
            opt(r.coords.map(|c| c.0)),
            opt(r.coords.map(|c| c.1)),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SampleRng(args.seed);

    let gems: Vec<Synthetic> = (0..args.count).map(|i| synthesize(&mut rng, i)).collect();
    let excellence: Vec<Synthetic> = (0..args.count).map(|i| synthesize(&mut rng, i)).collect();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let outputs = [
        args.out_dir.join("gems_with_coordinates.csv"),
        args.out_dir.join("gems_with_coordinates.parquet"),
        args.out_dir.join("accessible_excellence.csv"),
    ];
    write_gems_csv(&outputs[0], &gems)?;
    write_gems_parquet(&outputs[1], &gems)?;
    write_excellence_csv(&outputs[2], &excellence)?;

    for path in &outputs {
        log::info!("Wrote {}", path.display());
    }
    println!("Wrote {} institutions per dataset to {}", args.count, args.out_dir.display());
    Ok(())
}
