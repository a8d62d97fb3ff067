use std::env;
use std::path::PathBuf;

use eventforge_core::GenerationPolicy;
use eventforge_generate::{CsvSink, DatasetGenerator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut policy = GenerationPolicy::default();
    let mut out_dir = PathBuf::from("out");
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => policy.seed = args.next().ok_or("missing --seed value")?.parse()?,
            "--out" => out_dir = args.next().map(PathBuf::from).ok_or("missing --out path")?,
            "--force" => force = true,
            _ => return Err(format!("unexpected argument {arg}").into()),
        }
    }

    let result = DatasetGenerator::new(policy).run()?;
    let report = CsvSink::new(&out_dir, force).publish(&result.dataset.publication_plan())?;

    for table in &result.report.tables {
        println!("{}={}", table.table, table.rows);
    }
    println!("csv_dir={} bytes={}", out_dir.display(), report.bytes_written.unwrap_or(0));
    Ok(())
}
