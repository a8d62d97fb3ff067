mod config;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use eventforge_core::{Error as CoreError, redact_connection_string};
use eventforge_generate::{CsvSink, DatasetGenerator, GenerationError, SqlScriptSink};
use eventforge_store::{RetryPolicy, StoreError, connect_with_retry, publish_dataset};
use thiserror::Error;

use config::{Config, ConfigError, load_config};
use logging::{LoggingError, init_logging};

const REPORT_FILE: &str = "generation_report.json";

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "eventforge", version, about = "Event-management dataset generator")]
struct Cli {
    /// Append JSON log lines to this file instead of logging to stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset and publish it to the configured sinks.
    Generate(GenerateArgs),
    /// Validate the configuration and policy without generating.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to a TOML config file (defaults to ./eventforge.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed overriding the policy seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overwrite existing CSV files, SQL script and store tables.
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Output directory for the CSV export.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
    /// Also write a single SQL script to this path.
    #[arg(long)]
    sql_out: Option<PathBuf>,
    /// Database connection string.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
    /// Do not load the dataset into the database.
    #[arg(long, default_value_t = false)]
    no_store: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Check(args) => run_check(args),
    }
}

fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(seed) = args.seed {
        config.policy.seed = seed;
    }
    if args.force {
        config.output.force = true;
    }
    if let Some(dir) = &args.csv_dir {
        config.output.csv_dir = dir.clone();
    }
    if let Some(path) = &args.sql_out {
        config.output.sql_script = Some(path.clone());
    }
    if let Some(url) = &args.database_url {
        config.store.database_url = Some(url.clone());
    }
    if args.no_store {
        config.store.enabled = false;
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    let Config {
        policy,
        output,
        store,
    } = config;

    tracing::info!(event = "run_started", seed = policy.seed);

    let mut result = DatasetGenerator::new(policy).run()?;
    let plan = result.dataset.publication_plan();

    let csv = CsvSink::new(&output.csv_dir, output.force).publish(&plan)?;
    tracing::info!(
        event = "csv_published",
        dir = %output.csv_dir.display(),
        bytes = csv.bytes_written.unwrap_or(0)
    );
    result.report.sinks.push(csv);

    if let Some(path) = &output.sql_script {
        let script = SqlScriptSink::new(path, output.force).publish(&plan)?;
        tracing::info!(event = "sql_script_published", path = %path.display());
        result.report.sinks.push(script);
    }

    match (store.enabled, store.database_url.as_deref()) {
        (true, Some(url)) => {
            let connection = redact_connection_string(url);
            tracing::info!(event = "store_connecting", store = %connection.redacted);
            let retry = RetryPolicy {
                attempts: store.connect_attempts,
                delay: Duration::from_secs(store.connect_delay_secs),
            };
            let mut pg = connect_with_retry(url, retry).await?;
            let report = publish_dataset(&mut pg, &plan, output.force).await?;
            result.report.sinks.push(report);
        }
        (true, None) => {
            tracing::warn!(event = "store_skipped", "no database url configured");
        }
        (false, _) => {
            tracing::info!(event = "store_disabled");
        }
    }

    let report_path = output.csv_dir.join(REPORT_FILE);
    result.report.write_json(&report_path)?;

    tracing::info!(
        event = "run_finished",
        status = "success",
        run_id = %result.report.run_id,
        fulfilled = result.report.allocation.fulfilled,
        report = %report_path.display()
    );

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    config.policy.validate()?;
    tracing::info!(
        event = "config_valid",
        seed = config.policy.seed,
        attempt_budget = config.policy.attempt_budget()
    );
    println!("{}", serde_json::to_string_pretty(&config.policy)?);
    Ok(())
}
