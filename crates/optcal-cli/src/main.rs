//! optcal CLI: calibrate the optimizer's index-vs-scan decision.

mod error;
mod exit_codes;
mod export;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use optcal_core::config::{CalibrationConfig, ConfigDocument, ConnectionConfig, PlanFormat};
use optcal_core::units::{parse_list, parse_row_count, parse_selectivity};
use optcal_exec::demo::{create_demo_table, run_demo_queries, DEMO_ROWS, DEMO_TABLE};
use optcal_exec::run_calibration;
use optcal_io::{MySqlClient, SqlSession};
use optcal_report::{aggregate, render_report};

use crate::error::CliError;
use crate::export::{now_millis, RunExport};

#[derive(Parser)]
#[command(name = "optcal")]
#[command(about = "Measure whether the optimizer picks the faster of index access and full scan", long_about = None)]
struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Shape tables, run the scenario matrix and print the reports
    Calibrate {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        calibration: CalibrationArgs,

        /// Write results as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Create and populate the demonstration table `t`
    CreateTable {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Print static and executed plans of the demonstration queries
    TestOptimizer {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Plan format for the static plans (brief or json)
        #[arg(long)]
        format: Option<String>,

        /// Recreate `t` before running the queries
        #[arg(long)]
        create: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// YAML document with `connection` and `calibration` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(short, long)]
    user: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    #[arg(short, long)]
    database: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args, Debug, Default)]
struct CalibrationArgs {
    /// Table sizes, e.g. `1k,10k,100k`
    #[arg(long)]
    rows: Option<String>,

    /// Selectivities: ratios (`0.1`), percentages (`10%`) or row counts (`500`)
    #[arg(long)]
    selectivity: Option<String>,

    /// Copies of each hinted scenario
    #[arg(long)]
    repetitions: Option<usize>,

    /// Seed for the shuffle and for shaping
    #[arg(long)]
    seed: Option<u64>,

    /// Plan format (brief or json)
    #[arg(long)]
    format: Option<String>,

    /// Shape each table when its first scenario runs instead of up front
    #[arg(long)]
    lazy_prepare: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            });
        }
    };
    init_logging(cli.log_level);

    let outcome = match cli.command {
        Commands::Calibrate {
            connection,
            calibration,
            json,
        } => calibrate(&connection, &calibration, json.as_deref()),
        Commands::CreateTable { connection } => create_table(&connection),
        Commands::TestOptimizer {
            connection,
            format,
            create,
        } => test_optimizer(&connection, format.as_deref(), create),
    };
    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_document(path: Option<&Path>) -> Result<ConfigDocument, CliError> {
    let Some(path) = path else {
        return Ok(ConfigDocument::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ConfigDocument::from_yaml(&text)?)
}

fn apply_connection_args(cfg: &mut ConnectionConfig, args: &ConnectionArgs) {
    if let Some(host) = &args.host {
        cfg.host = host.clone();
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(user) = &args.user {
        cfg.user = user.clone();
    }
    if let Some(password) = &args.password {
        cfg.password = password.clone();
    }
    if let Some(database) = &args.database {
        cfg.database = database.clone();
    }
    if let Some(secs) = args.timeout_secs {
        cfg.timeout_secs = secs;
    }
}

fn apply_calibration_args(
    cfg: &mut CalibrationConfig,
    args: &CalibrationArgs,
) -> Result<(), CliError> {
    if let Some(rows) = &args.rows {
        cfg.row_counts = parse_list(rows, parse_row_count)?;
    }
    if let Some(sel) = &args.selectivity {
        cfg.selectivities = parse_list(sel, parse_selectivity)?;
    }
    if let Some(reps) = args.repetitions {
        cfg.repetitions = reps;
    }
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(format) = &args.format {
        cfg.plan_format = format.parse()?;
    }
    if args.lazy_prepare {
        cfg.prepare_tables_upfront = false;
    }
    Ok(())
}

/// Defaults, then the YAML document, then `OPTCAL_*`, then flags.
fn resolve_config(
    connection: &ConnectionArgs,
    calibration: &CalibrationArgs,
) -> Result<(ConnectionConfig, CalibrationConfig), CliError> {
    let mut doc = load_document(connection.config.as_deref())?;
    doc.connection.apply_env();
    doc.calibration.apply_env();
    apply_connection_args(&mut doc.connection, connection);
    apply_calibration_args(&mut doc.calibration, calibration)?;
    doc.connection.validate()?;
    doc.calibration.validate()?;
    Ok((doc.connection, doc.calibration))
}

fn calibrate(
    connection: &ConnectionArgs,
    calibration: &CalibrationArgs,
    json: Option<&Path>,
) -> Result<(), CliError> {
    let (conn_cfg, cfg) = resolve_config(connection, calibration)?;
    let started_ms = now_millis();

    let client = MySqlClient::connect(&conn_cfg)?;
    let mut session = SqlSession::new(client, cfg.plan_format);
    let summary = run_calibration(&mut session, &cfg)?;
    session.into_inner().close()?;

    let aggregation = aggregate(&summary.results);
    for id in &aggregation.overall.coverage_gaps {
        error!(scenario = %id, "optimizer choice was never measured");
    }
    println!("{}", render_report(&aggregation));
    if !summary.failures.is_empty() {
        println!("{} scenario run(s) skipped:", summary.failures.len());
        for f in &summary.failures {
            println!("  {} {}: {}", f.scenario_id, f.variant, f.error);
        }
    }

    if let Some(path) = json {
        RunExport::new(started_ms, &conn_cfg, &cfg, &summary, &aggregation).write_to(path)?;
        info!(path = %path.display(), "results written");
    }
    Ok(())
}

fn create_table(connection: &ConnectionArgs) -> Result<(), CliError> {
    let (conn_cfg, _) = resolve_config(connection, &CalibrationArgs::default())?;
    let mut client = MySqlClient::connect(&conn_cfg)?;
    let rows = create_demo_table(&mut client, DEMO_ROWS)?;
    client.close()?;
    println!("Table {} created with {} rows", DEMO_TABLE, rows);
    Ok(())
}

fn test_optimizer(
    connection: &ConnectionArgs,
    format: Option<&str>,
    create: bool,
) -> Result<(), CliError> {
    let (conn_cfg, cfg) = resolve_config(connection, &CalibrationArgs::default())?;
    let format: PlanFormat = match format {
        Some(f) => f.parse()?,
        None => cfg.plan_format,
    };
    let mut client = MySqlClient::connect(&conn_cfg)?;
    if create {
        create_demo_table(&mut client, DEMO_ROWS)?;
    }
    let outcomes = run_demo_queries(&mut client, format)?;
    client.close()?;

    for (i, o) in outcomes.iter().enumerate() {
        println!("=== {}. {} ===", i + 1, o.name);
        println!("SQL: {}", o.sql);
        println!("Expected: {}", o.expectation);
        match o.plan_type {
            Some(t) => println!("Classified: {}", t),
            None => println!("Classified: -"),
        }
        println!("--- EXPLAIN ---");
        print_rows(&o.plan);
        println!("--- EXPLAIN ANALYZE ---");
        print_rows(&o.analyzed);
        println!();
    }
    Ok(())
}

fn print_rows(rows: &[Vec<String>]) {
    for row in rows {
        println!("{}", row.join("\t"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optcal_core::selectivity::Selectivity;

    #[test]
    fn cli_flags_override_document() {
        let mut cfg = CalibrationConfig {
            repetitions: 7,
            ..Default::default()
        };
        let args = CalibrationArgs {
            rows: Some("1k,2M".into()),
            selectivity: Some("10%,500".into()),
            repetitions: Some(2),
            format: Some("json".into()),
            lazy_prepare: true,
            ..Default::default()
        };
        apply_calibration_args(&mut cfg, &args).unwrap();
        assert_eq!(cfg.row_counts, vec![1_000, 2_000_000]);
        assert_eq!(
            cfg.selectivities,
            vec![Selectivity::Ratio(0.1), Selectivity::Absolute(500)]
        );
        assert_eq!(cfg.repetitions, 2);
        assert_eq!(cfg.plan_format, PlanFormat::Json);
        assert!(!cfg.prepare_tables_upfront);
    }

    #[test]
    fn invalid_flags_are_config_errors() {
        let mut cfg = CalibrationConfig::default();
        let args = CalibrationArgs {
            selectivity: Some("150%".into()),
            ..Default::default()
        };
        let err = apply_calibration_args(&mut cfg, &args).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn connection_flags_override() {
        let mut cfg = ConnectionConfig::default();
        let args = ConnectionArgs {
            host: Some("db.internal".into()),
            port: Some(3306),
            ..Default::default()
        };
        apply_connection_args(&mut cfg, &args);
        assert_eq!(cfg.host, "db.internal");
        assert_eq!(cfg.port, 3306);
        assert_eq!(cfg.user, "root");
    }

    #[test]
    fn log_level_parses() {
        let cli = Cli::try_parse_from(["optcal", "--log-level", "debug", "create-table"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(Cli::try_parse_from(["optcal", "--log-level", "trace", "create-table"]).is_err());
    }
}
