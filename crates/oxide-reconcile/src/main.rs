//! oxide-reconcile CLI
//!
//! Command-line tool for converging database tables toward a schema file.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_reconcile::prelude::*;

/// Converges live database tables toward declared schemas.
#[derive(Parser)]
#[command(name = "oxide-reconcile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// SQL dialect used to render DDL.
    #[arg(long, value_enum, default_value_t = Dialect::Sqlite)]
    dialect: Dialect,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    Sqlite,
    H2,
}

impl From<Dialect> for DialectRules {
    fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Sqlite => Self::sqlite(),
            Dialect::H2 => Self::h2(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the live descriptor of a table as JSON.
    Inspect {
        /// Table name.
        table: String,

        /// Include the row count.
        #[arg(long)]
        row_count: bool,
    },

    /// Show the DDL that would converge the database, without executing.
    Plan {
        /// Schema file (JSON).
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Converge every table in the schema file.
    Apply {
        /// Schema file (JSON).
        #[arg(short, long)]
        schema: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db = SqliteDatabase::connect(&cli.database).await?;
    let reconciler = Reconciler::new(db, cli.dialect.into());

    match cli.command {
        Commands::Inspect { table, row_count } => {
            let reconciler = reconciler.options(ReconcileOptions::new().row_count(row_count));
            let descriptor = reconciler
                .inspect(&table)
                .await?
                .ok_or(ReconcileError::TableNotFound(table))?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }

        Commands::Plan { schema } => {
            let schema = SchemaFile::load(&schema)?;
            let reconciler = reconciler.dry_run(true);
            for report in reconciler.reconcile_all(&schema.tables).await? {
                print_report(&report);
            }
        }

        Commands::Apply { schema, dry_run } => {
            let schema = SchemaFile::load(&schema)?;
            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }
            let reconciler = reconciler.dry_run(dry_run);
            let reports = reconciler.reconcile_all(&schema.tables).await?;
            for report in &reports {
                print_report(report);
            }
            let changed = reports.iter().filter(|r| !r.is_converged()).count();
            info!(tables = reports.len(), changed, "Reconciliation finished");
        }
    }

    Ok(())
}

fn print_report(report: &TableReport) {
    if report.is_converged() {
        println!("-- {}: up to date", report.table);
        return;
    }
    println!("-- {}", report.table);
    for sql in &report.statements {
        println!("{sql};");
    }
}
