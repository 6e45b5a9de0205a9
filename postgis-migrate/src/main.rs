//! Lifeguard PostGIS Migration CLI Tool
//!
//! Generates (and optionally applies) PostGIS-aware `CREATE TABLE` and
//! `ALTER TABLE` statements from TOML table definitions, introspects spatial
//! columns of a live database and looks up spatial SQL functions.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lifeguard_postgis::functions::SpatialFunction;
use lifeguard_postgis::schema::{PostgresCatalog, SpatialSchemaManager};
use lifeguard_postgis::{connect, MayPostgresExecutor, SpatialConfig};
use lifeguard_postgis_migrate::commands;
use lifeguard_postgis_migrate::output::{self, OutputFormat};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "lifeguard-postgis-migrate")]
#[command(about = "Spatial DDL tool for Lifeguard PostGIS")]
#[command(version = "0.1.0")]
struct Cli {
    /// Database connection URL
    #[arg(long)]
    database_url: Option<String>,

    /// Configuration file with a [postgis] section
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the statements creating a table
    CreateTable {
        /// TOML table definition
        file: PathBuf,

        /// Execute the statements instead of only printing them
        #[arg(long)]
        apply: bool,
    },

    /// Generate the statements migrating one table definition to another
    Diff {
        /// Current TOML table definition
        from: PathBuf,

        /// Desired TOML table definition
        to: PathBuf,

        /// Execute the statements instead of only printing them
        #[arg(long)]
        apply: bool,
    },

    /// Show the spatial columns and indexes of a table
    Introspect {
        /// Table name, optionally schema-qualified
        table: String,
    },

    /// List the spatial function catalog
    Functions {
        /// Only functions whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Validate and render one spatial function call
    Render {
        /// Call expression, e.g. "ST_DWithin(a.geom, b.geom, 100)"
        expression: String,
    },
}

fn main() {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    // Initialize logging
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(out) => {
            print!("{out}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let config = SpatialConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match &cli.command {
        Commands::CreateTable { file, apply } => {
            let sql = commands::create_table(file, &config)?;
            finish(&cli, &config, &sql, *apply)
        }
        Commands::Diff { from, to, apply } => {
            let sql = commands::diff(from, to, &config)?;
            finish(&cli, &config, &sql, *apply)
        }
        Commands::Introspect { table } => {
            let executor = executor(&cli, &config)?;
            let mut manager = SpatialSchemaManager::new(config.clone());
            manager.bind(Rc::new(PostgresCatalog::new(executor, &config)))?;

            let columns = manager.list_spatial_columns(table)?;
            let indexes = manager.list_spatial_indexes(table)?;
            Ok(output::introspection(table, &columns, &indexes, cli.format)?)
        }
        Commands::Functions { filter } => {
            let specs = commands::functions(filter.as_deref());
            Ok(output::functions(&specs, cli.format)?)
        }
        Commands::Render { expression } => {
            let call = SpatialFunction::parse(expression)?;
            Ok(output::call(&call, cli.format)?)
        }
    }
}

/// Print the statements, or execute them with `--apply`.
fn finish(cli: &Cli, config: &SpatialConfig, sql: &[String], apply: bool) -> anyhow::Result<String> {
    if !apply {
        return Ok(output::statements(sql, cli.format)?);
    }
    if sql.is_empty() {
        return Ok(if cli.quiet { String::new() } else { "✅ Nothing to apply\n".to_string() });
    }

    let executor = executor(cli, config)?;
    let applied = commands::apply(&executor, sql)?;
    Ok(if cli.quiet {
        String::new()
    } else {
        format!("✅ Applied {applied} statement(s)\n")
    })
}

fn executor(cli: &Cli, config: &SpatialConfig) -> anyhow::Result<MayPostgresExecutor> {
    let database_url = cli
        .database_url
        .clone()
        .or_else(|| std::env::var("LIFEGUARD_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .or_else(|| config.database_url.clone())
        .context(
            "Database URL not provided. Use --database-url or set LIFEGUARD_DATABASE_URL or DATABASE_URL environment variable.",
        )?;

    let client = connect(&database_url).context("Error connecting to database")?;
    Ok(MayPostgresExecutor::new(client))
}
