// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tables_classify::ErrorClassifier;
use tables_cli::commands;
use tables_cli::fixture::Fixture;
use tables_config::{ClassifierConfig, load_config, validate_config};
use tables_naming::Backend;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tables", version, about = "Table-service error diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Classifier config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a captured failure.
    Explain {
        /// JSON fixture: { status, headers, body, message }.
        file: PathBuf,

        /// Table the failed call targeted (enables name re-validation).
        #[arg(long)]
        table: Option<String>,

        /// Treat the failure as a batch submission.
        #[arg(long)]
        transaction: bool,

        /// Print the error as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a table name against a backend's grammar.
    CheckName {
        /// The name to check.
        name: String,

        #[command(flatten)]
        target: BackendTarget,
    },

    /// List known error codes and the kind each maps to.
    Codes {
        /// Only codes of this kind.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Print the JSON schema of the config file.
    Schema,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct BackendTarget {
    /// Backend dialect.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Account endpoint; the backend is inferred from the host.
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Storage,
    Cosmos,
}

impl From<BackendArg> for Backend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Storage => Backend::Storage,
            BackendArg::Cosmos => Backend::Cosmos,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    NotFound,
    AlreadyExists,
    ModifiedConflict,
    AuthFailure,
    Generic,
}

impl KindArg {
    fn label(self) -> &'static str {
        match self {
            KindArg::NotFound => "not_found",
            KindArg::AlreadyExists => "already_exists",
            KindArg::ModifiedConflict => "modified_conflict",
            KindArg::AuthFailure => "auth_failure",
            KindArg::Generic => "generic",
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("load config")?;
    let warnings = validate_config(&config).context("validate config")?;
    init_tracing(cli.debug, &config);
    for warning in warnings {
        warn!(target: "tables.config", "{warning}");
    }

    match cli.command {
        Commands::Explain {
            file,
            table,
            transaction,
            json,
        } => cmd_explain(&config, file, table, transaction, json),
        Commands::CheckName { name, target } => cmd_check_name(&name, target),
        Commands::Codes { kind } => cmd_codes(kind),
        Commands::Schema => {
            println!("{}", commands::schema_json()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(debug: bool, config: &ClassifierConfig) {
    let filter = if debug {
        EnvFilter::new("tables=debug")
    } else {
        EnvFilter::new(format!("tables={}", config.log_level()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_explain(
    config: &ClassifierConfig,
    file: PathBuf,
    table: Option<String>,
    transaction: bool,
    json: bool,
) -> Result<ExitCode> {
    if transaction && table.is_some() {
        bail!("--table has no effect with --transaction; names are not re-validated for batches");
    }
    let fixture = Fixture::load(&file)?;
    let classifier = ErrorClassifier::new(config);
    let err = commands::explain(&classifier, fixture, table.as_deref(), transaction);
    if json {
        println!("{}", commands::render_json(&err)?);
    } else {
        print!("{}", commands::render_text(&err));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check_name(name: &str, target: BackendTarget) -> Result<ExitCode> {
    let backend = match (target.backend, target.endpoint) {
        (Some(b), _) => Backend::from(b),
        (None, Some(endpoint)) => Backend::from_endpoint(&endpoint),
        (None, None) => bail!("one of --backend or --endpoint is required"),
    };
    match commands::check_name(name, backend) {
        Ok(()) => {
            println!("ok: {name:?} is a valid {} table name", backend.grammar());
            Ok(ExitCode::SUCCESS)
        }
        Err(violation) => {
            println!("{violation}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_codes(kind: Option<KindArg>) -> Result<ExitCode> {
    for (code, kind) in commands::codes(kind.map(KindArg::label)) {
        println!("{:<44} {kind}", code.as_str());
    }
    Ok(ExitCode::SUCCESS)
}
