//! ci-triage - explain failed CI builds
//!
//! ## Commands
//!
//! - `scan`: classify every failed step of recent Drone builds
//! - `classify`: classify a local log file (or stdin)
//! - `rules`: list the signature catalog in priority order
//!
//! Exit status is 0 when every failure was explained, 2 when at least one
//! step needs manual triage, and 1 on any other error.

mod report;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use triage_core::{Classifier, LogLine, RuleCatalog};
use triage_drone::config::{DEFAULT_OWNER, DEFAULT_REPO};
use triage_drone::{DroneClient, DroneConfig, InspectOptions, Inspector};

/// Exit status when at least one failure matched no known signature.
const EXIT_NEEDS_TRIAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "ci-triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explain why CI builds failed", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the failed steps of recent builds on a Drone server
    Scan {
        #[command(flatten)]
        drone: DroneArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Page of the build list to inspect
        #[arg(long, default_value = "1")]
        page: u32,

        /// Builds per page
        #[arg(long, default_value = "100")]
        per_page: u32,

        /// Step logs fetched and classified concurrently
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Classify a local log file
    Classify {
        /// Log file to read (default: stdin)
        file: Option<PathBuf>,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List the signature catalog in priority order
    Rules {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Args)]
struct DroneArgs {
    /// Drone server URL
    #[arg(long, env = "DRONE_SERVER")]
    server: String,

    /// Drone access token
    #[arg(long, env = "DRONE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner
    #[arg(long, env = "DRONE_OWNER", default_value = DEFAULT_OWNER)]
    owner: String,

    /// Repository name
    #[arg(long, env = "DRONE_REPO", default_value = DEFAULT_REPO)]
    repo: String,
}

impl DroneArgs {
    fn config(&self) -> DroneConfig {
        let config = DroneConfig::new(&self.server, &self.owner, &self.repo);
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => config.with_token(token),
            _ => config,
        }
    }
}

#[derive(Args)]
struct CatalogArgs {
    /// JSON rule file appended after the builtin signatures
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Scan at most this many lines per log
    #[arg(long)]
    max_lines: Option<usize>,
}

impl CatalogArgs {
    fn catalog(&self) -> Result<RuleCatalog> {
        let builtin = RuleCatalog::builtin();
        match &self.catalog {
            Some(path) => {
                let extra = RuleCatalog::from_path(path)
                    .with_context(|| format!("Failed to load rule catalog {}", path.display()))?;
                Ok(builtin.extend(extra.rules().to_vec())?)
            }
            None => Ok(builtin),
        }
    }

    fn classifier(&self) -> Result<Classifier> {
        let classifier = Classifier::new(self.catalog()?);
        Ok(match self.max_lines {
            Some(max) => classifier.with_max_lines(max),
            None => classifier,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    triage_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Scan {
            drone,
            catalog,
            page,
            per_page,
            concurrency,
        } => {
            let options = InspectOptions {
                page,
                per_page,
                concurrency,
            };
            cmd_scan(&drone, &catalog, options).await
        }
        Commands::Classify {
            file,
            catalog,
            output,
        } => cmd_classify(file.as_deref(), &catalog, output),
        Commands::Rules { catalog, output } => cmd_rules(&catalog, output),
    }
}

async fn cmd_scan(
    drone: &DroneArgs,
    catalog: &CatalogArgs,
    options: InspectOptions,
) -> Result<ExitCode> {
    let classifier = Arc::new(catalog.classifier()?);
    let config = drone.config();
    info!(
        server = %config.server_url,
        repo = %format!("{}/{}", config.owner, config.repo),
        "scanning failed builds"
    );

    let client = DroneClient::new(config).context("Failed to create Drone client")?;
    let verdicts = Inspector::new(client, classifier)
        .with_options(options)
        .run()
        .await
        .context("Failed to inspect Drone builds")?;

    let mut stdout = io::stdout().lock();
    for verdict in &verdicts {
        report::write_step_verdict(&mut stdout, verdict)?;
    }
    stdout.flush()?;

    let unknown = verdicts.iter().filter(|v| v.needs_triage()).count();
    info!(
        steps = verdicts.len(),
        unknown, "triage complete"
    );
    Ok(exit_status(unknown == 0))
}

fn cmd_classify(file: Option<&Path>, catalog: &CatalogArgs, output: OutputFormat) -> Result<ExitCode> {
    let logs = read_log(file)?;
    let result = catalog.classifier()?.classify(&logs);

    let mut stdout = io::stdout().lock();
    match output {
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string_pretty(&result)?)?,
        OutputFormat::Text => {
            let subject = file
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdin".to_string());
            report::write_result(&mut stdout, &subject, &result, &logs)?;
        }
    }
    stdout.flush()?;

    Ok(exit_status(result.matched))
}

/// Read a log from `file` or stdin.
///
/// Raw CI output may contain truncated multibyte sequences or binary
/// noise; invalid UTF-8 is replaced rather than rejected.
fn read_log(file: Option<&Path>) -> Result<Vec<LogLine>> {
    let bytes = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    Ok(LogLine::from_text(&String::from_utf8_lossy(&bytes)))
}

fn cmd_rules(catalog: &CatalogArgs, output: OutputFormat) -> Result<ExitCode> {
    let catalog = catalog.catalog()?;
    let mut stdout = io::stdout().lock();
    match output {
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string_pretty(catalog.rules())?)?,
        OutputFormat::Text => report::write_rules(&mut stdout, &catalog)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_status(explained: bool) -> ExitCode {
    if explained {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NEEDS_TRIAGE)
    }
}
