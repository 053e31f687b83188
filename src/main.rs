use agency_locator::config::Config;
use agency_locator::pipeline::dedupe_names;
use agency_locator::{CoverageStats, GeocodeResolver, Pipeline, PipelineError, StateClassifier};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Agency Locator: geocode law-enforcement agency names.
///
/// Reads one agency name per line and writes one JSON record per line.
/// Lookups are throttled to the configured interval (1/s by default).
///
/// Examples:
///   locate agencies.txt > locations.jsonl
///   cat agencies.txt | locate --no-oracle --stats
///   locate agencies.txt -o out.jsonl --config locator.json -v
#[derive(Parser)]
#[command(name = "locate", version, about, long_about = None)]
struct Cli {
    /// Input file with one agency name per line. Reads stdin when omitted.
    #[arg(index = 1)]
    input: Option<PathBuf>,

    /// Output file for JSON-lines records. Writes stdout when omitted.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// JSON config file (geocoder and oracle settings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the geocoder search endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the User-Agent sent to the geocoder.
    #[arg(long)]
    user_agent: Option<String>,

    /// Minimum milliseconds between geocoder calls.
    #[arg(long)]
    min_interval_ms: Option<u64>,

    /// Per-call timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip the state oracle for names the parser cannot read.
    #[arg(long)]
    no_oracle: bool,

    /// Log coverage statistics after the run.
    #[arg(long)]
    stats: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.geocoder.endpoint = endpoint.clone();
    }
    if let Some(ua) = &cli.user_agent {
        config.geocoder.user_agent = ua.clone();
    }
    if let Some(ms) = cli.min_interval_ms {
        if ms < 1000 {
            warn!(ms, "interval below 1s may violate the Nominatim usage policy");
        }
        config.geocoder.min_interval_ms = ms;
    }
    if let Some(secs) = cli.timeout {
        config.geocoder.timeout_secs = secs;
        config.oracle.timeout_secs = secs;
    }
    if cli.no_oracle {
        config.oracle.enabled = false;
    }
    Ok(config.with_env())
}

fn read_names(input: Option<&PathBuf>) -> Result<Vec<String>> {
    let lines: Vec<String> = match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            BufReader::new(file).lines().collect::<io::Result<_>>()?
        }
        None => io::stdin().lock().lines().collect::<io::Result<_>>()?,
    };
    Ok(dedupe_names(lines))
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let names = read_names(cli.input.as_ref())?;
    info!("Found {} unique agencies to geocode", names.len());
    if names.is_empty() {
        return Ok(());
    }

    let resolver = GeocodeResolver::from_config(&config.geocoder);
    let oracle = StateClassifier::from_config(&config.oracle);
    let mut pipeline = Pipeline::new(resolver, oracle);

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = match pipeline.run(&names, &mut out) {
        Ok(summary) => summary,
        Err(e @ PipelineError::GeocoderUnreachable { .. }) => {
            return Err(e).context("check network connectivity and the --endpoint setting");
        }
        Err(e) => return Err(e.into()),
    };
    summary.log();

    if cli.stats {
        if let Some(path) = &cli.output {
            let records = read_records(path)?;
            CoverageStats::from_records(&records).log();
        } else {
            warn!("--stats needs --output to re-read the written records");
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<agency_locator::AgencyLocation>> {
    let file = File::open(path).with_context(|| format!("cannot reopen {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .map(|line| Ok(serde_json::from_str(&line?)?))
        .collect()
}
