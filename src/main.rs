//! Crawl-History main entry point
//!
//! This is the command-line interface for looking up crawl-history records and
//! for the flat-file helpers that go with it.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use crawl_history::client::{build_http_client, SearchClient};
use crawl_history::config::{load_config_or_default, Config, QueryConfig};
use crawl_history::merge::{copy_column, DEFAULT_COLUMN};
use crawl_history::query::MatchField;
use crawl_history::robots::probe_domains;
use crawl_history::runner::Runner;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl-History: crawl-record lookup against a search index
///
/// Reads URLs (or domains) one per line and prints the page-object locations
/// of their successful crawls within a date range.
#[derive(Parser, Debug)]
#[command(name = "crawl-history")]
#[command(version)]
#[command(about = "Crawl-history lookup against a search index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up crawl records for each URL or domain in FILE (or stdin)
    Query(QueryArgs),

    /// Probe robots.txt crawl delays for the domains in a CSV file
    CrawlDelays {
        /// CSV file with one domain per row in the first column
        input: PathBuf,

        /// CSV file to write domain,http_delay,https_delay rows to
        output: PathBuf,

        /// The first input row is a header, not a domain
        #[arg(long)]
        skip_header: bool,
    },

    /// Copy a column from one CSV file into another, row by row
    MergeColumn {
        /// CSV file to take the column from
        source: PathBuf,

        /// CSV file to copy the column into
        target: PathBuf,

        /// Column name
        #[arg(long, default_value = DEFAULT_COLUMN)]
        column: String,

        /// Write here instead of overwriting TARGET
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Input file with one key per line; stdin if omitted
    file: Option<PathBuf>,

    /// Lower bound on entry time (ISO-8601 or "now"); defaults to 7 days ago
    #[arg(short, long)]
    from: Option<String>,

    /// Upper bound on entry time (ISO-8601 or "now"); defaults to now
    #[arg(short, long)]
    to: Option<String>,

    /// Only print records whose URL (or domain) equals the input exactly
    #[arg(short, long)]
    exact: bool,

    /// Required final state
    #[arg(short = 's', long, default_value = crawl_history::config::DEFAULT_FINAL_STATE)]
    final_state: String,

    /// Required crawl result
    #[arg(short = 'r', long, default_value = crawl_history::config::DEFAULT_CRAWL_RESULT)]
    crawl_result: String,

    /// Treat input lines as domains instead of URLs
    #[arg(short = 'd', long)]
    match_by_domain: bool,

    /// Follow scroll cursors to retrieve every result, not just the first page
    #[arg(short = 'a', long)]
    all_results: bool,

    /// Only print the number of results per input
    #[arg(short = 'c', long)]
    count_only: bool,

    /// Maximum hits per request (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Search index base URL (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            cli.config
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        )
    })?;

    match cli.command {
        Command::Query(args) => handle_query(config, args).await,
        Command::CrawlDelays {
            input,
            output,
            skip_header,
        } => handle_crawl_delays(&config, input, output, skip_header).await,
        Command::MergeColumn {
            source,
            target,
            column,
            output,
        } => {
            let output = output.unwrap_or_else(|| target.clone());
            let rows = copy_column(&source, &target, &column, &output)
                .with_context(|| format!("Failed to merge column '{}'", column))?;
            tracing::info!("Wrote {} rows to {}", rows, output.display());
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only records.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_history=info,warn"),
            1 => EnvFilter::new("crawl_history=debug,info"),
            2 => EnvFilter::new("crawl_history=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the per-run query settings from the command line
fn query_config(args: &QueryArgs, config: &Config) -> QueryConfig {
    let mut query = QueryConfig::default();
    if let Some(from) = &args.from {
        query.date_from = from.clone();
    }
    if let Some(to) = &args.to {
        query.date_to = to.clone();
    }
    query.exact_match = args.exact;
    query.final_state = args.final_state.clone();
    query.crawl_result = args.crawl_result.clone();
    query.match_field = if args.match_by_domain {
        MatchField::Domain
    } else {
        MatchField::Url
    };
    query.all_results = args.all_results;
    query.count_only = args.count_only;
    query.page_size = args.page_size.unwrap_or(config.search.page_size);
    query
}

/// Handles the query subcommand: the main lookup
async fn handle_query(mut config: Config, args: QueryArgs) -> anyhow::Result<()> {
    if let Some(endpoint) = &args.endpoint {
        config.search.endpoint = endpoint.clone();
    }
    let client = SearchClient::from_config(&config).context("Failed to set up search client")?;
    let query = query_config(&args, &config);

    tracing::info!(
        "Looking up {} matches from {} to {} via {}",
        query.match_field,
        query.date_from,
        query.date_to,
        client.endpoint().base()
    );

    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut runner = Runner::new(client, query, io::stdout().lock());
    let state = runner.run(input).await?;

    tracing::info!(
        "Done: {} inputs, found:{} / matched:{}, {} failed",
        state.progress_count,
        state.found,
        state.matched,
        state.failed
    );
    Ok(())
}

/// Handles the crawl-delays subcommand
async fn handle_crawl_delays(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    skip_header: bool,
) -> anyhow::Result<()> {
    let client = build_http_client(&config.user_agent, None)?;
    let probed = probe_domains(
        &client,
        &input,
        &output,
        skip_header,
        &config.user_agent.crawler_name,
        &config.probe,
    )
    .await
    .with_context(|| format!("Failed to probe domains from {}", input.display()))?;

    tracing::info!("Probed {} domains, wrote {}", probed, output.display());
    Ok(())
}
