//! Barstore CLI: stock bar CRUD, criteria queries and market data ingest.
//!
//! Commands:
//! - `create` / `update` / `get` / `delete`: single-bar operations
//! - `list`: paged query from `field.operator=value` parameters
//! - `count`: number of bars matching the same parameters
//! - `ingest`: fetch a daily chart and store it as bars
//! - `symbols`: list the provider's tradable symbols

mod output;

use anyhow::{Context, Result};
use barstore_core::config::AppConfig;
use barstore_core::criteria::BarCriteria;
use barstore_core::data::{ingest_chart, IexProvider, MarketDataProvider};
use barstore_core::domain::{BarId, StockBar};
use barstore_core::params::split_param;
use barstore_core::query::{BarQueryService, PageRequest};
use barstore_core::service::BarService;
use barstore_core::store::{BarRepository, FileBarStore, InMemoryBarStore};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use output::Format;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barstore", about = "Barstore: stock bar storage with criteria queries")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the bars. Overrides `[store] path` from the config.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new bar; storage assigns its id.
    Create {
        #[command(flatten)]
        bar: BarArgs,
    },
    /// Replace an existing bar.
    Update {
        id: BarId,

        #[command(flatten)]
        bar: BarArgs,
    },
    /// Show one bar.
    Get {
        id: BarId,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Delete one bar.
    Delete { id: BarId },
    /// List bars matching `field.operator=value` parameters (e.g. symbol.equals=AAPL).
    List {
        params: Vec<String>,

        /// Zero-based page number.
        #[arg(long)]
        page: Option<usize>,

        #[arg(long)]
        size: Option<usize>,

        /// Sort as `field[,asc|desc]`, e.g. `date,desc`.
        #[arg(long)]
        sort: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Count bars matching `field.operator=value` parameters.
    Count { params: Vec<String> },
    /// Fetch a daily chart from the market data provider and store it.
    Ingest {
        symbol: String,

        /// Provider range, e.g. 1m, 6m, 1y, 5y.
        #[arg(long, default_value = "1y")]
        range: String,
    },
    /// List the provider's tradable symbols.
    Symbols {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

/// Bar fields accepted by `create` and `update`.
#[derive(Args)]
struct BarArgs {
    #[arg(long)]
    symbol: Option<String>,

    /// RFC 3339 timestamp, e.g. 2020-01-01T00:00:00Z.
    #[arg(long)]
    date: Option<DateTime<Utc>>,

    #[arg(long)]
    open: Option<f64>,

    #[arg(long)]
    close: Option<f64>,

    #[arg(long)]
    high: Option<f64>,

    #[arg(long)]
    low: Option<f64>,

    #[arg(long)]
    volume: Option<u64>,
}

impl BarArgs {
    fn into_bar(self, id: Option<BarId>) -> StockBar {
        StockBar {
            id,
            symbol: self.symbol,
            date: self.date,
            open: self.open,
            close: self.close,
            high: self.high,
            low: self.low,
            volume: self.volume,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(store) = cli.store {
        config.store.path = Some(store);
    }

    init_logging(&config);

    let repository = open_repository(&config)?;
    let crud = BarService::new(repository.clone());
    let query = BarQueryService::new(repository);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Create { bar } => {
            let saved = crud.create(bar.into_bar(None))?;
            output::write_bars(&mut out, &[saved], Format::Json)?;
        }
        Commands::Update { id, bar } => {
            let saved = crud.update(bar.into_bar(Some(id)))?;
            output::write_bars(&mut out, &[saved], Format::Json)?;
        }
        Commands::Get { id, format } => {
            let bar = crud.get(id)?;
            output::write_bars(&mut out, &[bar], format)?;
        }
        Commands::Delete { id } => {
            crud.delete(id)?;
            writeln!(out, "deleted bar {id}")?;
        }
        Commands::List {
            mut params,
            page,
            size,
            sort,
            format,
        } => {
            params.extend(page.map(|p| format!("page={p}")));
            params.extend(size.map(|s| format!("size={s}")));
            params.extend(sort.map(|s| format!("sort={s}")));
            let pairs = parse_pairs(&params)?;

            let criteria = BarCriteria::from_params(pairs.iter().copied())?;
            let request = PageRequest::from_params(
                pairs.iter().copied(),
                config.query.default_page_size,
                config.query.max_page_size,
            )?;
            let page = query.find_page_by_criteria(&criteria, &request)?;
            output::write_page(&mut out, &page, format)?;
        }
        Commands::Count { params } => {
            let pairs = parse_pairs(&params)?;
            let criteria = BarCriteria::from_params(pairs.iter().copied())?;
            writeln!(out, "{}", query.count_by_criteria(&criteria)?)?;
        }
        Commands::Ingest { symbol, range } => {
            let provider = IexProvider::new(&config.market_data)?;
            let summary = ingest_chart(&provider, &crud, &symbol, &range)?;
            writeln!(
                out,
                "{}: {} bars saved, {} skipped",
                summary.symbol, summary.saved, summary.skipped
            )?;
        }
        Commands::Symbols { format } => {
            let provider = IexProvider::new(&config.market_data)?;
            let symbols = provider.list_symbols()?;
            output::write_symbols(&mut out, &symbols, format)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so they
/// never mix with command output.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_repository(config: &AppConfig) -> Result<Arc<dyn BarRepository>> {
    match &config.store.path {
        Some(path) => {
            let store = FileBarStore::open(path)
                .with_context(|| format!("open bar store {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no store path configured; bars will not outlive this process");
            Ok(Arc::new(InMemoryBarStore::new()))
        }
    }
}

fn parse_pairs(params: &[String]) -> Result<Vec<(&str, &str)>> {
    Ok(params
        .iter()
        .map(|p| split_param(p))
        .collect::<Result<Vec<_>, _>>()?)
}
