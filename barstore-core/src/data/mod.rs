//! Market data: provider abstraction, the IEX client, and chart ingest.

pub mod iex;
pub mod ingest;
pub mod provider;

pub use iex::IexProvider;
pub use ingest::{ingest_chart, IngestError, IngestSummary};
pub use provider::{ChartRecord, DataError, MarketDataProvider};
