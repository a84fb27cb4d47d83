//! Chart ingest: provider records in, persisted stock bars out.

use super::provider::{ChartRecord, DataError, MarketDataProvider};
use crate::domain::StockBar;
use crate::service::{BarService, ServiceError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Outcome of one ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub symbol: String,
    pub saved: usize,
    pub skipped: usize,
}

/// Maps a chart record to an unsaved bar dated 00:00 UTC of the record's day.
/// Returns `None` when the record has no date or fails the OHLC sanity check.
pub fn to_bar(symbol: &str, record: &ChartRecord) -> Option<StockBar> {
    let date = record.date?.and_hms_opt(0, 0, 0)?.and_utc();
    let mut bar = StockBar::new().symbol(symbol).date(date);
    bar.open = record.open;
    bar.close = record.close;
    bar.high = record.high;
    bar.low = record.low;
    bar.volume = record.volume;
    bar.is_sane().then_some(bar)
}

/// Fetches the chart for `symbol` over `range` and creates one bar per
/// usable record. Bad records are skipped, not fatal.
pub fn ingest_chart(
    provider: &dyn MarketDataProvider,
    service: &BarService,
    symbol: &str,
    range: &str,
) -> Result<IngestSummary, IngestError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let records = provider.fetch_chart(&symbol, range)?;

    let mut summary = IngestSummary {
        symbol: symbol.clone(),
        saved: 0,
        skipped: 0,
    };
    for record in &records {
        match to_bar(&symbol, record) {
            Some(bar) => {
                service.create(bar)?;
                summary.saved += 1;
            }
            None => {
                tracing::warn!(%symbol, date = ?record.date, "skipping unusable chart record");
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        symbol = %summary.symbol,
        provider = provider.name(),
        saved = summary.saved,
        skipped = summary.skipped,
        "chart ingested"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SymbolInfo;
    use crate::query::PageRequest;
    use crate::store::InMemoryBarStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    /// Serves a fixed chart and records what was asked for.
    struct FixtureProvider {
        records: Vec<ChartRecord>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl MarketDataProvider for FixtureProvider {
        fn name(&self) -> &str {
            "fixture"
        }

        fn fetch_chart(&self, symbol: &str, range: &str) -> Result<Vec<ChartRecord>, DataError> {
            self.requests
                .lock()
                .unwrap()
                .push((symbol.to_string(), range.to_string()));
            Ok(self.records.clone())
        }

        fn list_symbols(&self) -> Result<Vec<SymbolInfo>, DataError> {
            Ok(vec![SymbolInfo::new("AAPL", "Apple Inc.")])
        }
    }

    struct FailingProvider;

    impl MarketDataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch_chart(&self, symbol: &str, _range: &str) -> Result<Vec<ChartRecord>, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }

        fn list_symbols(&self) -> Result<Vec<SymbolInfo>, DataError> {
            Ok(Vec::new())
        }
    }

    fn record(day: u32, open: f64, close: f64, high: f64, low: f64) -> ChartRecord {
        ChartRecord {
            date: NaiveDate::from_ymd_opt(2020, 2, day),
            open: Some(open),
            close: Some(close),
            high: Some(high),
            low: Some(low),
            volume: Some(1_000),
        }
    }

    #[test]
    fn saves_sane_records_and_skips_the_rest() {
        let provider = FixtureProvider {
            records: vec![
                record(3, 304.3, 308.66, 313.49, 302.22),
                record(4, 315.31, 318.85, 319.64, 313.63),
                // high below low
                record(5, 10.0, 10.0, 9.0, 11.0),
                ChartRecord {
                    date: None,
                    ..record(6, 1.0, 1.0, 1.0, 1.0)
                },
            ],
            requests: Mutex::new(Vec::new()),
        };
        let service = BarService::new(Arc::new(InMemoryBarStore::new()));

        let summary = ingest_chart(&provider, &service, " aapl", "1y").unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                symbol: "AAPL".into(),
                saved: 2,
                skipped: 2
            }
        );
        assert_eq!(
            provider.requests.lock().unwrap().as_slice(),
            &[("AAPL".to_string(), "1y".to_string())]
        );

        let page = service.list(&PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 2);
        let first = &page.content[0];
        assert_eq!(first.symbol.as_deref(), Some("AAPL"));
        assert_eq!(first.date, Some(Utc.with_ymd_and_hms(2020, 2, 3, 0, 0, 0).unwrap()));
        assert_eq!(first.volume, Some(1_000));
        assert!(first.is_persisted());
    }

    #[test]
    fn provider_errors_propagate() {
        let service = BarService::new(Arc::new(InMemoryBarStore::new()));
        let err = ingest_chart(&FailingProvider, &service, "NOPE", "1m").unwrap_err();
        assert!(matches!(
            err,
            IngestError::Data(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn to_bar_keeps_missing_volume_null() {
        let bar = to_bar(
            "MSFT",
            &ChartRecord {
                volume: None,
                ..record(3, 1.0, 1.0, 1.0, 1.0)
            },
        )
        .unwrap();
        assert_eq!(bar.volume, None);
        assert!(!bar.is_persisted());
    }
}
