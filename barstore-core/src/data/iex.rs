//! IEX Cloud market data provider.
//!
//! Fetches daily charts from `/stable/stock/{symbol}/chart/{range}` and the
//! symbol reference list from `/stable/ref-data/symbols`. Transient failures
//! (timeouts, connection errors, 5xx, 429) are retried with exponential
//! backoff; everything else fails fast.

use super::provider::{ChartRecord, DataError, MarketDataProvider};
use crate::config::{MarketDataConfig, MAX_RETRIES};
use crate::domain::SymbolInfo;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Chart entry as IEX serializes it. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct IexChartEntry {
    date: Option<String>,
    open: Option<f64>,
    close: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IexSymbolEntry {
    symbol: Option<String>,
    name: Option<String>,
}

pub struct IexProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    max_retries: u32,
    base_delay: Duration,
}

impl IexProvider {
    pub fn new(config: &MarketDataConfig) -> Result<Self, DataError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("barstore/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| DataError::ClientSetup(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| DataError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().unwrap_or_default(),
            max_retries: config.max_retries.min(MAX_RETRIES),
            base_delay: Duration::from_millis(500),
        })
    }

    /// Delay before retry number `attempt` (1-based): doubles each time.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    fn chart_url(&self, symbol: &str, range: &str) -> String {
        format!(
            "{}/stable/stock/{}/chart/{range}?token={}",
            self.base_url,
            symbol.to_ascii_lowercase(),
            self.token
        )
    }

    fn symbols_url(&self) -> String {
        format!("{}/stable/ref-data/symbols?token={}", self.base_url, self.token)
    }

    /// GET `url` and decode its JSON body, retrying transient failures.
    /// `subject` names what is fetched, for error messages and 404 mapping.
    fn get_json<T: DeserializeOwned>(&self, url: &str, subject: &str) -> Result<T, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                tracing::debug!(subject, attempt, ?delay, "retrying market data request");
                std::thread::sleep(delay);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(DataError::AuthenticationRequired(format!(
                    "HTTP {status}: check the market data token"
                )));
            }
            if status == StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: subject.to_string(),
                });
            }
            if status.is_server_error() {
                last_error = Some(DataError::Other(format!("HTTP {status} for {subject}")));
                continue;
            }
            if !status.is_success() {
                return Err(DataError::Other(format!("HTTP {status} for {subject}")));
            }

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
            return serde_json::from_str(&body).map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {subject}: {e}"))
            });
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Parses an IEX chart body. Entries keep missing fields as `None`; an
/// unparseable date is a format change, not a skipped row.
pub fn parse_chart(body: &str) -> Result<Vec<ChartRecord>, DataError> {
    let entries: Vec<IexChartEntry> = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("chart: {e}")))?;
    entries.into_iter().map(chart_record).collect()
}

fn chart_record(entry: IexChartEntry) -> Result<ChartRecord, DataError> {
    let date = entry
        .date
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| DataError::ResponseFormatChanged(format!("invalid date '{d}': {e}")))
        })
        .transpose()?;
    // IEX sends volume as a JSON number that may carry a fraction
    let volume = entry
        .volume
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64);

    Ok(ChartRecord {
        date,
        open: entry.open,
        close: entry.close,
        high: entry.high,
        low: entry.low,
        volume,
    })
}

/// Parses an IEX ref-data symbols body. Entries without a symbol are dropped;
/// a missing name becomes empty.
pub fn parse_symbols(body: &str) -> Result<Vec<SymbolInfo>, DataError> {
    let entries: Vec<IexSymbolEntry> = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("symbols: {e}")))?;
    Ok(symbol_infos(entries))
}

fn symbol_infos(entries: Vec<IexSymbolEntry>) -> Vec<SymbolInfo> {
    entries
        .into_iter()
        .filter_map(|e| Some(SymbolInfo::new(e.symbol?, e.name.unwrap_or_default())))
        .collect()
}

impl MarketDataProvider for IexProvider {
    fn name(&self) -> &str {
        "iex_cloud"
    }

    fn fetch_chart(&self, symbol: &str, range: &str) -> Result<Vec<ChartRecord>, DataError> {
        let entries: Vec<IexChartEntry> = self.get_json(&self.chart_url(symbol, range), symbol)?;
        entries.into_iter().map(chart_record).collect()
    }

    fn list_symbols(&self) -> Result<Vec<SymbolInfo>, DataError> {
        let entries = self.get_json(&self.symbols_url(), "ref-data/symbols")?;
        Ok(symbol_infos(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"[
        {"date":"2020-02-03","open":304.3,"close":308.66,"high":313.49,"low":302.22,"volume":43496401,"uOpen":304.3,"change":0},
        {"date":"2020-02-04","open":315.31,"close":318.85,"high":319.64,"low":313.63,"volume":34154134.0},
        {"date":"2020-02-05","close":321.45}
    ]"#;

    fn config() -> MarketDataConfig {
        MarketDataConfig {
            base_url: "https://sandbox.iexapis.com/".into(),
            token: Some("Tpk_test".into()),
            ..MarketDataConfig::default()
        }
    }

    #[test]
    fn parses_chart_entries() {
        let records = parse_chart(CHART).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2020, 2, 3));
        assert_eq!(records[0].open, Some(304.3));
        assert_eq!(records[0].volume, Some(43_496_401));
        assert_eq!(records[1].volume, Some(34_154_134));
        assert_eq!(records[2].open, None);
        assert_eq!(records[2].close, Some(321.45));
    }

    #[test]
    fn bad_date_is_a_format_change() {
        let err = parse_chart(r#"[{"date":"02/03/2020","close":1.0}]"#).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
        assert!(matches!(parse_chart("{}"), Err(DataError::ResponseFormatChanged(_))));
    }

    #[test]
    fn parses_symbols() {
        let body = r#"[
            {"symbol":"A","name":"Agilent Technologies Inc.","exchange":"NYS"},
            {"symbol":"AAPL","name":"Apple Inc."},
            {"name":"orphan"},
            {"symbol":"ZZZ"}
        ]"#;
        let symbols = parse_symbols(body).unwrap();
        assert_eq!(
            symbols,
            vec![
                SymbolInfo::new("A", "Agilent Technologies Inc."),
                SymbolInfo::new("AAPL", "Apple Inc."),
                SymbolInfo::new("ZZZ", ""),
            ]
        );
    }

    #[test]
    fn urls_follow_iex_layout() {
        let provider = IexProvider::new(&config()).unwrap();
        assert_eq!(
            provider.chart_url("AAPL", "1y"),
            "https://sandbox.iexapis.com/stable/stock/aapl/chart/1y?token=Tpk_test"
        );
        assert_eq!(
            provider.symbols_url(),
            "https://sandbox.iexapis.com/stable/ref-data/symbols?token=Tpk_test"
        );
    }

    #[test]
    fn backoff_doubles_and_retries_are_capped() {
        let provider = IexProvider::new(&MarketDataConfig {
            max_retries: 40,
            ..config()
        })
        .unwrap();
        assert_eq!(provider.max_retries, MAX_RETRIES);
        assert_eq!(provider.backoff(1), Duration::from_millis(500));
        assert_eq!(provider.backoff(3), Duration::from_millis(2000));
        // no overflow panic for large attempt numbers
        assert!(provider.backoff(40) >= provider.backoff(10));
    }
}
