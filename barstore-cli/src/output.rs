//! Rendering of bars and symbols as JSON, CSV or a plain table.

use anyhow::Result;
use barstore_core::domain::{StockBar, SymbolInfo};
use barstore_core::query::Page;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Csv,
    Table,
}

const BAR_HEADER: [&str; 8] = ["id", "symbol", "date", "open", "close", "high", "low", "volume"];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn bar_record(bar: &StockBar) -> [String; 8] {
    [
        opt(bar.id),
        opt(bar.symbol.as_deref()),
        opt(bar.date.map(|d| d.to_rfc3339())),
        opt(bar.open),
        opt(bar.close),
        opt(bar.high),
        opt(bar.low),
        opt(bar.volume),
    ]
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_bars<W: Write>(out: &mut W, bars: &[StockBar], format: Format) -> Result<()> {
    match format {
        Format::Json => write_json(out, bars),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(BAR_HEADER)?;
            for bar in bars {
                writer.write_record(bar_record(bar))?;
            }
            writer.flush()?;
            Ok(())
        }
        Format::Table => {
            let row = |cells: &[String]| {
                format!(
                    "{:>6} {:<8} {:<25} {:>10} {:>10} {:>10} {:>10} {:>12}",
                    cells[0], cells[1], cells[2], cells[3], cells[4], cells[5], cells[6], cells[7]
                )
            };
            let header: Vec<String> = BAR_HEADER.iter().map(|h| h.to_string()).collect();
            writeln!(out, "{}", row(&header))?;
            writeln!(out, "{}", "-".repeat(98))?;
            for bar in bars {
                writeln!(out, "{}", row(&bar_record(bar)))?;
            }
            Ok(())
        }
    }
}

pub fn write_page<W: Write>(out: &mut W, page: &Page<StockBar>, format: Format) -> Result<()> {
    match format {
        Format::Json => write_json(out, page),
        Format::Csv => write_bars(out, &page.content, format),
        Format::Table => {
            write_bars(out, &page.content, format)?;
            writeln!(
                out,
                "\npage {} of {} ({} matching)",
                page.page + 1,
                page.total_pages().max(1),
                page.total_elements
            )?;
            Ok(())
        }
    }
}

pub fn write_symbols<W: Write>(out: &mut W, symbols: &[SymbolInfo], format: Format) -> Result<()> {
    match format {
        Format::Json => write_json(out, symbols),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for symbol in symbols {
                writer.serialize(symbol)?;
            }
            writer.flush()?;
            Ok(())
        }
        Format::Table => {
            writeln!(out, "{:<10} {}", "Symbol", "Name")?;
            writeln!(out, "{}", "-".repeat(50))?;
            for s in symbols {
                writeln!(out, "{:<10} {}", s.symbol, s.full_name)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barstore_core::domain::BarId;
    use barstore_core::query::PageRequest;

    fn bars() -> Vec<StockBar> {
        vec![
            StockBar::new().id(1).symbol("AAPL").open(1.5).volume(10),
            StockBar::new().id(BarId(2)).symbol("MSFT"),
        ]
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_keeps_nulls_as_empty_cells() {
        let text = render(|out| write_bars(out, &bars(), Format::Csv));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "id,symbol,date,open,close,high,low,volume");
        assert_eq!(lines[1], "1,AAPL,,1.5,,,,10");
        assert_eq!(lines[2], "2,MSFT,,,,,,");
    }

    #[test]
    fn json_page_uses_camel_case_totals() {
        let page = Page::new(bars(), &PageRequest::new(0, 20), 2);
        let text = render(|out| write_page(out, &page, Format::Json));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["totalElements"], 2);
        assert_eq!(value["content"][0]["symbol"], "AAPL");
    }

    #[test]
    fn symbols_csv_has_header() {
        let symbols = vec![SymbolInfo::new("AAPL", "Apple Inc.")];
        let text = render(|out| write_symbols(out, &symbols, Format::Csv));
        assert_eq!(text, "symbol,fullName\nAAPL,Apple Inc.\n");
    }

    #[test]
    fn table_ends_with_page_footer() {
        let page = Page::new(bars(), &PageRequest::new(0, 1), 2);
        let text = render(|out| write_page(out, &page, Format::Table));
        assert!(text.trim_end().ends_with("page 1 of 2 (2 matching)"));
    }
}
