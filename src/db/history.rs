use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::portfolio::VenueTotals;

/// Append-only CSV log of cross-venue totals, one row per refresh cycle.
/// The header is written only when the file is first created.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    timestamp: DateTime<Utc>,
    btc_price: Decimal,
    binance_usdt: Decimal,
    gate_usdt: Decimal,
    wallet_usdt: Decimal,
    total_usdt: Decimal,
    total_btc: Decimal,
    total_fiat: Option<Decimal>,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, totals: &VenueTotals, at: DateTime<Utc>) -> anyhow::Result<()> {
        let exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);

        writer.serialize(HistoryRow {
            timestamp: at,
            btc_price: totals.btc_price,
            binance_usdt: totals.binance_usdt,
            gate_usdt: totals.gate_usdt,
            wallet_usdt: totals.wallet_usdt,
            total_usdt: totals.total_usdt,
            total_btc: totals.total_btc,
            total_fiat: totals.total_fiat(),
        })?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> VenueTotals {
        VenueTotals::new(
            Decimal::from(50_000),
            Decimal::from(10_000),
            Decimal::from(4_000),
            Decimal::from(1_000),
            None,
        )
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let log = HistoryLog::new(&path);

        log.append(&totals(), Utc::now()).unwrap();
        log.append(&totals(), Utc::now()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,btc_price,"));
        assert!(lines[1].contains("15000"));
        assert!(!lines[2].starts_with("timestamp"));
    }
}
