use serde::Serialize;
use std::io;

use crate::model::{RoundId, RoundReport};

#[derive(Debug, Serialize)]
struct OutputRow {
    round: RoundId,
    crash_point: String,
    bet: String,
    cashed_out_at: String,
    payout: String,
    balance: String,
}

impl From<&RoundReport> for OutputRow {
    fn from(report: &RoundReport) -> Self {
        Self {
            round: report.round,
            crash_point: format!("{:.2}", report.crash_point),
            bet: report.bet.map(|b| b.to_string()).unwrap_or_default(),
            cashed_out_at: report
                .cashed_out_at
                .map(|m| format!("{m:.2}"))
                .unwrap_or_default(),
            payout: report.payout.to_string(),
            balance: report.balance.to_string(),
        }
    }
}

/// Write round reports in csv format, one row per round.
pub fn write_rounds<'a, W: io::Write>(
    writer: W,
    reports: impl IntoIterator<Item = &'a RoundReport>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for report in reports {
        writer.serialize(OutputRow::from(report))?;
    }
    writer.flush()?;
    Ok(())
}
