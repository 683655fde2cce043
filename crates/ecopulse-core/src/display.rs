//! Display formatting for dashboard values.
//!
//! Pure functions of a value; the presentation layer decides where strings go.

use serde::Serialize;

use crate::log_feed::LogEntry;
use crate::snapshot::Snapshot;

/// Compact form with `K`/`M`/`B` suffixes and two decimals at and above
/// 10^3/10^6/10^9. Smaller values print as-is.
pub fn format_number(num: f64) -> String {
    if num >= 1e9 {
        format!("{:.2}B", num / 1e9)
    } else if num >= 1e6 {
        format!("{:.2}M", num / 1e6)
    } else if num >= 1e3 {
        format!("{:.2}K", num / 1e3)
    } else {
        num.to_string()
    }
}

/// Integer with `,` thousands separators.
pub fn format_grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Snapshot projected onto display strings, the way the dashboard shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tick: u64,
    pub atmospheric_level: String,
    pub devices_connected: String,
    pub total_removed: String,
    pub efficiency_pct: String,
    pub reduction_pct: String,
    pub active_projects: String,
    pub log_entries: Vec<LogEntry>,
}

impl From<&Snapshot> for DashboardView {
    fn from(s: &Snapshot) -> Self {
        let g = &s.gauges;
        Self {
            tick: s.tick,
            atmospheric_level: format!("{:.2}", g.atmospheric_level),
            devices_connected: format_number(g.devices_connected as f64),
            total_removed: format_number(g.total_removed as f64),
            efficiency_pct: format!("{:.2}%", g.efficiency_pct),
            reduction_pct: format!("{:.2}%", g.reduction_pct),
            active_projects: format_grouped(g.active_projects),
            log_entries: s.log_entries.clone(),
        }
    }
}
