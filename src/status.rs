use std::fmt;

use crate::fingerprint::Fingerprint;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with binary units and two decimals, e.g. `1.50 KB`.
/// Anything past the TB range stays in TB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// What the front end shows after each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub connected: bool,
    /// `None` when the database file could not be stat'ed.
    pub db_size_bytes: Option<u64>,
    pub last_hash: Option<Fingerprint>,
    pub known: usize,
    pub saved_this_session: u64,
    pub paused: bool,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.db_size_bytes.map(format_size).unwrap_or_else(|| "N/A".into());
        let last = self.last_hash.as_ref().map(Fingerprint::as_str).unwrap_or("N/A");
        write!(
            f,
            "connected: {} | database size: {} | known: {} | saved: {} | {} | last hash: {}",
            if self.connected { "yes" } else { "no" },
            size,
            self.known,
            self.saved_this_session,
            if self.paused { "paused" } else { "running" },
            last,
        )
    }
}
