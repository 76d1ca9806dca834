//! Duration formatting for logs.

use tavern_types::SECS_PER_DAY;

const UNITS: [(u64, &str); 4] = [(SECS_PER_DAY, "d"), (3600, "h"), (60, "m"), (1, "s")];

/// Largest non-zero unit plus the next one when it is non-zero:
/// `5400` → `"1h 30m"`, `14400` → `"4h"`.
pub fn format_duration(secs: u64) -> String {
    let Some(i) = UNITS.iter().position(|(size, _)| secs >= *size) else {
        return "0s".to_string();
    };
    let (size, suffix) = UNITS[i];
    let mut out = format!("{}{suffix}", secs / size);
    if let Some((next, next_suffix)) = UNITS.get(i + 1) {
        let n = (secs % size) / next;
        if n > 0 {
            out.push_str(&format!(" {n}{next_suffix}"));
        }
    }
    out
}
