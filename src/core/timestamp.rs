// LogMerge - core/timestamp.rs
//
// Timestamp resolution into the canonical zone.
//
// Output instants are timezone-naive: once every record is in the same zone
// the offset carries no information, and the table writer prints wall-clock
// time only.

use crate::util::constants;
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, FixedOffset, NaiveDateTime, Offset, Utc};

/// Explicit normalisation settings, passed by value into every call so
/// aggregation is deterministic and safe to run on any thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampConfig {
    /// Interpret raw timestamps as UTC and convert into `canonical_zone`.
    /// When false they are taken as already local.
    pub assume_source_is_utc: bool,

    /// Zone all output timestamps are expressed in.
    pub canonical_zone: FixedOffset,

    /// chrono format string for the raw timestamp.
    pub input_format: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            assume_source_is_utc: constants::DEFAULT_ASSUME_SOURCE_IS_UTC,
            canonical_zone: default_zone(),
            input_format: constants::DEFAULT_TIMESTAMP_INPUT_FORMAT.to_string(),
        }
    }
}

/// UTC+05:30.
pub fn default_zone() -> FixedOffset {
    parse_zone(constants::DEFAULT_CANONICAL_TIMEZONE).unwrap_or_else(|| Utc.fix())
}

/// Resolve `raw_timestamp` into a naive instant in the canonical zone.
///
/// Returns `None` for anything the configured format cannot parse, and for
/// instants the zone shift would push outside the representable range;
/// never panics.
pub fn normalize(raw_timestamp: &str, config: &TimestampConfig) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(raw_timestamp.trim(), &config.input_format).ok()?;

    if config.assume_source_is_utc {
        // Checked: an extreme year plus the offset can leave chrono's range.
        let offset = Duration::seconds(i64::from(config.canonical_zone.local_minus_utc()));
        parsed.checked_add_signed(offset)
    } else {
        Some(parsed)
    }
}

/// Parse a zone designator into a fixed offset.
///
/// Accepts `UTC`, `GMT`, `Z`, `+05:30`, `+0530`, `+05`, `-08:00`, and the
/// same offsets prefixed with `UTC`/`GMT` (e.g. `UTC+05:30`).
pub fn parse_zone(text: &str) -> Option<FixedOffset> {
    let trimmed = text.trim();
    let upper = trimmed.to_ascii_uppercase();

    if matches!(upper.as_str(), "UTC" | "GMT" | "Z") {
        return Some(Utc.fix());
    }

    let offset = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };

    // Only ASCII digits and colons after the sign.
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    let secs = sign * (hours * 3_600 + minutes * 60);
    if secs.abs() > constants::MAX_OFFSET_SECS {
        return None;
    }
    FixedOffset::east_opt(secs)
}

/// Format a fixed offset the way `parse_zone` accepts it (`+05:30`).
pub fn format_zone(zone: &FixedOffset) -> String {
    let secs = zone.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3_600, (abs % 3_600) / 60)
}

/// Check that a chrono format string is well formed and carries enough
/// fields to produce a full date and time.
pub fn validate_format(format: &str) -> Result<(), String> {
    if format.trim().is_empty() {
        return Err("format string is empty".to_string());
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err("format string contains an invalid specifier".to_string());
    }
    let has_date = ["%Y", "%F", "%s", "%D", "%y", "%C"]
        .iter()
        .any(|spec| format.contains(spec));
    let has_time = ["%H", "%I", "%T", "%R", "%s", "%X", "%r"]
        .iter()
        .any(|spec| format.contains(spec));
    if !has_date || !has_time {
        return Err("format string must contain both date and time fields".to_string());
    }
    Ok(())
}
