//! Display helpers exposed to templates as `JSON`, `TimeAgo`, `Timestamp`
//! and `Colour`.

use chrono::{DateTime, Utc};
use serde::Serialize;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const YEAR: i64 = 365 * DAY;

/// Label colours for `Colour`. Order matters: labels hash onto these indices.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Re-indents a JSON payload with tabs. Anything that does not parse is
/// returned as-is so a bad payload never breaks the page.
pub fn pretty_json(text: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return text.to_string(),
    };
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut serializer).is_err() {
        return text.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}

pub fn time_ago(unix_seconds: i64) -> String {
    time_ago_at(unix_seconds, Utc::now().timestamp())
}

pub fn time_ago_at(unix_seconds: i64, now: i64) -> String {
    let delta = now.saturating_sub(unix_seconds);
    if delta < 0 {
        return "just now".to_string();
    }
    if delta > YEAR {
        return match DateTime::<Utc>::from_timestamp(unix_seconds, 0) {
            Some(at) => at.format("%-d %b %Y").to_string(),
            None => unix_seconds.to_string(),
        };
    }
    format!("{} ago", distance(delta))
}

fn distance(seconds: i64) -> String {
    let minutes = seconds / MINUTE;
    match seconds {
        s if s < MINUTE => plural(s, "second"),
        s if s < 59 * MINUTE => plural(minutes, "minute"),
        s if s < 90 * MINUTE => "about an hour".to_string(),
        s if s < 2 * HOUR => "almost 2 hours".to_string(),
        s if s < 18 * HOUR => plural(s / HOUR, "hour"),
        s if s < 28 * HOUR => "about a day".to_string(),
        s if s < 36 * HOUR => "more than a day".to_string(),
        s if s < 42 * HOUR => "almost 2 days".to_string(),
        s if s < 2 * DAY => "about 2 days".to_string(),
        s => plural(s / DAY, "day"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// RFC 822 style absolute time, always in UTC.
pub fn timestamp(unix_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_seconds, 0) {
        Some(at) => at.format("%d %b %y %H:%M UTC").to_string(),
        None => unix_seconds.to_string(),
    }
}

/// Stable colour for a label (FNV-1a over the bytes). Same label, same colour,
/// in every process.
pub fn colour(label: &str) -> &'static str {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in label.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PALETTE[hash as usize % PALETTE.len()]
}

/// Minimal attribute escaping for generated links. Unlike the template
/// engine's own escaping this leaves `/` alone so paths stay readable.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
