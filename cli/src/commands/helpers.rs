use anyhow::{Result, bail};
use serde::Serialize;

/// Convert a 1-based index from the command line into a 0-based one.
pub(crate) fn parse_index(n: usize) -> Result<usize> {
    if n == 0 {
        bail!("Numbers start at 1; run `larder cook status` to see them");
    }
    Ok(n - 1)
}

/// Format a quantity without trailing decimal noise: 2 → "2", 0.5 → "0.5",
/// 236.588 → "236.59".
pub(crate) fn fmt_qty(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(1).unwrap(), 0);
        assert_eq!(parse_index(12).unwrap(), 11);
        assert!(parse_index(0).is_err());
    }

    #[test]
    fn test_fmt_qty() {
        assert_eq!(fmt_qty(2.0), "2");
        assert_eq!(fmt_qty(0.5), "0.5");
        assert_eq!(fmt_qty(236.588), "236.59");
        assert_eq!(fmt_qty(0.0), "0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("nope"), "{\"error\":\"nope\"}");
    }
}
