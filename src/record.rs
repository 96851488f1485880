//! Records and line parsing.

/// A parsed `key;value` line. Lives from the parser to one aggregator fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: f64,
}

impl Record {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Split a raw line into its key and numeric payload.
///
/// The key is everything left of the first delimiter, the payload is the
/// second field; any further fields are ignored. Returns `None` when the
/// delimiter is missing, the payload is empty, not a number or not finite
/// (`NaN`, `inf`), or the key is not UTF-8. A trailing `\r` is stripped first so CRLF input parses.
#[inline]
pub fn split_line(line: &[u8], delimiter: u8) -> Option<(&str, f64)> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let split = line.iter().position(|&b| b == delimiter)?;
    let rest = &line[split + 1..];
    let payload = match rest.iter().position(|&b| b == delimiter) {
        Some(end) => &rest[..end],
        None => rest,
    };
    if payload.is_empty() {
        return None;
    }
    let value = fast_float::parse::<f64, _>(payload)
        .ok()
        .filter(|v: &f64| v.is_finite())?;
    let key = std::str::from_utf8(&line[..split]).ok()?;
    Some((key, value))
}

/// Parse a raw line into an owned [`Record`].
#[inline]
pub fn parse_line(line: &[u8], delimiter: u8) -> Option<Record> {
    split_line(line, delimiter).map(|(key, value)| Record::new(key, value))
}
