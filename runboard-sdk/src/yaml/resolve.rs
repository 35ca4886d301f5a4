use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:[-+]?(?:0|[1-9][0-9_]*)(?:\.[0-9_]*)?(?:[eE][-+]?[0-9]+)?",
            r"|\.[0-9_]+(?:[eE][-+]?[0-9]+)?",
            r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
            r"|[-+]?\.(?:inf|Inf|INF)",
            r"|\.(?:nan|NaN|NAN))$",
        ))
        .expect("float pattern is valid")
    })
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}",
            r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}",
            r"(?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?)$",
        ))
        .expect("timestamp pattern is valid")
    })
}

fn base60_tail_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?::[0-5]?[0-9])+$").expect("base60 pattern is valid"))
}

/// Whether a plain scalar with this text would be read back as something
/// other than a string (null, bool, int, float, timestamp or merge key).
///
/// Both the YAML 1.1 resolvers and the parser behind [`super::from_str`]
/// are consulted, since the latter resolves some spellings (`0o755`, `+.5`)
/// that YAML 1.1 leaves as strings.
pub(crate) fn is_ambiguous(text: &str) -> bool {
    is_null(text)
        || is_bool(text)
        || is_int(text)
        || is_float(text)
        || timestamp_pattern().is_match(text)
        || text == "<<"
        || !reads_back_as_string(text)
}

fn reads_back_as_string(text: &str) -> bool {
    matches!(super::from_str(text), Ok(Value::String(parsed)) if parsed == text)
}

fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

fn is_bool(text: &str) -> bool {
    matches!(text, "true" | "True" | "TRUE" | "false" | "False" | "FALSE")
}

fn is_float(text: &str) -> bool {
    float_pattern().is_match(text) && !text.ends_with('_')
}

fn is_int(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut index = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        index += 1;
    }

    if bytes.get(index) == Some(&b'0') {
        if index + 1 == bytes.len() {
            return true;
        }
        index += 1;

        let valid = match bytes[index] {
            b'b' => has_digits(&bytes[index + 1..], |b| *b == b'0' || *b == b'1'),
            b'x' => has_digits(&bytes[index + 1..], u8::is_ascii_hexdigit),
            _ => has_digits(&bytes[index..], |b| (b'0'..=b'7').contains(b)),
        };

        return valid && !text.ends_with('_');
    }

    if bytes.get(index) == Some(&b'_') {
        return false;
    }

    let rest = &bytes[index..];
    let colon = rest.iter().position(|&b| b == b':');
    let decimal = &rest[..colon.unwrap_or(rest.len())];

    if !has_digits(decimal, u8::is_ascii_digit) {
        return false;
    }
    if colon.is_none() && decimal.last() == Some(&b'_') {
        return false;
    }

    match colon {
        None => true,
        Some(position) => base60_tail_pattern().is_match(&text[index + position..]),
    }
}

/// All bytes are digits or `_`, with at least one digit.
fn has_digits(bytes: &[u8], is_digit: fn(&u8) -> bool) -> bool {
    let mut found = false;
    for byte in bytes {
        if *byte == b'_' {
            continue;
        }
        if !is_digit(byte) {
            return false;
        }
        found = true;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_scalars() {
        for text in ["", "~", "null", "True", "FALSE", "0", "-0", "+12", "1_000", "0x1F", "0b101",
            "017", "1.5", "1e3", ".5", "-.inf", ".NaN", "2024-01-01", "2024-1-1 10:00:00", "<<", "190:20:30",
            "0o755", "+.5", "-"]
        {
            assert!(is_ambiguous(text), "{:?} should be ambiguous", text);
        }
    }

    #[test]
    fn test_unambiguous_scalars() {
        for text in ["test-r-", "v1beta1", "1.2.3", "0x", "_1", "nulls", "2024-01", "0b2", "main",
            "hello world"]
        {
            assert!(!is_ambiguous(text), "{:?} should not be ambiguous", text);
        }
    }
}
