use serde_json::{Map, Number, Value};

use super::scalar;

/// Keys longer than this are written as explicit `? key` pairs.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// Block-style YAML emitter.
///
/// Every node is rendered to a string first; a rendered collection that
/// starts with a newline hangs below its key or dash, everything else
/// follows it on the same line.
#[derive(Debug, Clone)]
pub struct Emitter {
    indent: usize,
    line_width: usize,
}

impl Default for Emitter {
    fn default() -> Self {
        Self { indent: 2, line_width: 80 }
    }
}

impl Emitter {
    pub fn new(indent: usize, line_width: usize) -> Self {
        Self { indent: indent.max(1), line_width }
    }

    pub fn dump(&self, value: &Value) -> String {
        let mut document = self.write_node(value, 0, true, false);
        document.push('\n');
        document
    }

    fn write_node(&self, value: &Value, level: usize, compact: bool, is_key: bool) -> String {
        // Nested nodes only hang compactly off a dash with the default indent.
        let compact = compact && (self.indent == 2 || level == 0);

        match value {
            Value::Object(map) if !map.is_empty() => self.write_mapping(map, level, compact),
            Value::Object(_) => "{}".to_string(),
            Value::Array(items) if !items.is_empty() => self.write_sequence(items, level, compact),
            Value::Array(_) => "[]".to_string(),
            Value::String(text) => self.write_scalar(text, level, is_key),
            Value::Number(number) => write_number(number),
            Value::Bool(flag) => flag.to_string(),
            Value::Null => "null".to_string(),
        }
    }

    fn write_mapping(&self, map: &Map<String, Value>, level: usize, compact: bool) -> String {
        let mut result = String::new();

        for (index, (key, value)) in map.iter().enumerate() {
            if !compact || index != 0 {
                result.push_str(&self.next_line(level));
            }

            let key = self.write_scalar(key, level + 1, true);
            let explicit = key.chars().count() > MAX_SIMPLE_KEY_LENGTH;

            if explicit {
                result.push_str("? ");
            }
            result.push_str(&key);
            if explicit {
                result.push_str(&self.next_line(level));
            }

            let value = self.write_node(value, level + 1, explicit, false);
            result.push_str(if value.starts_with('\n') { ":" } else { ": " });
            result.push_str(&value);
        }

        result
    }

    fn write_sequence(&self, items: &[Value], level: usize, compact: bool) -> String {
        let mut result = String::new();

        for (index, item) in items.iter().enumerate() {
            let item = self.write_node(item, level + 1, true, false);

            if !compact || index != 0 {
                result.push_str(&self.next_line(level));
            }
            result.push_str(if item.starts_with('\n') { "-" } else { "- " });
            result.push_str(&item);
        }

        result
    }

    fn write_scalar(&self, text: &str, level: usize, is_key: bool) -> String {
        // Block scalars are never written at column zero.
        let indent = self.indent * level.max(1);
        let line_width = self.line_width.min(40).max(self.line_width.saturating_sub(indent));

        scalar::write_string(text, indent, self.indent, line_width, is_key)
    }

    fn next_line(&self, level: usize) -> String {
        format!("\n{}", " ".repeat(self.indent * level))
    }
}

fn write_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }

    match number.as_f64() {
        Some(float) if float.is_nan() => ".nan".to_string(),
        Some(float) if float.is_infinite() => {
            if float.is_sign_negative() { "-.inf" } else { ".inf" }.to_string()
        }
        Some(float) if float == 0.0 && float.is_sign_negative() => "-0.0".to_string(),
        // Integral floats print like integers, exponent included (`1e+21`).
        Some(float) if float.fract() == 0.0 => shortest_decimal(float),
        Some(float) => {
            let text = shortest_decimal(float);
            match text.find('e') {
                Some(index) if !text[..index].contains('.') => format!("{}.{}", &text[..index], &text[index..]),
                _ => text,
            }
        }
        None => number.to_string(),
    }
}

/// Shortest round-trip digits of a finite float, written out in positional
/// notation when the decimal exponent lies in `-7..21` and as `d.ddde±x`
/// otherwise.
fn shortest_decimal(float: f64) -> String {
    let scientific = format!("{:e}", float.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let count = digits.len() as i32;
    let point = exponent + 1;

    let body = if count <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - count) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{}.{}", whole, fraction)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat(-point as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exponent < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, exponent.abs())
        }
    };

    if float.is_sign_negative() {
        format!("-{}", body)
    } else {
        body
    }
}
