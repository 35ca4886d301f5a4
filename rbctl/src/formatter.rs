use std::io::Write;

use runboard_sdk::yaml;
use serde_json::Value;

use crate::cmd::OutputFormat;

pub fn print_output(value: &Value, format: OutputFormat, pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    write_output(&mut stdout.lock(), value, format, pretty)
}

pub fn write_output(out: &mut impl Write, value: &Value, format: OutputFormat, pretty: bool) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            if pretty {
                writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
            } else {
                writeln!(out, "{}", serde_json::to_string(value)?)?;
            }
        },

        OutputFormat::Yaml => {
            write!(out, "{}", yaml::to_string(value))?;
        },

        OutputFormat::Standard => {
            write_human_readable(out, value, 0)?;
        }
    }

    Ok(())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_human_readable(out: &mut impl Write, value: &Value, indent: usize) -> std::io::Result<()> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                write!(out, "{:indent$}{}:", "", k, indent = indent)?;
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(out)?;
                        write_human_readable(out, v, indent + 2)?;
                    },
                    _ => writeln!(out, " {}", scalar(v))?,
                }
            }
        },
        Value::Array(arr) => {
            for v in arr {
                write!(out, "{:indent$}-", "", indent = indent)?;
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(out)?;
                        write_human_readable(out, v, indent + 2)?;
                    },
                    _ => writeln!(out, " {}", scalar(v))?,
                }
            }
        },
        // documents already end with a newline
        Value::String(text) if text.ends_with('\n') => write!(out, "{:indent$}{}", "", text, indent = indent)?,
        _ => writeln!(out, "{:indent$}{}", "", scalar(value), indent = indent)?,
    }

    Ok(())
}
