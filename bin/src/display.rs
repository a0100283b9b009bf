//! Output formatting for the iexcloud CLI.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

/// How JSON is written to stdout.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Format {
    /// Indented, one field per line.
    Pretty,
    /// A single line.
    Compact,
}

/// Writes `value` to `out` in the given format, followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize>(mut out: W, value: &T, format: Format) -> Result<()> {
    match format {
        Format::Pretty => serde_json::to_writer_pretty(&mut out, value)?,
        Format::Compact => serde_json::to_writer(&mut out, value)?,
    }
    writeln!(out)?;
    Ok(())
}

/// Prints `value` to stdout.
pub(crate) fn print_json<T: Serialize>(value: &T, format: Format) -> Result<()> {
    write_json(std::io::stdout().lock(), value, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_formats() {
        let value = json!({"status": "up"});

        let mut compact = Vec::new();
        write_json(&mut compact, &value, Format::Compact).unwrap();
        assert_eq!(String::from_utf8(compact).unwrap(), "{\"status\":\"up\"}\n");

        let mut pretty = Vec::new();
        write_json(&mut pretty, &value, Format::Pretty).unwrap();
        assert_eq!(
            String::from_utf8(pretty).unwrap(),
            "{\n  \"status\": \"up\"\n}\n"
        );
    }
}
