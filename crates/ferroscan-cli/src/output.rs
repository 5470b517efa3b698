use std::io::{self, Write};

use ferroscan_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Column-aligned rows shown by `--format table` in place of raw JSON data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: Vec<&'static str>) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self
            .headers
            .iter()
            .map(|header| header.chars().count())
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(index) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();

        writeln!(out, "{}", self.title)?;
        writeln!(out, "{}", format_row(self.headers.iter().copied(), &widths))?;
        writeln!(
            out,
            "{}",
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  ")
        )?;
        for row in &self.rows {
            writeln!(out, "{}", format_row(row.iter().map(String::as_str), &widths))?;
        }
        Ok(())
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

/// One rendered command result.
#[derive(Debug, Clone)]
pub struct Document {
    pub envelope: Envelope<Value>,
    pub tables: Vec<Table>,
}

pub fn render(document: &Document, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&document.envelope)?
            } else {
                serde_json::to_string(&document.envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(document, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

fn render_table(document: &Document, out: &mut impl Write) -> Result<(), CliError> {
    let envelope = &document.envelope;
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(out, "source      : {}", envelope.meta.source)?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    if document.tables.is_empty() {
        writeln!(out, "data:")?;
        let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
        for line in pretty_data.lines() {
            writeln!(out, "  {line}")?;
        }
    } else {
        for table in &document.tables {
            writeln!(out)?;
            table.write_to(out)?;
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_the_widest_cell() {
        let mut table = Table::new("Survivors", vec!["#", "TICKER", "SCORE"]);
        table.push(vec!["1".into(), "VERO".into(), "10/10".into()]);
        table.push(vec!["2".into(), "JAGX".into(), "5/10".into()]);

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).expect("write");
        let rendered = String::from_utf8(buffer).expect("utf8");

        assert_eq!(
            rendered,
            "Survivors\n#  TICKER  SCORE\n-  ------  -----\n1  VERO    10/10\n2  JAGX    5/10\n"
        );
    }
}
