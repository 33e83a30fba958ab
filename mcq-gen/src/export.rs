//! Serializing the MCQ table to downloadable formats.

use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::{McqError, Result};
use crate::table::{COLUMNS, McqRow};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Txt,
}

impl FromStr for ExportFormat {
    type Err = McqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(McqError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// File extension used for default output names
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }
}

/// Write `rows` to `writer` in the given format.
pub fn write_rows<W: Write>(rows: &[McqRow], format: ExportFormat, writer: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(rows, writer),
        ExportFormat::Json => write_json(rows, writer),
        ExportFormat::Txt => write_table(rows, writer),
    }
}

/// Read rows back from a JSON records array, as produced by the JSON export.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<McqRow>> {
    Ok(serde_json::from_reader(reader)?)
}

fn write_csv<W: Write>(rows: &[McqRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.write_record(row.cells())?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json<W: Write>(rows: &[McqRow], mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

/// Fixed-width text table, one line per row under a header line.
fn write_table<W: Write>(rows: &[McqRow], mut writer: W) -> Result<()> {
    let cells: Vec<[String; 6]> = rows.iter().map(McqRow::cells).collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(&mut writer, &COLUMNS, &widths)?;
    for row in &cells {
        write_table_line(&mut writer, row, &widths)?;
    }
    Ok(())
}

fn write_table_line<W: Write, S: AsRef<str>>(
    writer: &mut W,
    cells: &[S],
    widths: &[usize],
) -> Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<McqRow> {
        vec![
            McqRow {
                question: "What is the capital of France?".into(),
                options: vec![
                    "A) Berlin".into(),
                    "B) Madrid".into(),
                    "C) Paris".into(),
                    "D) Rome".into(),
                ],
                correct_answer: "C) Paris".into(),
                source: "https://example.com/france".into(),
                topic: "Geography".into(),
                difficulty: "Easy".into(),
            },
            McqRow {
                question: "Which is larger, \"a\" or b?".into(),
                options: vec!["a".into(), "b".into(), "c, d".into(), "e".into()],
                correct_answer: "b".into(),
                source: "https://example.com/france".into(),
                topic: "Geography".into(),
                difficulty: "Easy".into(),
            },
        ]
    }

    fn export(format: ExportFormat) -> String {
        let mut out = Vec::new();
        write_rows(&rows(), format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
    }

    #[test]
    fn test_unknown_format_is_client_error() {
        let err = "xlsx".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, McqError::UnsupportedExportFormat(ref f) if f == "xlsx"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_csv_header_and_row_count() {
        let output = export(ExportFormat::Csv);
        let mut reader = csv::Reader::from_reader(output.as_bytes());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["Question", "Options", "Correct Answer", "Source", "Topic", "Difficulty"]
        );
        assert_eq!(
            output.lines().next(),
            Some("Question,Options,Correct Answer,Source,Topic,Difficulty")
        );

        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "A) Berlin | B) Madrid | C) Paris | D) Rome");
        assert_eq!(&records[1][0], "Which is larger, \"a\" or b?");
    }

    #[test]
    fn test_json_round_trips_through_read_rows() {
        let json = export(ExportFormat::Json);
        let parsed = read_rows(json.as_bytes()).unwrap();
        assert_eq!(parsed, rows());
    }

    #[test]
    fn test_read_rows_rejects_garbage() {
        let err = read_rows("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, McqError::InvalidData(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_txt_is_aligned() {
        let txt = export(ExportFormat::Txt);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Question"));

        let options_col = lines[0].find("Options").unwrap();
        assert_eq!(lines[1].find("A) Berlin"), Some(options_col));
        assert_eq!(lines[2].find("a | b"), Some(options_col));
    }

    #[test]
    fn test_empty_csv_has_only_header() {
        let mut out = Vec::new();
        write_rows(&[], ExportFormat::Csv, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Question,Options,Correct Answer,Source,Topic,Difficulty\n"
        );
    }
}
