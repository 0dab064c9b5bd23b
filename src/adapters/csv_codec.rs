//! CSV codec for input and output rows.
//!
//! Cells are read as text and written back untouched, so values such as
//! zero-padded postal codes survive a run unchanged.

use crate::domain::model::{FieldValue, InputTable, Record};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, WriterBuilder};

/// Parses CSV bytes whose first row holds the column names. Blank lines are
/// skipped; a row of empty cells is still a record.
pub fn parse_records(data: &[u8]) -> Result<InputTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    for (idx, column) in columns.iter().enumerate() {
        if columns[..idx].contains(column) {
            return Err(EtlError::DuplicateColumn {
                column: column.clone(),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = columns
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), FieldValue::text(row.get(idx).unwrap_or(""))))
            .collect();
        records.push(record);
    }

    tracing::info!("Parsed {} records", records.len());
    Ok(InputTable { columns, records })
}

/// Fails on the first required column missing from the input header.
pub fn require_columns(columns: &[String], required: &[String]) -> Result<()> {
    match required.iter().find(|column| !columns.contains(column)) {
        Some(column) => Err(EtlError::MissingColumn {
            column: column.clone(),
        }),
        None => Ok(()),
    }
}

/// Output header: the configured list when present, otherwise `base`
/// followed by any other column seen across the records in first-seen order.
pub fn output_columns(
    records: &[Record],
    configured: Option<&[String]>,
    base: &[String],
) -> Vec<String> {
    if let Some(columns) = configured {
        return columns.to_vec();
    }

    let mut columns: Vec<String> = Vec::with_capacity(base.len());
    let seen = base
        .iter()
        .map(String::as_str)
        .chain(records.iter().flat_map(Record::columns));
    for column in seen {
        if !columns.iter().any(|c| c == column) {
            columns.push(column.to_string());
        }
    }
    columns
}

/// Writes the header row followed by one row per record. Columns a record
/// lacks are left blank.
pub fn write_records(records: &[Record], columns: &[String]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(columns)?;
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|column| record.get(column).map(FieldValue::render).unwrap_or_default()),
        )?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}
