//! CSV loading and writing for [`Table`].
//!
//! Column types are inferred: a column whose every present cell parses as
//! `f64` becomes numeric, anything else is categorical. Empty cells and the
//! usual NA markers (`NA`, `N/A`, `NaN`, `null`, ...) are missing values.

use super::{Column, ColumnData, Table};
use crate::error::Result;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Cell contents read as a missing value, after trimming.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell.trim())
}

/// Load a CSV file with a header row.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    let table = read_csv_from_reader(BufReader::new(file))?;
    tracing::debug!(
        path = %path.as_ref().display(),
        rows = table.n_rows(),
        columns = table.n_columns(),
        "loaded csv"
    );
    Ok(table)
}

/// Load CSV data with a header row from any reader.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (col, cell) in record.iter().enumerate() {
            raw[col].push(if is_missing(cell) {
                None
            } else {
                Some(cell.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Table::from_columns(columns)
}

fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let all_numeric = cells
        .iter()
        .flatten()
        .all(|cell| cell.trim().parse::<f64>().is_ok());

    if all_numeric {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|cell| cell.as_ref().and_then(|c| c.trim().parse::<f64>().ok()))
                .collect(),
        )
    } else {
        ColumnData::Categorical(cells)
    }
}

/// Write a table as CSV with a header row; missing cells are left empty.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    wtr.write_record(table.column_names())?;

    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.cell_string(row).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
