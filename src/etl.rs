//! Raw CSV cleanup before storage.

use crate::config::{EtlConfig, ValueReplacement};
use crate::error::Result;
use crate::table::Table;

/// What a [`Cleaner`] run changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Columns that were present and removed.
    pub dropped: Vec<String>,
    /// Number of cells rewritten by value replacements.
    pub replaced: usize,
}

/// Drops bookkeeping columns and normalises known bad values.
///
/// Cleaning is idempotent: absent columns are skipped, and replacements on
/// already-clean data change nothing.
#[derive(Clone, Debug, Default)]
pub struct Cleaner {
    config: EtlConfig,
}

impl Cleaner {
    pub fn new(config: EtlConfig) -> Self {
        Self { config }
    }

    /// Clean `table` in place.
    pub fn clean(&self, table: &mut Table) -> Result<CleanSummary> {
        let dropped = table.drop_columns_if_present(&self.config.drop_columns);

        let mut replaced = 0;
        for ValueReplacement { column, from, to } in &self.config.replacements {
            if !table.has_column(column) {
                tracing::warn!(column = %column, "replacement column not present, skipping");
                continue;
            }
            replaced += table.replace_value(column, from, to)?;
        }

        tracing::info!(
            dropped = ?dropped,
            replaced,
            rows = table.n_rows(),
            columns = table.n_columns(),
            "table cleaned"
        );
        Ok(CleanSummary { dropped, replaced })
    }
}
