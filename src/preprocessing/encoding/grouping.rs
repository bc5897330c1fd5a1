//! Rare category grouping.

use crate::error::Result;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Replaces listed rare values of a column with a shared label.
///
/// Stateless: the rare lists are configuration, nothing is learned from data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RareCategoryGrouper {
    rare: BTreeMap<String, Vec<String>>,
    other_label: String,
}

impl RareCategoryGrouper {
    pub fn new(rare: BTreeMap<String, Vec<String>>, other_label: impl Into<String>) -> Self {
        Self {
            rare,
            other_label: other_label.into(),
        }
    }

    /// Fold rare values in place and return the number of cells changed.
    ///
    /// Every column with a rare list must exist and be categorical.
    pub fn apply(&self, table: &mut Table) -> Result<usize> {
        let mut changed = 0;
        for (column, values) in &self.rare {
            let rare: HashSet<&str> = values.iter().map(String::as_str).collect();
            for cell in table.categorical_mut(column)?.iter_mut().flatten() {
                if rare.contains(cell.as_str()) {
                    *cell = self.other_label.clone();
                    changed += 1;
                }
            }
        }
        tracing::debug!(changed, "rare categories grouped");
        Ok(changed)
    }

    /// Grouped copy of `table`.
    pub fn transform(&self, table: &Table) -> Result<Table> {
        let mut output = table.clone();
        self.apply(&mut output)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::table::Column;

    fn grouper() -> RareCategoryGrouper {
        let mut rare = BTreeMap::new();
        rare.insert(
            "manufacturer".to_string(),
            vec!["Lotus".to_string(), "Proton".to_string()],
        );
        RareCategoryGrouper::new(rare, "Other")
    }

    #[test]
    fn test_rare_values_folded() {
        let table = Table::from_columns(vec![Column::categorical(
            "manufacturer",
            vec![
                Some("Ford".into()),
                Some("Lotus".into()),
                None,
                Some("Proton".into()),
            ],
        )])
        .unwrap();

        let mut grouped = table.clone();
        let changed = grouper().apply(&mut grouped).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(
            grouped.categorical("manufacturer").unwrap(),
            &[
                Some("Ford".to_string()),
                Some("Other".to_string()),
                None,
                Some("Other".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_grouped_column_is_an_error() {
        let table =
            Table::from_columns(vec![Column::categorical("fuel_type", vec![None])]).unwrap();
        assert!(matches!(
            grouper().transform(&table),
            Err(PipelineError::MissingColumn(_))
        ));
    }
}
