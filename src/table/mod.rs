//! Columnar in-memory table.
//!
//! A [`Table`] is an ordered list of named, typed [`Column`]s that all have the
//! same number of rows. Numeric cells are `Option<f64>` and categorical cells
//! are `Option<String>`; `None` marks a missing value in both cases.
//!
//! # Example
//!
//! ```rust
//! use emissions_classifier::table::{Column, Table};
//!
//! let table = Table::from_columns(vec![
//!     Column::numeric("co2", vec![Some(120.0), None]),
//!     Column::categorical("fuel_type", vec![Some("Petrol".into()), Some("Diesel".into())]),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.shape(), (2, 2));
//! assert!(table.has_column("co2"));
//! ```

pub mod csv;

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cell storage of a single column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// Floating point values.
    Numeric(Vec<Option<f64>>),
    /// String category values.
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether no cell holds a value. Such a column carries no type information.
    pub fn is_all_missing(&self) -> bool {
        match self {
            ColumnData::Numeric(v) => v.iter().all(Option::is_none),
            ColumnData::Categorical(v) => v.iter().all(Option::is_none),
        }
    }

    /// Human readable type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Categorical(_) => "categorical",
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// A named column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Create a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    /// Create a categorical column.
    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Categorical(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Cell rendered as a string; numeric cells use their shortest decimal form.
    pub fn cell_string(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v[row].map(|x| x.to_string()),
            ColumnData::Categorical(v) => v[row].clone(),
        }
    }

    fn type_error(&self, expected: &'static str) -> PipelineError {
        PipelineError::ColumnType {
            column: self.name.clone(),
            expected,
            got: self.data.kind(),
        }
    }
}

/// Ordered collection of equally long columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, checking that column lengths agree and names are unique.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        match self.position(name) {
            Some(i) => Ok(&mut self.columns[i]),
            None => Err(PipelineError::MissingColumn(name.to_string())),
        }
    }

    /// Numeric cells of a column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Categorical(_) => Err(column.type_error("numeric")),
        }
    }

    pub fn numeric_mut(&mut self, name: &str) -> Result<&mut Vec<Option<f64>>> {
        let column = self.column_mut(name)?;
        if !column.is_numeric() {
            return Err(column.type_error("numeric"));
        }
        match &mut column.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Categorical(_) => unreachable!("checked above"),
        }
    }

    /// Categorical cells of a column.
    pub fn categorical(&self, name: &str) -> Result<&[Option<String>]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Categorical(v) => Ok(v),
            ColumnData::Numeric(_) => Err(column.type_error("categorical")),
        }
    }

    pub fn categorical_mut(&mut self, name: &str) -> Result<&mut Vec<Option<String>>> {
        let column = self.column_mut(name)?;
        if column.is_numeric() {
            return Err(column.type_error("categorical"));
        }
        match &mut column.data {
            ColumnData::Categorical(v) => Ok(v),
            ColumnData::Numeric(_) => unreachable!("checked above"),
        }
    }

    /// Retype an all-missing categorical column as numeric. Columns holding a
    /// value are left alone.
    pub fn numeric_if_all_missing(&mut self, name: &str) -> Result<()> {
        let column = self.column_mut(name)?;
        if !column.is_numeric() && column.data.is_all_missing() {
            column.data = ColumnData::Numeric(vec![None; column.len()]);
        }
        Ok(())
    }

    /// Retype an all-missing numeric column as categorical. Columns holding a
    /// value are left alone.
    pub fn categorical_if_all_missing(&mut self, name: &str) -> Result<()> {
        let column = self.column_mut(name)?;
        if column.is_numeric() && column.data.is_all_missing() {
            column.data = ColumnData::Categorical(vec![None; column.len()]);
        }
        Ok(())
    }

    /// Append a column at the end of the schema.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(column.name()) {
            return Err(PipelineError::InvalidShape {
                expected: "unique column names".to_string(),
                got: format!("duplicate column '{}'", column.name()),
            });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PipelineError::InvalidShape {
                expected: format!("{} rows", self.n_rows),
                got: format!("{} rows in column '{}'", column.len(), column.name()),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove and return a column.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
        Ok(self.columns.remove(idx))
    }

    /// Drop every listed column; fails without modifying the table if any is absent.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if let Some(missing) = names.iter().find(|n| !self.has_column(n.as_ref())) {
            return Err(PipelineError::MissingColumn(missing.as_ref().to_string()));
        }
        let drop: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        self.columns.retain(|c| !drop.contains(c.name.as_str()));
        Ok(())
    }

    /// Drop the listed columns that exist and return the names actually removed.
    pub fn drop_columns_if_present<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let drop: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let mut removed = Vec::new();
        self.columns.retain(|c| {
            let hit = drop.contains(c.name.as_str());
            if hit {
                removed.push(c.name.clone());
            }
            !hit
        });
        removed
    }

    /// New table with the named columns in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name.as_ref())?.clone());
        }
        let mut table = Table::from_columns(columns)?;
        table.n_rows = self.n_rows;
        Ok(table)
    }

    /// New table with the given rows, in the given order.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
                .collect(),
            n_rows: indices.len(),
        }
    }

    /// Names of all categorical columns, in schema order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_numeric())
            .map(|c| c.name())
            .collect()
    }

    /// Replace every occurrence of `from` with `to` in a categorical column.
    ///
    /// Returns the number of cells changed.
    pub fn replace_value(&mut self, column: &str, from: &str, to: &str) -> Result<usize> {
        let values = self.categorical_mut(column)?;
        let mut changed = 0;
        for value in values.iter_mut().flatten() {
            if value == from {
                *value = to.to_string();
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Dense row-major feature matrix.
    ///
    /// Every column must be numeric and fully populated.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let (rows, cols) = self.shape();
        let mut matrix = Array2::<f64>::zeros((rows, cols));
        for (j, column) in self.columns.iter().enumerate() {
            let values = match &column.data {
                ColumnData::Numeric(v) => v,
                ColumnData::Categorical(_) => return Err(column.type_error("numeric")),
            };
            for (i, value) in values.iter().enumerate() {
                matrix[[i, j]] = value.ok_or_else(|| {
                    PipelineError::MissingValues(format!(
                        "column '{}' row {} has no value",
                        column.name, i
                    ))
                })?;
            }
        }
        Ok(matrix)
    }
}
