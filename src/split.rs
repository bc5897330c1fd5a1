//! Row partitioning: labelled vs unlabelled, and train vs test.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

/// Shuffle `0..n` with a seeded RNG, or an OS-seeded one when `seed` is `None`.
pub fn shuffled_indices(n: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut thread_rng()),
    }
    indices
}

/// Split rows by whether `label` has a value.
///
/// Returns `(labelled, unlabelled)`; row order is preserved in both.
pub fn split_by_label(table: &Table, label: &str) -> Result<(Table, Table)> {
    let column = table.column(label)?;
    let (labelled, unlabelled): (Vec<usize>, Vec<usize>) =
        (0..table.n_rows()).partition(|&row| column.cell_string(row).is_some());

    tracing::info!(
        labelled = labelled.len(),
        unlabelled = unlabelled.len(),
        "split by label presence"
    );
    Ok((table.take(&labelled), table.take(&unlabelled)))
}

/// Label values of a fully labelled table, rendered as strings.
pub fn label_values(table: &Table, label: &str) -> Result<Vec<String>> {
    let column = table.column(label)?;
    (0..table.n_rows())
        .map(|row| {
            column.cell_string(row).ok_or_else(|| {
                PipelineError::MissingValues(format!("label '{}' missing in row {}", label, row))
            })
        })
        .collect()
}

/// Shuffle rows and hold out `ceil(n * test_fraction)` of them for testing.
///
/// Both partitions get at least one row. Returns `(train, test)`.
pub fn train_test_split(
    table: &Table,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(Table, Table)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    let n = table.n_rows();
    if n < 2 {
        return Err(PipelineError::EmptyData(format!(
            "need at least 2 rows to split, got {}",
            n
        )));
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let indices = shuffled_indices(n, seed);
    let (test_idx, train_idx) = indices.split_at(n_test);

    tracing::info!(train = train_idx.len(), test = test_idx.len(), "train/test split");
    Ok((table.take(train_idx), table.take(test_idx)))
}
