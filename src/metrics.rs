//! Classification metrics.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fraction of predictions equal to the truth. Empty input scores 0.
pub fn accuracy<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Precision, recall and F1 for one class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of true instances of the class.
    pub support: usize,
}

/// Averaged metrics over all classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class and averaged classification metrics.
///
/// `Display` renders the familiar text table:
///
/// ```text
///               precision    recall  f1-score   support
///
///            A       1.00      0.50      0.67         2
///            B       0.67      1.00      0.80         2
///
///     accuracy                           0.75         4
///    macro avg       0.83      0.75      0.73         4
/// weighted avg       0.83      0.75      0.73         4
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn support_weighted(classes: &[ClassMetrics], metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
    let total: usize = classes.iter().map(|c| c.support).sum();
    let sum: f64 = classes.iter().map(|c| metric(c) * c.support as f64).sum();
    ratio_f(sum, total)
}

fn ratio_f(sum: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        sum / total as f64
    }
}

impl ClassificationReport {
    /// Build the report; labels are the sorted union of true and predicted values.
    pub fn new(y_true: &[String], y_pred: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::InvalidShape {
                expected: format!("{} predictions", y_true.len()),
                got: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot build a classification report without samples".to_string(),
            ));
        }

        let labels: BTreeSet<&String> = y_true.iter().chain(y_pred).collect();
        let mut classes = Vec::with_capacity(labels.len());

        for label in labels {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (t, p) in y_true.iter().zip(y_pred) {
                match (t == label, p == label) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1_score = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            classes.push(ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1_score,
                support: tp + fn_,
            });
        }

        let total = y_true.len();
        let n = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n,
            support: total,
        };
        let weighted_avg = AverageMetrics {
            precision: support_weighted(&classes, |c| c.precision),
            recall: support_weighted(&classes, |c| c.recall),
            f1_score: support_weighted(&classes, |c| c.f1_score),
            support: total,
        };

        Ok(Self {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
        })
    }

    /// Metrics for one class, if it occurred.
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once(WEIGHTED.len()))
            .max()
            .unwrap_or(WEIGHTED.len());

        write!(f, "{:>w$} ", "", w = width)?;
        for header in ["precision", "recall", "f1-score", "support"] {
            write!(f, " {:>9}", header)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for c in &self.classes {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label,
                c.precision,
                c.recall,
                c.f1_score,
                c.support,
                w = width
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            w = width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), (WEIGHTED, &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1_score,
                avg.support,
                w = width
            )?;
        }
        Ok(())
    }
}
