//! Descriptive statistics over one numeric field of a snapshot.

use super::snapshot::{ensure_numeric_field, Snapshot};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sum, mean, median, max and min of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

impl Statistics {
    /// Metric name/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("sum", self.sum),
            ("mean", self.mean),
            ("median", self.median),
            ("max", self.max),
            ("min", self.min),
        ]
    }
}

/// Compute [`Statistics`] for `field` across every record in `snapshot`.
///
/// Fails with [`Error::EmptySnapshot`] when there are no records, so callers
/// never see a zero or NaN standing in for "no data".
pub fn calculate_statistics(snapshot: &Snapshot, field: &str) -> Result<Statistics> {
    ensure_numeric_field(field)?;

    let values = snapshot
        .records()
        .iter()
        .map(|record| record.numeric_field(field))
        .collect::<Result<Vec<f64>>>()?;

    if values.is_empty() {
        return Err(Error::EmptySnapshot);
    }

    let sum: f64 = values.iter().sum();
    let mean = sum / values.len() as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    tracing::debug!(field, count = values.len(), sum, "Computed statistics");

    Ok(Statistics {
        sum,
        mean,
        median: median(values),
        max,
        min,
    })
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::snapshot::StudentSnapshot;

    fn snapshot_with_hours(hours: &[i64]) -> Snapshot {
        Snapshot::new(
            hours
                .iter()
                .enumerate()
                .map(|(i, &missed_hours)| StudentSnapshot {
                    id: i as i64 + 1,
                    name: format!("Student {}", i + 1),
                    age: 18 + i as i64,
                    grades: vec![],
                    email: None,
                    major: "Physics".to_string(),
                    year: 1,
                    missed_hours,
                })
                .collect(),
        )
    }

    #[test]
    fn test_statistics_odd_count() {
        let stats = calculate_statistics(&snapshot_with_hours(&[5, 10, 15]), "missed_hours")
            .unwrap();
        assert_eq!(
            stats,
            Statistics {
                sum: 30.0,
                mean: 10.0,
                median: 10.0,
                max: 15.0,
                min: 5.0,
            }
        );
    }

    #[test]
    fn test_statistics_even_count_uses_middle_pair() {
        let stats =
            calculate_statistics(&snapshot_with_hours(&[40, 10, 30, 20]), "missed_hours").unwrap();
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
    }

    #[test]
    fn test_statistics_invariants_hold() {
        let samples: [&[i64]; 4] = [&[0], &[3, 3, 3], &[1, 100, 7, 7, 2], &[90, 10]];
        for hours in samples {
            let snapshot = snapshot_with_hours(hours);
            let stats = calculate_statistics(&snapshot, "missed_hours").unwrap();
            let count = snapshot.len() as f64;
            assert!((stats.sum - stats.mean * count).abs() < 1e-9);
            assert!(stats.min <= stats.median && stats.median <= stats.max);
        }
    }

    #[test]
    fn test_statistics_on_other_numeric_field() {
        let stats = calculate_statistics(&snapshot_with_hours(&[1, 2]), "age").unwrap();
        assert_eq!(stats.sum, 37.0);
        assert_eq!(stats.mean, 18.5);
    }

    #[test]
    fn test_empty_snapshot_fails() {
        let err = calculate_statistics(&Snapshot::default(), "missed_hours").unwrap_err();
        assert!(matches!(err, Error::EmptySnapshot));
    }

    #[test]
    fn test_unknown_field_is_named() {
        let err = calculate_statistics(&snapshot_with_hours(&[1]), "attendance").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound(ref f) if f == "attendance"));
        assert!(err.to_string().contains("attendance"));
    }

    #[test]
    fn test_field_checked_before_emptiness() {
        let err = calculate_statistics(&Snapshot::default(), "gpa").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound(_)));
    }

    #[test]
    fn test_text_field_is_rejected() {
        let err = calculate_statistics(&snapshot_with_hours(&[1]), "name").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
