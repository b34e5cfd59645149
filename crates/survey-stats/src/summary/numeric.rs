//! Density and missing-code summary of a numeric variable.

use super::density;
use crate::missing::canonical_value;
use crate::types::{NumericDistribution, NumericFrequencies, NumericMissings, NumericRange};
use crate::weighted::{WeightColumn, bucket_weights, weighted_points};
use tracing::debug;

/// Inputs shared by every numeric summary of one run.
#[derive(Debug, Clone, Copy)]
pub struct NumericOptions<'a> {
    pub density_points: usize,
    pub weights: Option<&'a WeightColumn>,
    /// Name of the variable being summarized. The weight variable does not
    /// weight its own missing codes.
    pub variable: &'a str,
}

pub fn summarize(values: &[Option<f64>], options: &NumericOptions<'_>) -> NumericFrequencies {
    let canonical: Vec<Option<f64>> = values.iter().map(|v| v.map(canonical_value)).collect();

    let mut valid: Vec<f64> = canonical.iter().flatten().copied().filter(|v| *v >= 0.0).collect();
    valid.sort_by(f64::total_cmp);

    let bounds = valid.first().zip(valid.last()).map(|(min, max)| (*min, *max));
    let (density, by) = match bounds {
        Some((min, max)) => evaluate(&valid, None, min, max, options),
        None => (Vec::new(), 0.0),
    };

    let weighted = options.weights.map(|weights| match bounds {
        Some((min, max)) => {
            let (points, point_weights) = weighted_points(&canonical, weights, |v| v >= 0.0);
            evaluate(&points, Some(point_weights.as_slice()), min, max, options).0
        }
        None => Vec::new(),
    });

    let total = values.len();
    let nulls = values.iter().filter(|v| v.is_none()).count();
    let missings = missing_codes(&canonical, options);

    NumericFrequencies {
        range: NumericRange {
            min: bounds.map(|(min, _)| min),
            max: bounds.map(|(_, max)| max),
            by,
        },
        distribution: NumericDistribution {
            density,
            weighted,
            total,
            valid: total - nulls,
            missing: vec![missings.frequencies.iter().sum::<u64>()],
            missings,
        },
    }
}

fn evaluate(
    points: &[f64],
    weights: Option<&[f64]>,
    min: f64,
    max: f64,
    options: &NumericOptions<'_>,
) -> (Vec<f64>, f64) {
    match density::estimate(points, weights, min, max, options.density_points) {
        Ok(grid) => (grid.density, grid.by),
        Err(e) => {
            debug!("{}: no density ({})", options.variable, e);
            (Vec::new(), 0.0)
        }
    }
}

/// Distinct negative codes in order of first appearance, with row counts.
fn missing_codes(canonical: &[Option<f64>], options: &NumericOptions<'_>) -> NumericMissings {
    let mut codes: Vec<f64> = Vec::new();
    let mut frequencies: Vec<u64> = Vec::new();
    for code in canonical.iter().flatten().filter(|v| **v < 0.0) {
        match codes.iter().position(|c| c == code) {
            Some(i) => frequencies[i] += 1,
            None => {
                codes.push(*code);
                frequencies.push(1);
            }
        }
    }

    let weighted = options
        .weights
        .filter(|weights| weights.name() != options.variable)
        .map(|weights| bucket_weights(canonical, &codes, weights));

    NumericMissings {
        frequencies,
        labels: Vec::new(),
        values: codes,
        weighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(variable: &str) -> NumericOptions<'_> {
        NumericOptions {
            density_points: 20,
            weights: None,
            variable,
        }
    }

    #[test]
    fn test_range_and_counts() {
        let values = [Some(5.0), Some(-1.0), Some(10.0), Some(15.0), Some(-2.0), Some(10.0), Some(-1.0)];
        let result = summarize(&values, &options("x"));

        assert_eq!(result.range.min, Some(5.0));
        assert_eq!(result.range.max, Some(15.0));
        assert!((result.range.by - 10.0 / 19.0).abs() < 1e-12);
        assert_eq!(result.distribution.density.len(), 20);
        assert_eq!(result.distribution.total, 7);
        assert_eq!(result.distribution.valid, 7);
        assert_eq!(result.distribution.missing, vec![3]);
        assert_eq!(result.distribution.missings.frequencies, vec![2, 1]);
        assert_eq!(result.distribution.missings.values, vec![-1.0, -2.0]);
        assert!(result.distribution.missings.labels.is_empty());
        assert_eq!(result.distribution.weighted, None);
    }

    #[test]
    fn test_valid_excludes_only_nulls() {
        let values = [Some(1.0), None, Some(-3.0), None, Some(2.0)];
        let result = summarize(&values, &options("x"));
        assert_eq!(result.distribution.total, 5);
        assert_eq!(result.distribution.valid, 3);
    }

    #[test]
    fn test_no_valid_values() {
        let values = [Some(-1.0), None];
        let result = summarize(&values, &options("x"));
        assert_eq!(result.range.min, None);
        assert_eq!(result.range.max, None);
        assert_eq!(result.range.by, 0.0);
        assert!(result.distribution.density.is_empty());
    }

    #[test]
    fn test_constant_values_degrade_density() {
        let values = [Some(4.0), Some(4.0), Some(4.0)];
        let result = summarize(&values, &options("x"));
        assert_eq!(result.range.min, Some(4.0));
        assert!(result.distribution.density.is_empty());
        assert_eq!(result.range.by, 0.0);
    }

    #[test]
    fn test_sentinels_become_missing_codes() {
        let values = [Some(4_294_967_295.0), Some(1.0), Some(2.0), Some(4_294_967_295.0)];
        let result = summarize(&values, &options("x"));
        assert_eq!(result.distribution.missings.values, vec![-1.0]);
        assert_eq!(result.distribution.missings.frequencies, vec![2]);
        assert_eq!(result.range.max, Some(2.0));
    }

    #[test]
    fn test_large_values_keep_their_magnitude() {
        let values = [Some(1.0), Some(1e20)];
        let result = summarize(&values, &options("x"));
        assert_eq!(result.range.max, Some(1e20));
        assert!(result.distribution.missings.values.is_empty());
    }

    #[test]
    fn test_weighted_outputs() {
        let weights = WeightColumn::new("w", vec![Some(1.0), Some(2.0), Some(1.0), Some(0.5)]);
        let values = [Some(1.0), Some(3.0), Some(-1.0), Some(6.0)];
        let opts = NumericOptions {
            density_points: 10,
            weights: Some(&weights),
            variable: "x",
        };
        let result = summarize(&values, &opts);

        let weighted = result.distribution.weighted.unwrap();
        assert_eq!(weighted.len(), 10);
        assert_ne!(weighted, result.distribution.density);
        assert_eq!(result.distribution.missings.weighted, Some(vec![1.0]));
    }

    #[test]
    fn test_weight_variable_skips_own_missing_weights() {
        let weights = WeightColumn::new("w", vec![Some(1.0), Some(-1.0), Some(2.0)]);
        let values = [Some(1.0), Some(-1.0), Some(2.0)];
        let opts = NumericOptions {
            density_points: 20,
            weights: Some(&weights),
            variable: "w",
        };
        let result = summarize(&values, &opts);
        assert_eq!(result.distribution.missings.weighted, None);
        assert_eq!(result.distribution.missings.frequencies, vec![1]);
    }
}
