//! One-dimensional Gaussian kernel density estimation.
//!
//! Bandwidth follows Scott's rule, `h² = σ² · n_eff^(-2/5)`, where `σ²` is the
//! (weighted) unbiased sample variance and `n_eff = 1 / Σwᵢ²` for normalized
//! weights. With uniform weights this is the textbook estimator with
//! `n_eff = n`.

use crate::error::{Result, StatsError};
use std::f64::consts::PI;

/// A fitted Gaussian KDE.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    points: Vec<f64>,
    weights: Vec<f64>,
    variance: f64,
}

impl GaussianKde {
    /// Fit with uniform weights.
    pub fn fit(points: &[f64]) -> Result<Self> {
        let weight = 1.0 / points.len().max(1) as f64;
        Self::fit_weighted(points, &vec![weight; points.len()])
    }

    /// Fit with per-point weights. Weights need not sum to one.
    pub fn fit_weighted(points: &[f64], weights: &[f64]) -> Result<Self> {
        if points.len() < 2 {
            return Err(StatsError::DensityEstimation(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        if points.len() != weights.len() {
            return Err(StatsError::Internal(format!(
                "{} points but {} weights",
                points.len(),
                weights.len()
            )));
        }

        let total: f64 = weights.iter().sum();
        if !(total > 0.0) || weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(StatsError::DensityEstimation(
                "weights must be non-negative with a positive sum".to_string(),
            ));
        }
        let weights: Vec<f64> = weights.iter().map(|w| w / total).collect();

        let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
        let neff = 1.0 / sum_sq;
        let mean: f64 = points.iter().zip(&weights).map(|(x, w)| w * x).sum();
        let spread: f64 = points
            .iter()
            .zip(&weights)
            .map(|(x, w)| w * (x - mean).powi(2))
            .sum();
        let correction = 1.0 - sum_sq;
        if correction <= 0.0 {
            return Err(StatsError::DensityEstimation(
                "all weight on a single point".to_string(),
            ));
        }

        let data_variance = spread / correction;
        if !(data_variance > 0.0) || !data_variance.is_finite() {
            return Err(StatsError::DensityEstimation(
                "degenerate data variance".to_string(),
            ));
        }

        let factor = neff.powf(-1.0 / 5.0);
        Ok(Self {
            points: points.to_vec(),
            weights,
            variance: data_variance * factor * factor,
        })
    }

    /// Kernel variance (squared bandwidth).
    pub fn bandwidth_squared(&self) -> f64 {
        self.variance
    }

    /// Density at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let norm = (2.0 * PI * self.variance).sqrt();
        self.points
            .iter()
            .zip(&self.weights)
            .map(|(p, w)| w * (-(x - p).powi(2) / (2.0 * self.variance)).exp())
            .sum::<f64>()
            / norm
    }

    pub fn evaluate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.evaluate(*x)).collect()
    }
}

/// `count` evenly spaced points from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut grid: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            grid[count - 1] = stop;
            grid
        }
    }
}

/// A density evaluated on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub grid: Vec<f64>,
    pub density: Vec<f64>,
    /// Grid spacing.
    pub by: f64,
}

/// Fit a KDE and evaluate it on `points` grid points spanning `[min, max]`.
pub fn estimate(
    values: &[f64],
    weights: Option<&[f64]>,
    min: f64,
    max: f64,
    points: usize,
) -> Result<DensityGrid> {
    if points < 2 {
        return Err(StatsError::DensityEstimation(format!(
            "need at least 2 grid points, got {points}"
        )));
    }

    let kde = match weights {
        Some(weights) => GaussianKde::fit_weighted(values, weights)?,
        None => GaussianKde::fit(values)?,
    };
    let grid = linspace(min, max, points);
    let by = grid[1] - grid[0];
    let density = kde.evaluate_all(&grid);

    Ok(DensityGrid { grid, density, by })
}
