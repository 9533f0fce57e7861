//! Small numeric helpers behind the figures: kernel density estimates,
//! box-plot summaries and the random substitution baseline.

use rand::seq::index;
use rand::Rng;

use crate::matrix::SubstitutionMatrix;

/// Gaussian kernel density estimate over one-dimensional samples.
#[derive(Debug, Clone)]
pub struct Kde {
    samples: Vec<f64>,
    pub bandwidth: f64,
}

impl Kde {
    /// Scott's rule bandwidth (`n^-1/5` times the sample standard deviation)
    /// scaled by `adjust`. Needs at least two distinct values.
    pub fn new(samples: &[f64], adjust: f64) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        if var <= 0.0 {
            return None;
        }
        let factor = (n as f64).powf(-0.2) * adjust;
        Some(Self { samples: samples.to_vec(), bandwidth: var.sqrt() * factor })
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / (self.bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let sum: f64 = self
            .samples
            .iter()
            .map(|xi| {
                let z = (x - xi) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum();
        norm * sum / self.samples.len() as f64
    }

    /// Evaluate on `gridsize` evenly spaced points spanning the data plus
    /// `cut` bandwidths on either side.
    pub fn curve(&self, cut: f64, gridsize: usize) -> Vec<(f64, f64)> {
        let pad = cut * self.bandwidth;
        let lo = self.samples.iter().copied().fold(f64::INFINITY, f64::min) - pad;
        let hi = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + pad;
        if gridsize < 2 {
            return vec![(lo, self.density(lo))];
        }
        let step = (hi - lo) / (gridsize - 1) as f64;
        (0..gridsize)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.density(x))
            })
            .collect()
    }
}

/// Linear-interpolated percentile of sorted data, `p` in `[0, 1]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Quartiles and Tukey whiskers (most extreme data within 1.5 IQR).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    pub fn new(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);
        Some(Self { lower_whisker, q1, median, q3, upper_whisker })
    }
}

/// Score `n` random substitutions: each draws two distinct symbols of the
/// matrix alphabet uniformly.
pub fn random_pair_scores<R: Rng + ?Sized>(
    matrix: &SubstitutionMatrix,
    n: usize,
    rng: &mut R,
) -> Vec<i32> {
    let dim = matrix.alphabet().len();
    (0..n)
        .map(|_| {
            let pair = index::sample(rng, dim, 2);
            matrix.score_index(pair.index(0), pair.index(1))
        })
        .collect()
}
