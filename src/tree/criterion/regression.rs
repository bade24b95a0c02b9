//! Criteria for numeric labels. Parts hold the moments `[w, w·y, w·y²]`.

use crate::tree::criterion::{total_of, Criterion};

fn squared_error(part: &[f64]) -> f64 {
    let weight = part[0];
    if weight <= 0.0 {
        return 0.0;
    }
    (part[2] - part[1] * part[1] / weight).max(0.0)
}

/// Reduction of the weighted squared error, per unit of weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

impl Criterion for LeastSquares {
    fn name(&self) -> &'static str {
        "least_squares"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        let total = total_of(parts);
        if total.len() < 3 || total[0] <= 0.0 {
            return 0.0;
        }
        let remaining: f64 = parts.iter().map(|part| squared_error(part)).sum();
        (squared_error(&total) - remaining) / total[0]
    }
}
