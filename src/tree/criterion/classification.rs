//! Criteria for nominal labels. Parts hold the weight of each class.

use crate::core::constants::EQUALITY_EPSILON;
use crate::tree::criterion::{part_weight, total_of, Criterion};

fn entropy(part: &[f64]) -> f64 {
    let weight = part_weight(part);
    if weight <= 0.0 {
        return 0.0;
    }
    part.iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| {
            let p = w / weight;
            -p * p.log2()
        })
        .sum()
}

fn gini(part: &[f64]) -> f64 {
    let weight = part_weight(part);
    if weight <= 0.0 {
        return 0.0;
    }
    1.0 - part
        .iter()
        .map(|&w| {
            let p = w / weight;
            p * p
        })
        .sum::<f64>()
}

/// Impurity of the whole minus the weighted impurity of the parts.
fn impurity_decrease(parts: &[&[f64]], impurity: fn(&[f64]) -> f64) -> f64 {
    let total = total_of(parts);
    let total_weight = part_weight(&total);
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = parts
        .iter()
        .map(|part| part_weight(part) / total_weight * impurity(part))
        .sum();
    impurity(&total) - weighted
}

/// Decrease in label entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct InformationGain;

impl Criterion for InformationGain {
    fn name(&self) -> &'static str {
        "information_gain"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        impurity_decrease(parts, entropy)
    }
}

/// Information gain divided by the entropy of the part sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainRatio;

impl Criterion for GainRatio {
    fn name(&self) -> &'static str {
        "gain_ratio"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        let gain = impurity_decrease(parts, entropy);
        let sizes: Vec<f64> = parts.iter().map(|part| part_weight(part)).collect();
        let split_info = entropy(&sizes);
        if split_info < EQUALITY_EPSILON {
            return 0.0;
        }
        gain / split_info
    }
}

/// Decrease in Gini impurity.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiniIndex;

impl Criterion for GiniIndex {
    fn name(&self) -> &'static str {
        "gini_index"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        impurity_decrease(parts, gini)
    }
}

/// Increase in majority-vote accuracy over predicting the overall majority.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Criterion for Accuracy {
    fn name(&self) -> &'static str {
        "accuracy"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        let total = total_of(parts);
        let total_weight = part_weight(&total);
        if total_weight <= 0.0 {
            return 0.0;
        }
        let majority = |part: &[f64]| part.iter().copied().fold(0.0, f64::max);
        let correct: f64 = parts.iter().map(|part| majority(*part)).sum();
        (correct - majority(&total)) / total_weight
    }
}

/// Pearson's chi-square statistic of the part/class contingency table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiSquare;

impl Criterion for ChiSquare {
    fn name(&self) -> &'static str {
        "chi_square"
    }

    fn partition_benefit(&self, parts: &[&[f64]]) -> f64 {
        let total = total_of(parts);
        let total_weight = part_weight(&total);
        if total_weight <= 0.0 {
            return 0.0;
        }
        let mut statistic = 0.0;
        for part in parts {
            let weight = part_weight(part);
            for (&observed, &class_total) in part.iter().zip(total.iter()) {
                let expected = weight * class_total / total_weight;
                if expected > 0.0 {
                    statistic += (observed - expected).powi(2) / expected;
                }
            }
        }
        statistic
    }
}
