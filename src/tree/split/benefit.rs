//! Benefits and their evaluation across candidate attributes.

use crate::core::error::Result;
use crate::core::types::AttributeIndex;
use crate::core::utils::ConcurrencyContext;
use crate::tree::selection::Selection;
use crate::tree::split::finder::SplitFinder;
use rand::rngs::StdRng;
use std::cmp::Ordering;

/// Score of splitting on one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Benefit {
    pub attribute: AttributeIndex,
    pub score: f64,
    /// Threshold of a numeric split
    pub threshold: Option<f64>,
}

impl Benefit {
    pub fn new(attribute: AttributeIndex, score: f64, threshold: Option<f64>) -> Self {
        Benefit {
            attribute,
            score,
            threshold,
        }
    }

    /// Ranking order: higher score first, then lower attribute index.
    ///
    /// `NaN` scores rank below every number.
    pub fn rank(&self, other: &Benefit) -> Ordering {
        let key = |score: f64| if score.is_nan() { f64::NEG_INFINITY } else { score };
        key(other.score)
            .partial_cmp(&key(self.score))
            .unwrap_or(Ordering::Equal)
            .then(self.attribute.cmp(&other.attribute))
    }
}

/// Sorts benefits best first.
pub fn sort_benefits(benefits: &mut [Benefit]) {
    benefits.sort_by(Benefit::rank);
}

/// Evaluates a split finder over a list of candidate attributes.
#[derive(Debug, Clone, Copy)]
pub struct BenefitCalculator<'a> {
    finder: SplitFinder<'a>,
}

impl<'a> BenefitCalculator<'a> {
    pub fn new(finder: SplitFinder<'a>) -> Self {
        BenefitCalculator { finder }
    }

    /// Benefits of all candidates that offer a split, best first.
    ///
    /// With `parallel`, attributes are striped round-robin over
    /// `min(parallelism, candidates)` workers. Randomized search always runs
    /// sequentially so that the generator is consumed in attribute order.
    pub fn evaluate(
        &self,
        selection: &Selection,
        attributes: &[AttributeIndex],
        ctx: &ConcurrencyContext,
        parallel: bool,
        rng: &mut StdRng,
    ) -> Result<Vec<Benefit>> {
        let workers = ctx.parallelism().min(attributes.len());
        let mut benefits = if parallel && workers > 1 && !self.finder.is_randomized() {
            self.evaluate_parallel(selection, attributes, ctx, workers)?
        } else {
            attributes
                .iter()
                .filter_map(|&attribute| self.finder.find(selection, attribute, rng))
                .collect()
        };
        sort_benefits(&mut benefits);
        Ok(benefits)
    }

    fn evaluate_parallel(
        &self,
        selection: &Selection,
        attributes: &[AttributeIndex],
        ctx: &ConcurrencyContext,
        workers: usize,
    ) -> Result<Vec<Benefit>> {
        let finder = &self.finder;
        let tasks: Vec<_> = (0..workers)
            .map(|worker| {
                move || {
                    Ok(attributes
                        .iter()
                        .skip(worker)
                        .step_by(workers)
                        .filter_map(|&attribute| finder.find_exhaustive(selection, attribute))
                        .collect::<Vec<_>>())
                }
            })
            .collect();
        Ok(ctx.run(tasks)?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitSearchType;
    use crate::dataset::{Attribute, ColumnTable, DatasetBuilder};
    use crate::tree::criterion::InformationGain;
    use crate::tree::selection::SelectionManager;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_rank_prefers_lower_attribute_on_ties() {
        let mut benefits = vec![
            Benefit::new(3, 0.5, Some(1.0)),
            Benefit::new(1, f64::NAN, None),
            Benefit::new(2, 0.5, None),
            Benefit::new(0, 0.2, None),
        ];
        sort_benefits(&mut benefits);

        let order: Vec<_> = benefits.iter().map(|b| b.attribute).collect();
        assert_eq!(order, vec![2, 3, 0, 1]);
    }

    fn duplicated_columns() -> ColumnTable {
        // Five identical numeric columns: every attribute ties.
        let mut builder = DatasetBuilder::new().label(Attribute::nominal("class", ["a", "b"]));
        for i in 0..5 {
            builder = builder.attribute(Attribute::numeric(format!("x{}", i)));
        }
        for row in 0..40 {
            let value = (row % 10) as f64;
            builder = builder.row(&[value; 5], if value < 5.0 { 0.0 } else { 1.0 });
        }
        let ctx = ConcurrencyContext::sequential().unwrap();
        ColumnTable::build(&builder.build().unwrap(), &ctx, false).unwrap()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = duplicated_columns();
        let sequential_ctx = ConcurrencyContext::sequential().unwrap();
        let parallel_ctx = ConcurrencyContext::new(3).unwrap();
        let selection = SelectionManager::new(&table)
            .start_selection(&sequential_ctx)
            .unwrap();
        let finder = SplitFinder::new(&table, &InformationGain, SplitSearchType::Exhaustive);
        let calculator = BenefitCalculator::new(finder);
        let attributes = table.attribute_indices();
        let mut rng = StdRng::seed_from_u64(0);

        let sequential = calculator
            .evaluate(&selection, &attributes, &sequential_ctx, false, &mut rng)
            .unwrap();
        let parallel = calculator
            .evaluate(&selection, &attributes, &parallel_ctx, true, &mut rng)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential[0].attribute, 0);
        assert_eq!(sequential[0].threshold, Some(4.5));
    }

    #[test]
    fn test_randomized_search_ignores_parallel_flag() {
        let mut builder = DatasetBuilder::new().label(Attribute::nominal("class", ["a", "b"]));
        for i in 0..4 {
            builder = builder.attribute(Attribute::numeric(format!("x{}", i)));
        }
        let mut data_rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let values: Vec<f64> = (0..4).map(|_| data_rng.gen_range(0.0..10.0)).collect();
            let label = if values[0] + values[1] > 10.0 { 1.0 } else { 0.0 };
            builder = builder.row(&values, label);
        }
        let sequential_ctx = ConcurrencyContext::sequential().unwrap();
        let parallel_ctx = ConcurrencyContext::new(4).unwrap();
        let table = ColumnTable::build(&builder.build().unwrap(), &sequential_ctx, false).unwrap();
        let selection = SelectionManager::new(&table)
            .start_selection(&sequential_ctx)
            .unwrap();
        let finder = SplitFinder::new(&table, &InformationGain, SplitSearchType::Randomized);
        let calculator = BenefitCalculator::new(finder);
        let attributes = table.attribute_indices();

        let sequential = calculator
            .evaluate(
                &selection,
                &attributes,
                &sequential_ctx,
                false,
                &mut StdRng::seed_from_u64(3),
            )
            .unwrap();
        let parallel = calculator
            .evaluate(
                &selection,
                &attributes,
                &parallel_ctx,
                true,
                &mut StdRng::seed_from_u64(3),
            )
            .unwrap();

        assert_eq!(sequential.len(), 4);
        assert_eq!(sequential, parallel);
    }
}
