//! Column-major, read-only snapshot of the training rows.
//!
//! The table is built once per training run and shared by every node of the
//! tree (and by every tree of an ensemble that reuses it). Attributes are
//! renumbered so that nominal attributes occupy `[0, K)` and numeric ones
//! `[K, K + P)`; split tie-breaking relies on this numbering.
//!
//! Nominal columns hold one byte per row with the category index, or the
//! category count as the missing sentinel. Numeric columns hold `f64` values
//! with `NaN` for missing values.

use crate::core::constants::{
    CANCELLATION_CHECK_INTERVAL, MAX_NOMINAL_CATEGORIES, PARALLEL_TABLE_CELL_THRESHOLD,
};
use crate::core::error::{Result, TreeError};
use crate::core::types::{AttributeIndex, LabelKind, RowIndex};
use crate::core::utils::ConcurrencyContext;
use crate::dataset::dataset::{Attribute, RowDataset};

#[derive(Debug, Clone)]
struct NominalColumn {
    source: usize,
    attribute: Attribute,
    values: Vec<u8>,
}

#[derive(Debug, Clone)]
struct NumericColumn {
    source: usize,
    attribute: Attribute,
    values: Vec<f64>,
}

#[derive(Debug, Clone)]
enum LabelColumn {
    Nominal(Vec<u32>),
    Numeric(Vec<f64>),
}

/// Immutable column-oriented training table.
#[derive(Debug, Clone)]
pub struct ColumnTable {
    num_rows: usize,
    nominal: Vec<NominalColumn>,
    numeric: Vec<NumericColumn>,
    source_attributes: Vec<Attribute>,
    label_attribute: Attribute,
    label: LabelColumn,
    weights: Option<Vec<f64>>,
}

/// Disjoint row slices of every column, filled by one worker.
struct ChunkSlices<'a> {
    start: RowIndex,
    len: usize,
    nominal: Vec<&'a mut [u8]>,
    numeric: Vec<&'a mut [f64]>,
}

impl ColumnTable {
    /// Builds the table from a row dataset.
    ///
    /// Fails with [`TreeError::LabelMissingValues`] before any column is
    /// built if a label is missing. Rows are filled in parallel chunks when
    /// `parallel_allowed`, the context has more than one thread and the table
    /// is large enough.
    pub fn build(
        dataset: &RowDataset,
        ctx: &ConcurrencyContext,
        parallel_allowed: bool,
    ) -> Result<Self> {
        Self::build_with_cell_threshold(
            dataset,
            ctx,
            parallel_allowed,
            PARALLEL_TABLE_CELL_THRESHOLD,
        )
    }

    pub(crate) fn build_with_cell_threshold(
        dataset: &RowDataset,
        ctx: &ConcurrencyContext,
        parallel_allowed: bool,
        cell_threshold: usize,
    ) -> Result<Self> {
        if dataset.has_missing_labels() {
            return Err(TreeError::label_missing_values(
                dataset.label_attribute().name.clone(),
            ));
        }

        let num_rows = dataset.num_rows();
        let mut nominal_sources = Vec::new();
        let mut numeric_sources = Vec::new();
        for (source, attribute) in dataset.attributes().iter().enumerate() {
            if !attribute.is_nominal() {
                numeric_sources.push(source);
            } else if attribute.num_categories() > MAX_NOMINAL_CATEGORIES {
                log::warn!(
                    "Dropping nominal attribute '{}': {} categories exceed the limit of {}",
                    attribute.name,
                    attribute.num_categories(),
                    MAX_NOMINAL_CATEGORIES
                );
            } else {
                nominal_sources.push(source);
            }
        }

        let missing_codes: Vec<u8> = nominal_sources
            .iter()
            .map(|&source| dataset.attributes()[source].num_categories() as u8)
            .collect();
        let mut nominal_values: Vec<Vec<u8>> =
            nominal_sources.iter().map(|_| vec![0u8; num_rows]).collect();
        let mut numeric_values: Vec<Vec<f64>> =
            numeric_sources.iter().map(|_| vec![f64::NAN; num_rows]).collect();

        let parallelism = ctx.parallelism();
        let cells = num_rows * dataset.num_attributes();
        let fill = RowFiller {
            dataset,
            ctx,
            nominal_sources: &nominal_sources,
            numeric_sources: &numeric_sources,
            missing_codes: &missing_codes,
        };

        if parallel_allowed && parallelism > 1 && cells > cell_threshold {
            let chunk_size = ((num_rows + parallelism - 1) / parallelism).max(1);
            let num_chunks = (num_rows + chunk_size - 1) / chunk_size;
            log::debug!(
                "Filling column table in {} parallel chunks of {} rows",
                num_chunks,
                chunk_size
            );

            let mut chunks: Vec<ChunkSlices<'_>> = (0..num_chunks)
                .map(|i| ChunkSlices {
                    start: i * chunk_size,
                    len: chunk_size.min(num_rows - i * chunk_size),
                    nominal: Vec::with_capacity(nominal_values.len()),
                    numeric: Vec::with_capacity(numeric_values.len()),
                })
                .collect();
            for column in nominal_values.iter_mut() {
                for (chunk, slice) in chunks.iter_mut().zip(column.chunks_mut(chunk_size)) {
                    chunk.nominal.push(slice);
                }
            }
            for column in numeric_values.iter_mut() {
                for (chunk, slice) in chunks.iter_mut().zip(column.chunks_mut(chunk_size)) {
                    chunk.numeric.push(slice);
                }
            }

            let fill = &fill;
            let tasks: Vec<_> = chunks
                .into_iter()
                .map(|chunk| move || fill.fill(chunk))
                .collect();
            ctx.run(tasks)?;
        } else {
            fill.fill(ChunkSlices {
                start: 0,
                len: num_rows,
                nominal: nominal_values.iter_mut().map(Vec::as_mut_slice).collect(),
                numeric: numeric_values.iter_mut().map(Vec::as_mut_slice).collect(),
            })?;
        }

        let label = match dataset.label_kind() {
            LabelKind::Nominal => {
                LabelColumn::Nominal(dataset.labels().iter().map(|&v| v as u32).collect())
            }
            LabelKind::Numeric => LabelColumn::Numeric(dataset.labels().to_vec()),
        };
        let weights = dataset.weights().map(|w| w.to_vec());

        let nominal = nominal_sources
            .into_iter()
            .zip(nominal_values)
            .map(|(source, values)| NominalColumn {
                source,
                attribute: dataset.attributes()[source].clone(),
                values,
            })
            .collect();
        let numeric = numeric_sources
            .into_iter()
            .zip(numeric_values)
            .map(|(source, values)| NumericColumn {
                source,
                attribute: dataset.attributes()[source].clone(),
                values,
            })
            .collect();

        Ok(ColumnTable {
            num_rows,
            nominal,
            numeric,
            source_attributes: dataset.attributes().to_vec(),
            label_attribute: dataset.label_attribute().clone(),
            label,
            weights,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of nominal attributes (K).
    pub fn num_nominal(&self) -> usize {
        self.nominal.len()
    }

    /// Number of numeric attributes (P).
    pub fn num_numeric(&self) -> usize {
        self.numeric.len()
    }

    /// Total number of attributes (K + P).
    pub fn num_attributes(&self) -> usize {
        self.nominal.len() + self.numeric.len()
    }

    /// All attribute indices in ascending order.
    pub fn attribute_indices(&self) -> Vec<AttributeIndex> {
        (0..self.num_attributes()).collect()
    }

    /// Returns true if the attribute is nominal.
    pub fn is_nominal(&self, attribute: AttributeIndex) -> bool {
        attribute < self.nominal.len()
    }

    /// Position of a numeric attribute among the numeric columns.
    pub fn numeric_position(&self, attribute: AttributeIndex) -> usize {
        debug_assert!(!self.is_nominal(attribute));
        attribute - self.nominal.len()
    }

    /// Category codes of a nominal attribute.
    pub fn nominal_values(&self, attribute: AttributeIndex) -> &[u8] {
        &self.nominal[attribute].values
    }

    /// Values of a numeric attribute.
    pub fn numeric_values(&self, attribute: AttributeIndex) -> &[f64] {
        &self.numeric[self.numeric_position(attribute)].values
    }

    /// Number of categories of a nominal attribute.
    pub fn num_categories(&self, attribute: AttributeIndex) -> usize {
        self.nominal[attribute].attribute.num_categories()
    }

    /// Code marking a missing value of a nominal attribute.
    pub fn missing_code(&self, attribute: AttributeIndex) -> u8 {
        self.num_categories(attribute) as u8
    }

    /// Metadata of an attribute.
    pub fn attribute(&self, attribute: AttributeIndex) -> &Attribute {
        if self.is_nominal(attribute) {
            &self.nominal[attribute].attribute
        } else {
            &self.numeric[self.numeric_position(attribute)].attribute
        }
    }

    /// Column index of the attribute in the source dataset.
    pub fn source_index(&self, attribute: AttributeIndex) -> usize {
        if self.is_nominal(attribute) {
            self.nominal[attribute].source
        } else {
            self.numeric[self.numeric_position(attribute)].source
        }
    }

    /// Attribute metadata of the source dataset, including dropped attributes.
    pub fn source_attributes(&self) -> &[Attribute] {
        &self.source_attributes
    }

    /// Label metadata.
    pub fn label_attribute(&self) -> &Attribute {
        &self.label_attribute
    }

    /// Whether the label is nominal or numeric.
    pub fn label_kind(&self) -> LabelKind {
        match self.label {
            LabelColumn::Nominal(_) => LabelKind::Nominal,
            LabelColumn::Numeric(_) => LabelKind::Numeric,
        }
    }

    /// Number of label classes (0 for numeric labels).
    pub fn num_classes(&self) -> usize {
        match self.label {
            LabelColumn::Nominal(_) => self.label_attribute.num_categories(),
            LabelColumn::Numeric(_) => 0,
        }
    }

    /// Class index of a row. Numeric labels are truncated.
    pub fn class(&self, row: RowIndex) -> usize {
        match &self.label {
            LabelColumn::Nominal(classes) => classes[row] as usize,
            LabelColumn::Numeric(values) => values[row] as usize,
        }
    }

    /// Label of a row as a number (class index for nominal labels).
    pub fn label_value(&self, row: RowIndex) -> f64 {
        match &self.label {
            LabelColumn::Nominal(classes) => classes[row] as f64,
            LabelColumn::Numeric(values) => values[row],
        }
    }

    /// Weight of a row, 1.0 for unweighted tables.
    pub fn weight(&self, row: RowIndex) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[row])
    }

    /// Returns true if the table carries example weights.
    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }
}

struct RowFiller<'a> {
    dataset: &'a RowDataset,
    ctx: &'a ConcurrencyContext,
    nominal_sources: &'a [usize],
    numeric_sources: &'a [usize],
    missing_codes: &'a [u8],
}

impl RowFiller<'_> {
    fn fill(&self, mut chunk: ChunkSlices<'_>) -> Result<()> {
        for offset in 0..chunk.len {
            if offset % CANCELLATION_CHECK_INTERVAL == 0 {
                self.ctx.check_cancelled()?;
            }
            let row = self.dataset.row(chunk.start + offset);

            for (k, &source) in self.nominal_sources.iter().enumerate() {
                let value = row[source];
                chunk.nominal[k][offset] = if value.is_nan() {
                    self.missing_codes[k]
                } else {
                    value as u8
                };
            }
            for (p, &source) in self.numeric_sources.iter().enumerate() {
                chunk.numeric[p][offset] = row[source];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::dataset::DatasetBuilder;

    fn mixed_dataset(rows: usize) -> RowDataset {
        let mut builder = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .attribute(Attribute::nominal("color", ["red", "green", "blue"]))
            .attribute(Attribute::numeric("y"))
            .label(Attribute::nominal("class", ["a", "b"]));
        for i in 0..rows {
            let color = if i % 7 == 0 { f64::NAN } else { (i % 3) as f64 };
            let y = if i % 5 == 0 { f64::NAN } else { i as f64 * 0.5 };
            builder = builder.row(&[i as f64, color, y], (i % 2) as f64);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_nominal_attributes_come_first() {
        let dataset = mixed_dataset(10);
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&dataset, &ctx, false).unwrap();

        assert_eq!(table.num_rows(), 10);
        assert_eq!(table.num_nominal(), 1);
        assert_eq!(table.num_numeric(), 2);
        assert!(table.is_nominal(0));
        assert_eq!(table.attribute(0).name, "color");
        assert_eq!(table.source_index(0), 1);
        assert_eq!(table.attribute(1).name, "x");
        assert_eq!(table.attribute(2).name, "y");
        assert_eq!(table.numeric_position(2), 1);
    }

    #[test]
    fn test_missing_values_are_encoded() {
        let dataset = mixed_dataset(10);
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&dataset, &ctx, false).unwrap();

        assert_eq!(table.missing_code(0), 3);
        assert_eq!(table.nominal_values(0)[0], 3);
        assert_eq!(table.nominal_values(0)[1], 1);
        assert!(table.numeric_values(2)[0].is_nan());
        assert_eq!(table.numeric_values(2)[4], 2.0);
        assert_eq!(table.weight(3), 1.0);
        assert!(!table.has_weights());
    }

    #[test]
    fn test_missing_label_is_fatal() {
        let dataset = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .label(Attribute::nominal("outcome", ["a", "b"]))
            .row(&[1.0], 0.0)
            .row(&[2.0], f64::NAN)
            .build()
            .unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();

        let err = ColumnTable::build(&dataset, &ctx, true).unwrap_err();
        assert!(matches!(err, TreeError::LabelMissingValues { .. }));
        assert!(err.to_string().contains("outcome"));
    }

    #[test]
    fn test_high_cardinality_nominal_dropped() {
        let categories: Vec<String> = (0..200).map(|i| format!("c{}", i)).collect();
        let dataset = DatasetBuilder::new()
            .attribute(Attribute::nominal("id", categories))
            .attribute(Attribute::numeric("x"))
            .label(Attribute::numeric("y"))
            .row(&[150.0, 1.0], 2.0)
            .build()
            .unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&dataset, &ctx, false).unwrap();

        assert_eq!(table.num_nominal(), 0);
        assert_eq!(table.num_attributes(), 1);
        assert_eq!(table.attribute(0).name, "x");
        assert_eq!(table.label_kind(), LabelKind::Numeric);
    }

    #[test]
    fn test_parallel_fill_matches_sequential() {
        let dataset = mixed_dataset(2503);
        let sequential_ctx = ConcurrencyContext::sequential().unwrap();
        let parallel_ctx = ConcurrencyContext::new(4).unwrap();

        let sequential = ColumnTable::build(&dataset, &sequential_ctx, false).unwrap();
        let parallel =
            ColumnTable::build_with_cell_threshold(&dataset, &parallel_ctx, true, 10).unwrap();

        assert_eq!(sequential.nominal_values(0), parallel.nominal_values(0));
        for attribute in 1..3 {
            let a = sequential.numeric_values(attribute);
            let b = parallel.numeric_values(attribute);
            assert!(a
                .iter()
                .zip(b)
                .all(|(x, y)| x == y || (x.is_nan() && y.is_nan())));
        }
    }

    #[test]
    fn test_cancelled_build_aborts() {
        let dataset = mixed_dataset(50);
        let ctx = ConcurrencyContext::sequential().unwrap();
        ctx.cancellation_token().cancel();

        let err = ColumnTable::build(&dataset, &ctx, false).unwrap_err();
        assert!(err.is_cancelled());
    }
}
