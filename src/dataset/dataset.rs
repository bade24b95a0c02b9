//! Row-oriented training dataset.
//!
//! A [`RowDataset`] is the tabular input of one training run: one row per
//! example, a value per attribute, a label and an optional weight. Values are
//! stored as `f64`; nominal values hold their category index and `NaN` marks a
//! missing value. The dataset is consumed once to build a
//! [`ColumnTable`](crate::dataset::ColumnTable).

use crate::core::error::{Result, TreeError};
use crate::core::types::LabelKind;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Categorical values, stored as indices into `categories`
    Nominal { categories: Vec<String> },
    /// Continuous values
    Numeric,
}

/// Attribute metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Value type
    pub kind: AttributeKind,
}

impl Attribute {
    /// Creates a nominal attribute with the given categories.
    pub fn nominal<S, C>(name: S, categories: C) -> Self
    where
        S: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Nominal {
                categories: categories.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Creates a numeric attribute.
    pub fn numeric<S: Into<String>>(name: S) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Returns true for nominal attributes.
    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    /// Category names of a nominal attribute (empty for numeric ones).
    pub fn categories(&self) -> &[String] {
        match &self.kind {
            AttributeKind::Nominal { categories } => categories,
            AttributeKind::Numeric => &[],
        }
    }

    /// Number of categories of a nominal attribute.
    pub fn num_categories(&self) -> usize {
        self.categories().len()
    }

    /// Index of a category by name.
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories().iter().position(|c| c == name)
    }

    /// Name of a category by index.
    pub fn category_name(&self, index: usize) -> Option<&str> {
        self.categories().get(index).map(String::as_str)
    }
}

/// Row-oriented training data.
#[derive(Debug, Clone)]
pub struct RowDataset {
    /// Attribute values (num_rows × num_attributes)
    values: Array2<f64>,
    /// Attribute metadata, one entry per column of `values`
    attributes: Vec<Attribute>,
    /// Label metadata
    label: Attribute,
    /// Label values (num_rows,)
    labels: Array1<f64>,
    /// Example weights (optional)
    weights: Option<Array1<f64>>,
}

impl RowDataset {
    /// Creates a dataset after validating dimensions and nominal codes.
    pub fn new(
        values: Array2<f64>,
        attributes: Vec<Attribute>,
        label: Attribute,
        labels: Array1<f64>,
        weights: Option<Array1<f64>>,
    ) -> Result<Self> {
        let num_rows = values.nrows();

        if values.ncols() != attributes.len() {
            return Err(TreeError::dimension_mismatch(
                format!("attributes: {}", attributes.len()),
                format!("value columns: {}", values.ncols()),
            ));
        }

        if labels.len() != num_rows {
            return Err(TreeError::dimension_mismatch(
                format!("rows: {}", num_rows),
                format!("labels length: {}", labels.len()),
            ));
        }

        if let Some(ref weights) = weights {
            if weights.len() != num_rows {
                return Err(TreeError::dimension_mismatch(
                    format!("rows: {}", num_rows),
                    format!("weights length: {}", weights.len()),
                ));
            }
            if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(crate::dataset_error!(
                    "weights must be finite and non-negative, found {}",
                    w
                ));
            }
        }

        for (index, attribute) in attributes.iter().enumerate() {
            if attribute.is_nominal() {
                check_nominal_codes(attribute, values.column(index))?;
            }
        }
        if label.is_nominal() {
            check_nominal_codes(&label, labels.view())?;
        }

        Ok(RowDataset {
            values,
            attributes,
            label,
            labels,
            weights,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of regular (non-label) attributes.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Attribute metadata.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Label metadata.
    pub fn label_attribute(&self) -> &Attribute {
        &self.label
    }

    /// Whether the label is nominal or numeric.
    pub fn label_kind(&self) -> LabelKind {
        if self.label.is_nominal() {
            LabelKind::Nominal
        } else {
            LabelKind::Numeric
        }
    }

    /// Values of one row.
    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.values.row(row)
    }

    /// Single attribute value.
    pub fn value(&self, row: usize, attribute: usize) -> f64 {
        self.values[[row, attribute]]
    }

    /// Label value of a row.
    pub fn label(&self, row: usize) -> f64 {
        self.labels[row]
    }

    /// All label values.
    pub fn labels(&self) -> ArrayView1<'_, f64> {
        self.labels.view()
    }

    /// Weights, if the dataset is weighted.
    pub fn weights(&self) -> Option<ArrayView1<'_, f64>> {
        self.weights.as_ref().map(|w| w.view())
    }

    /// Returns true if any label value is missing.
    pub fn has_missing_labels(&self) -> bool {
        self.labels.iter().any(|v| v.is_nan())
    }
}

fn check_nominal_codes(attribute: &Attribute, values: ArrayView1<'_, f64>) -> Result<()> {
    let num_categories = attribute.num_categories() as f64;
    for &value in values.iter() {
        if value.is_nan() {
            continue;
        }
        if value < 0.0 || value >= num_categories || value.fract() != 0.0 {
            return Err(TreeError::dataset(format!(
                "nominal attribute '{}' has invalid category code {}",
                attribute.name, value
            )));
        }
    }
    Ok(())
}

/// Builder assembling a [`RowDataset`] row by row.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    attributes: Vec<Attribute>,
    label: Option<Attribute>,
    values: Vec<f64>,
    labels: Vec<f64>,
    weights: Vec<f64>,
    weighted: bool,
}

impl DatasetBuilder {
    /// Create a new dataset builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular attribute
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set the label attribute
    pub fn label(mut self, label: Attribute) -> Self {
        self.label = Some(label);
        self
    }

    /// Add an unweighted row
    pub fn row(self, values: &[f64], label: f64) -> Self {
        self.weighted_row(values, label, 1.0)
    }

    /// Add a weighted row
    pub fn weighted_row(mut self, values: &[f64], label: f64, weight: f64) -> Self {
        self.values.extend_from_slice(values);
        self.labels.push(label);
        self.weights.push(weight);
        self.weighted |= weight != 1.0;
        self
    }

    /// Add a row with nominal values given by category name. Numeric
    /// attributes are parsed, `"?"` marks a missing value.
    pub fn named_row(self, values: &[&str], label: &str) -> Result<Self> {
        let mut encoded = Vec::with_capacity(values.len());
        for (index, raw) in values.iter().enumerate() {
            let attribute = self.attributes.get(index).ok_or_else(|| {
                TreeError::dimension_mismatch(
                    format!("attributes: {}", self.attributes.len()),
                    format!("row values: {}", values.len()),
                )
            })?;
            encoded.push(encode_value(attribute, raw)?);
        }
        let label_attribute = self
            .label
            .as_ref()
            .ok_or_else(|| TreeError::dataset("label attribute must be set before rows"))?;
        let label = encode_value(label_attribute, label)?;
        Ok(self.row(&encoded, label))
    }

    /// Build the dataset
    pub fn build(self) -> Result<RowDataset> {
        let label = self
            .label
            .ok_or_else(|| TreeError::dataset("label attribute is required"))?;
        let num_rows = self.labels.len();
        let num_attributes = self.attributes.len();

        if self.values.len() != num_rows * num_attributes {
            return Err(TreeError::dimension_mismatch(
                format!("{} values", num_rows * num_attributes),
                format!("{} values", self.values.len()),
            ));
        }

        let values = Array2::from_shape_vec((num_rows, num_attributes), self.values)
            .map_err(|e| TreeError::dataset(format!("invalid value matrix: {}", e)))?;
        let weights = self.weighted.then(|| Array1::from_vec(self.weights));

        RowDataset::new(
            values,
            self.attributes,
            label,
            Array1::from_vec(self.labels),
            weights,
        )
    }
}

fn encode_value(attribute: &Attribute, raw: &str) -> Result<f64> {
    if raw == "?" {
        return Ok(f64::NAN);
    }
    if attribute.is_nominal() {
        attribute
            .category_index(raw)
            .map(|index| index as f64)
            .ok_or_else(|| {
                crate::dataset_error!(
                    "unknown category '{}' for attribute '{}'",
                    raw,
                    attribute.name
                )
            })
    } else {
        raw.trim().parse::<f64>().map_err(|_| {
            TreeError::dataset(format!(
                "value '{}' of attribute '{}' is not numeric",
                raw, attribute.name
            ))
        })
    }
}
