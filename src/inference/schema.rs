use ndarray::Array1;
use std::collections::HashMap;

use super::InferenceError;
use crate::models::{PatientRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

/// What a training column holds once a record is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    /// `<field>_<category>` indicator for one of the categorical fields.
    Indicator { field: &'static str, category: String },
    /// Neither a record column nor an indicator; always zero.
    Unmatched,
}

/// One record after one-hot expansion: the numeric columns followed by one
/// `<field>_<category>` indicator per categorical field, in record order.
pub type ExpandedRow = Vec<(String, f64)>;

/// A row aligned to the training columns, ready for the scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow<'a> {
    pub columns: &'a [String],
    pub values: Array1<f64>,
}

/// The fixed training-time column list and the name-to-slot index built from it.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    slots: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, InferenceError> {
        if columns.is_empty() {
            return Err(InferenceError::schema("training column list is empty"));
        }

        let mut slots = HashMap::with_capacity(columns.len());
        for (slot, column) in columns.iter().enumerate() {
            if slots.insert(column.clone(), slot).is_some() {
                return Err(InferenceError::schema(format!(
                    "training column {:?} appears more than once",
                    column
                )));
            }
        }

        Ok(Self { columns, slots })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn slot(&self, column: &str) -> Option<usize> {
        self.slots.get(column).copied()
    }

    /// Classify a training column. Categorical field names contain underscores
    /// themselves, so the longest matching field prefix wins.
    pub fn column_kind(column: &str) -> ColumnKind {
        if NUMERIC_COLUMNS.contains(&column) {
            return ColumnKind::Numeric;
        }

        CATEGORICAL_COLUMNS
            .iter()
            .filter_map(|field| {
                column
                    .strip_prefix(field)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|category| (*field, category))
            })
            .max_by_key(|(field, _)| field.len())
            .map(|(field, category)| ColumnKind::Indicator {
                field,
                category: category.to_string(),
            })
            .unwrap_or(ColumnKind::Unmatched)
    }

    /// Record columns the model never sees because the training list lacks them.
    pub fn unused_numeric_columns(&self) -> Vec<&'static str> {
        NUMERIC_COLUMNS
            .iter()
            .copied()
            .filter(|column| !self.slots.contains_key(*column))
            .collect()
    }

    pub fn unmatched_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| Self::column_kind(column) == ColumnKind::Unmatched)
            .map(String::as_str)
            .collect()
    }

    /// One-hot expand the five categorical fields. Each observed category
    /// becomes a `<field>_<category>` column set to 1.
    pub fn one_hot(record: &PatientRecord) -> ExpandedRow {
        let mut row: ExpandedRow = record
            .numeric_values()
            .iter()
            .map(|(column, value)| (column.to_string(), *value))
            .collect();

        row.extend(
            record
                .categorical_values()
                .iter()
                .map(|(field, category)| (format!("{}_{}", field, category), 1.0)),
        );

        row
    }

    /// Align an expanded row to the training columns: every training column
    /// gets a slot, columns the row lacks stay 0, and row columns the training
    /// list does not know are dropped.
    pub fn reconcile(&self, expanded: &[(String, f64)]) -> FeatureRow<'_> {
        let mut values = Array1::zeros(self.columns.len());

        for (column, value) in expanded {
            match self.slots.get(column) {
                Some(&slot) => values[slot] = *value,
                None => tracing::debug!(column = %column, "dropping column unknown to the model"),
            }
        }

        FeatureRow {
            columns: &self.columns,
            values,
        }
    }

    pub fn encode(&self, record: &PatientRecord) -> FeatureRow<'_> {
        self.reconcile(&Self::one_hot(record))
    }
}
