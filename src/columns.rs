use crate::error::{PageTableError, Result};
use crate::types::Pt;
use std::collections::HashMap;

/// One table column: the record field it shows, its header title and its share
/// of the usable page width.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: String,
    pub title: String,
    pub width_fraction: f64,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, title: impl Into<String>, width_fraction: f64) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width_fraction,
        }
    }
}

/// Cell values of one body row, aligned with the column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    values: Vec<Option<String>>,
}

impl RowRecord {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    pub fn from_optional(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Picks each column's value out of `fields` by [`ColumnSpec::key`].
    pub fn from_fields(columns: &[ColumnSpec], fields: &HashMap<String, String>) -> Self {
        Self {
            values: columns
                .iter()
                .map(|column| fields.get(&column.key).cloned())
                .collect(),
        }
    }

    /// Value for column `index`; missing trailing values read as empty.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }
}

/// Splits `usable_width` between columns proportionally to their fractions.
///
/// Every column but the last is rounded to whole points; the last one takes
/// the remainder, so the widths always add up to `usable_width` exactly.
pub fn compute_column_widths(columns: &[ColumnSpec], usable_width: Pt) -> Result<Vec<Pt>> {
    if columns.is_empty() {
        return Err(PageTableError::InvalidConfiguration(
            "at least one column is required".to_string(),
        ));
    }
    if usable_width <= Pt::ZERO {
        return Err(PageTableError::InvalidConfiguration(format!(
            "usable width must be positive, got {}pt",
            usable_width.to_f32()
        )));
    }

    let fractions: Vec<f64> = columns
        .iter()
        .map(|c| {
            if c.width_fraction.is_finite() && c.width_fraction > 0.0 {
                c.width_fraction
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = fractions.iter().sum();
    let equal_share = 1.0 / columns.len() as f64;
    let usable = usable_width.to_f64();

    let mut widths = Vec::with_capacity(columns.len());
    let mut assigned = Pt::ZERO;
    for fraction in &fractions[..fractions.len() - 1] {
        let share = if total > 0.0 { fraction / total } else { equal_share };
        let width = Pt::from_f64((usable * share).round()).min(usable_width - assigned);
        assigned += width;
        widths.push(width);
    }
    widths.push(usable_width - assigned);
    Ok(widths)
}
