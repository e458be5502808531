use crate::error::{PipelineError, RecordRef};
use anyhow::Context;
use csv::StringRecord;
use std::collections::HashMap;

/// Header name → column position for one CSV file.
pub(crate) struct HeaderIndex {
    source: String,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(source: &str, headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();
        Self {
            source: source.to_string(),
            positions,
        }
    }

    pub(crate) fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub(crate) fn require(&self, column: &'static str) -> Result<usize, PipelineError> {
        self.require_as(column, column)
    }

    /// Looks up a computed column name; `reported` is what a missing-column error names.
    pub(crate) fn require_as(&self, column: &str, reported: &'static str) -> Result<usize, PipelineError> {
        self.position(column)
            .ok_or_else(|| PipelineError::MissingRequiredColumn {
                file: self.source.clone(),
                column: reported,
            })
    }
}

pub(crate) fn record_ref(row: &StringRecord) -> RecordRef {
    row.position()
        .map(|p| RecordRef::line(p.line()))
        .unwrap_or_default()
}

pub(crate) fn field<'r>(row: &'r StringRecord, idx: usize, name: &str) -> anyhow::Result<&'r str> {
    row.get(idx)
        .map(str::trim)
        .with_context(|| format!("missing value for column {name:?}"))
}

pub(crate) fn parse_f64(row: &StringRecord, idx: usize, name: &str) -> anyhow::Result<f64> {
    let raw = field(row, idx, name)?;
    let v = raw
        .parse::<f64>()
        .with_context(|| format!("column {name:?} is not a number: {raw:?}"))?;
    anyhow::ensure!(v.is_finite(), "column {name:?} is not finite: {raw:?}");
    Ok(v)
}

/// Integer column that may have been written as an integral float (`123.0`).
pub(crate) fn parse_u64(row: &StringRecord, idx: usize, name: &str) -> anyhow::Result<u64> {
    let raw = field(row, idx, name)?;
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    let v = raw
        .parse::<f64>()
        .with_context(|| format!("column {name:?} is not an integer: {raw:?}"))?;
    anyhow::ensure!(
        v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64,
        "column {name:?} is not a non-negative integer: {raw:?}"
    );
    Ok(v as u64)
}
