use std::fmt;

/// Where a failing input came from, so a bad row can be found again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordRef {
    pub line: Option<u64>,
    pub key: Option<String>,
}

impl RecordRef {
    pub fn line(line: u64) -> Self {
        Self {
            line: Some(line),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.line, &self.key) {
            (Some(line), Some(key)) => write!(f, "line {line} ({key})"),
            (Some(line), None) => write!(f, "line {line}"),
            (None, Some(key)) => write!(f, "{key}"),
            (None, None) => write!(f, "<unknown record>"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PipelineError {
    MalformedDate {
        input: String,
        expected: &'static str,
        record: Option<RecordRef>,
    },
    ClassificationUnavailable {
        backend: &'static str,
        stage: &'static str,
        detail: String,
    },
    MissingRequiredColumn {
        file: String,
        column: &'static str,
    },
}

impl PipelineError {
    pub fn malformed_date(input: &str, expected: &'static str) -> Self {
        Self::MalformedDate {
            input: input.to_string(),
            expected,
            record: None,
        }
    }

    /// Attaches the row identity to a date error; other variants pass through.
    pub fn at_record(self, record: RecordRef) -> Self {
        match self {
            Self::MalformedDate {
                input, expected, ..
            } => Self::MalformedDate {
                input,
                expected,
                record: Some(record),
            },
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDate { .. } => "malformed_date",
            Self::ClassificationUnavailable { .. } => "classification_unavailable",
            Self::MissingRequiredColumn { .. } => "missing_required_column",
        }
    }

    pub fn unavailable(backend: &'static str, stage: &'static str, detail: impl Into<String>) -> Self {
        Self::ClassificationUnavailable {
            backend,
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDate {
                input,
                expected,
                record: Some(record),
            } => write!(f, "malformed date {input:?} at {record} (expected {expected})"),
            Self::MalformedDate {
                input,
                expected,
                record: None,
            } => write!(f, "malformed date {input:?} (expected {expected})"),
            Self::ClassificationUnavailable {
                backend,
                stage,
                detail,
            } => write!(
                f,
                "sentiment classification unavailable (backend={backend}, stage={stage}): {detail}"
            ),
            Self::MissingRequiredColumn { file, column } => {
                write!(f, "{file}: missing required column {column:?}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}
