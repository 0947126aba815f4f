use std::fmt;

/// Failure taxonomy surfaced to front ends.
///
/// Functions return `anyhow::Result`; callers recover the kind with
/// `err.downcast_ref::<ReportError>()` (see [`ReportError::of`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Bad or missing date range / fish count. Raised before any network call.
    Validation(String),
    /// Transport failure, non-JSON body, or an error-shaped service response.
    Request(String),
    /// Export requested for a date the store does not hold.
    NotFound { date: String },
    /// Bulk export with an empty store.
    Empty,
    /// A newer run started while this one was in flight.
    Superseded { generation: u64 },
}

impl ReportError {
    pub fn of(err: &anyhow::Error) -> Option<&ReportError> {
        err.downcast_ref::<ReportError>()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation",
            ReportError::Request(_) => "request",
            ReportError::NotFound { .. } => "not_found",
            ReportError::Empty => "empty",
            ReportError::Superseded { .. } => "superseded",
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Validation(msg) => write!(f, "{msg}"),
            ReportError::Request(msg) => write!(f, "{msg}"),
            ReportError::NotFound { date } => write!(f, "no report stored for {date}"),
            ReportError::Empty => write!(f, "no reports to export"),
            ReportError::Superseded { generation } => {
                write!(f, "prediction run {generation} was superseded by a newer run")
            }
        }
    }
}

impl std::error::Error for ReportError {}
