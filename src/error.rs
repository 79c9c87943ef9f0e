use thiserror::Error;

/// Errors raised by the orifice flow model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Invalid parameter {name}: {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Domain anomaly at beta = {beta}: radicand {radicand} is not a non-negative real")]
    DomainAnomaly { beta: f64, radicand: f64 },
}

/// Errors raised while building a search request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    #[error("Desired flow must be finite, got {0}")]
    InvalidDesiredFlow(f64),

    #[error("Beta range [{min}, {max}] must satisfy 0 < min < max < 1")]
    InvalidRange { min: f64, max: f64 },

    #[error("A search needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error(transparent)]
    Parameters(#[from] FlowError),
}

/// Errors raised while reading the textual form fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Missing value for {field}")]
    Missing { field: &'static str },

    #[error("Value for {field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("Rejected input: {0}")]
    Rejected(#[from] SearchError),
}

impl From<FlowError> for InputError {
    fn from(e: FlowError) -> Self {
        InputError::Rejected(SearchError::Parameters(e))
    }
}

/// Errors raised by audit sinks.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audit log lock poisoned")]
    Poisoned,
}
