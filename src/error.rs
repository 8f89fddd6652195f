//! Typed errors surfaced by the data layer

use thiserror::Error;

/// Conditions a price source reports instead of a series
#[derive(Debug, Error)]
pub enum DataError {
    /// The source has no usable closes for this symbol and period
    #[error("no data found for {symbol}")]
    NoData { symbol: String },

    #[error("market data API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse market data: {0}")]
    Parse(String),
}

impl DataError {
    pub fn no_data(symbol: impl Into<String>) -> Self {
        DataError::NoData {
            symbol: symbol.into(),
        }
    }

    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Api { status, .. } => *status == 429 || *status >= 500,
            DataError::NoData { .. } | DataError::Parse(_) => false,
        }
    }
}

/// True when `err` (anywhere in its chain) is a [`DataError::NoData`]
pub fn is_no_data(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<DataError>(),
            Some(DataError::NoData { .. })
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_transient_classification() {
        assert!(DataError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(DataError::Api {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(!DataError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!DataError::no_data("AAPL").is_transient());
    }

    #[test]
    fn test_is_no_data_through_context() {
        let err: anyhow::Result<()> = Err(DataError::no_data("FOO.TW").into());
        let err = err.context("Failed to load FOO.TW").unwrap_err();
        assert!(is_no_data(&err));

        let other = anyhow::anyhow!("connection reset");
        assert!(!is_no_data(&other));
    }
}
