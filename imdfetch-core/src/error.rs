use thiserror::Error;

/// Everything a client call can fail with.
///
/// Exactly three categories: resolution, transport, and page structure.
/// Library callers match on the variant; the CLI prints the `Display` form.
#[derive(Debug, Error)]
pub enum Error {
    /// City resolution produced zero or more than one candidate.
    #[error("city not found for {identifier:?}: {reason}")]
    CityNotFound { identifier: String, reason: String },

    /// Transport-level failure, surfaced after the retry budget is spent.
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Network {
        url: String,
        attempts: u32,
        #[source]
        source: NetworkCause,
    },

    /// Fetched content does not match the expected markup shape.
    /// A given page is assumed deterministic, so this is never retried.
    #[error("failed to parse {context}: {reason}")]
    DataParsing {
        context: &'static str,
        reason: String,
    },
}

/// What exactly went wrong at the transport level.
#[derive(Debug, Error)]
pub enum NetworkCause {
    /// The server answered with a non-success status code.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Timeout, connection failure, TLS failure, or a body read error.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn parsing(context: &'static str, reason: impl Into<String>) -> Self {
        Error::DataParsing {
            context,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_display_includes_status_and_attempts() {
        let err = Error::Network {
            url: "http://example.invalid/page".to_string(),
            attempts: 4,
            source: NetworkCause::Status(503),
        };
        let msg = err.to_string();
        assert!(msg.contains("4 attempt(s)"));
        assert!(msg.contains("HTTP status 503"));
    }

    #[test]
    fn parsing_error_display_names_the_context() {
        let err = Error::parsing("city list", "no option markup");
        assert!(err.to_string().contains("city list"));
    }
}
