use crate::openrouter::OpenRouterError;

/// Every way a single summarization run can fail.
///
/// None of these are recovered from inside the pipeline; the caller decides
/// whether the whole invocation is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("No pricing entry for model '{model}'")]
    PricingLookup { model: String },
    #[error("Transport error: {0}")]
    Transport(#[from] OpenRouterError),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("Malformed model reply: {0}")]
    MalformedReply(String),
    #[error("Summary has zero words, compression ratio is undefined")]
    DivisionByZero,
    #[error("Model call was cancelled")]
    Cancelled,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether re-running the same invocation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_transient(),
            Error::Cancelled => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_and_cancellation_are_transient() {
        let overloaded = Error::Transport(OpenRouterError::Api {
            status: 503,
            message: "overloaded".into(),
        });
        let unauthorized = Error::Transport(OpenRouterError::Api {
            status: 401,
            message: "bad key".into(),
        });

        assert!(overloaded.is_transient());
        assert!(Error::Cancelled.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(!Error::Gateway("no such model".into()).is_transient());
        assert!(!Error::MalformedReply("not json".into()).is_transient());
    }
}
