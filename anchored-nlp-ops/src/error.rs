use anchored_nlp::CoreError;
use thiserror::Error;

/// Errors raised while configuring or running an operation.
///
/// Configuration problems (a pattern that does not compile) surface from the
/// builders, before the operation ever touches a document. Everything that can
/// go wrong during `run` is a [`CoreError`] and passes through unchanged.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("pattern `{pattern}` failed to compile: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type OpResult<T> = Result<T, OpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_names_the_pattern() {
        let source = regex::Regex::new("(").unwrap_err();
        let error = OpError::InvalidPattern {
            pattern: "(".to_owned(),
            source,
        };
        assert!(error.to_string().starts_with("pattern `(` failed to compile"));
    }

    #[test]
    fn test_core_errors_pass_through_unchanged() {
        let core = CoreError::ReversedRange { start: 4, end: 2 };
        let error = OpError::from(core.clone());
        assert_eq!(error.to_string(), core.to_string());
    }
}
