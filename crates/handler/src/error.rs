use serde_json::Value;
use thiserror::Error;

/// The erased error currency used by stage functions and custom adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raised when input or output data fails a resolved adapter's parse step,
/// or when wrapping an unexpected error thrown during that step.
#[derive(Debug, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,

    /// Name of the offending field or request part, if known.
    pub field: Option<String>,

    /// The offending value, if it is worth echoing back.
    pub value: Option<Value>,

    /// The original error, kept for diagnostics.
    #[source]
    pub source: Option<BoxError>,
}

impl ValidationError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self { message: message.to_string(), field: None, value: None, source: None }
    }

    /// Wraps an unexpected parse-time error, keeping it as the source.
    pub fn wrap<S: ToString>(message: S, source: BoxError) -> Self {
        Self { message: message.to_string(), field: None, value: None, source: Some(source) }
    }

    pub fn with_field<S: ToString>(mut self, field: S) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// A deliberate business error carrying the status code the caller intends
/// to surface. Passes through the pipeline unmodified.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,

    /// Intended status code, `500` unless overridden.
    pub status: u16,

    /// Optional structured details for the error envelope.
    pub details: Option<Value>,
}

impl HandlerError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self { message: message.to_string(), status: 500, details: None }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Classified failure of a pipeline execution.
///
/// Validation and handler errors keep their identity through the pipeline;
/// everything else raised by middlewares, the handler function or the
/// transform travels as [`PipelineError::Other`] unmodified.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// `execute` was called on a handler that never got a `handle()` stage.
    /// A programming mistake, not a runtime condition.
    #[error("handler function not defined")]
    MissingHandler,

    #[error("{0}")]
    Other(BoxError),
}

impl PipelineError {
    pub fn other<E: Into<BoxError>>(err: E) -> Self {
        Self::Other(err.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_error_keeps_the_original_as_source() {
        let original: BoxError = "boom".into();
        let err = ValidationError::wrap("schema validation failed", original)
            .with_field("body")
            .with_value(json!({"age": -1}));

        assert_eq!(err.field.as_deref(), Some("body"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "validation failed: schema validation failed");
    }

    #[test]
    fn handler_error_defaults_to_500() {
        let err = HandlerError::new("nope");
        assert_eq!(err.status, 500);

        let err = HandlerError::new("gone").with_status(404).with_details(json!({"id": 7}));
        assert_eq!(err.status, 404);
        assert_eq!(err.details, Some(json!({"id": 7})));
    }

    #[test]
    fn pipeline_error_classification() {
        let err = PipelineError::from(ValidationError::new("bad"));
        assert!(err.is_validation());

        let err = PipelineError::from(HandlerError::new("no"));
        assert!(err.is_handler());

        let err = PipelineError::other("anything");
        assert!(!err.is_validation() && !err.is_handler());

        assert_eq!(PipelineError::MissingHandler.to_string(), "handler function not defined");
    }
}
