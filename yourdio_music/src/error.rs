// Error types for the composition core.
//
// The core performs no I/O, so there is no transient failure class: a
// generation call either succeeds or fails with one of the two kinds below,
// and the caller decides how to report it. Loader and renderer errors
// (`theme::ThemeError`, `render::RenderError`) wrap this type.

/// Failure of a single generation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    /// Malformed or incomplete theme data reached the core. `field` is the
    /// dotted path of the offending value, e.g. `motif.core_pattern`.
    #[error("invalid theme configuration at `{field}`: {reason}")]
    Configuration { field: String, reason: String },

    /// An internal invariant broke (empty resolved scale, non-positive
    /// duration out of a modulation formula). Always a defect.
    #[error("composition invariant violated: {0}")]
    Computation(String),
}

impl CompositionError {
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CompositionError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        CompositionError::Computation(message.into())
    }

    /// The offending field for configuration errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            CompositionError::Configuration { field, .. } => Some(field),
            CompositionError::Computation(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompositionError>;
