use thiserror::Error;

/// Failure taxonomy of the core.
///
/// Every error leaves the crate as an [`anyhow::Error`](crate::Error); callers that
/// need to branch on the kind recover it with `error.downcast_ref::<StencilError>()`.
#[derive(Debug, Error)]
pub enum StencilError {
    /// A required argument was absent (predicate for update/delete, sort for paging...).
    #[error("Missing required input: {0}")]
    MissingInput(String),
    /// A property name does not exist on the entity schema.
    #[error("Property `{property}` is not mapped on entity `{entity}`")]
    UnmappedProperty { entity: String, property: String },
    /// The dialect cannot express the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Key misconfiguration on entity `{entity}`: {reason}")]
    KeyMisconfiguration { entity: String, reason: String },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Clock moved backwards, refusing to generate an id for {millis} milliseconds")]
    ClockRegression { millis: u64 },
    #[error("Parameter `{0}` is already bound in this statement")]
    DuplicateParameter(String),
    #[error("Entity `{0}` has no column to write")]
    NoColumns(String),
}

impl StencilError {
    pub fn missing_input(what: impl Into<String>) -> crate::Error {
        StencilError::MissingInput(what.into()).into()
    }
    pub fn unmapped(entity: impl Into<String>, property: impl Into<String>) -> crate::Error {
        StencilError::UnmappedProperty {
            entity: entity.into(),
            property: property.into(),
        }
        .into()
    }
    pub fn unsupported(what: impl Into<String>) -> crate::Error {
        StencilError::Unsupported(what.into()).into()
    }
    pub fn key_misconfiguration(
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> crate::Error {
        StencilError::KeyMisconfiguration {
            entity: entity.into(),
            reason: reason.into(),
        }
        .into()
    }
    pub fn invalid_state(what: impl Into<String>) -> crate::Error {
        StencilError::InvalidState(what.into()).into()
    }
}
