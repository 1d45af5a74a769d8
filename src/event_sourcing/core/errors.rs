// ============================================================================
// Event Construction Errors
// ============================================================================
//
// Every variant is a caller defect: a malformed event must never reach
// storage or publishing with ambiguous identity, so nothing here is retried.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Reconstructed {event_type} event requires a non-empty identifier")]
    MissingIdentifier { event_type: String },

    #[error("{event_type} event has an empty previous event identifier at position {position}")]
    EmptyParentIdentifier { event_type: String, position: usize },

    #[error("{event_type} event is missing attribute '{attribute}'")]
    MissingAttribute {
        event_type: String,
        attribute: String,
    },

    #[error("Record of type {found} cannot rebuild a {expected} event")]
    TypeMismatch { expected: String, found: String },

    #[error("Attribute encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Malformed event record: {0}")]
    MalformedRecord(#[source] serde_json::Error),
}
