// ============================================================================
// Event Sourcing Core - Event Identity & Causality
// ============================================================================
//
// Generic infrastructure shared by every concrete event type:
// - Attribute classification (plain vs primary-key)
// - Content-based identifier derivation
// - Event core (identifier, causal links, construction mode)
// - Records for rebuilding events from external data
//
// No domain-specific code lives here.
//
// ============================================================================

pub mod attributes;
pub mod errors;
pub mod event;
pub mod identity;
pub mod record;

// Re-export core types for convenience
pub use attributes::{AttributeClassifier, AttributeKind, Classification};
pub use errors::EventError;
pub use event::{AttributeValues, ConstructionMode, DomainEvent, EventCore};
pub use identity::{canonical_key_encoding, canonicalize, derive_identifier};
pub use record::{deserialize_record, serialize_record, EventRecord, Rehydrate};
