use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use super::attributes::Classification;
use super::errors::EventError;
use super::identity::{canonical_key_encoding, derive_identifier};

// ============================================================================
// Event Core - Identity & Causality
// ============================================================================
//
// Embedded in every concrete event. Holds the frozen identifier and the
// identifiers of the events that directly caused this one.
//
// Two construction modes, chosen once at the call site:
// - Fresh: identifier derived from (event type, primary-key values)
// - Reconstructed: identifier and causal links supplied as-is
//
// ============================================================================

/// Attribute values by name, as captured from a concrete event
pub type AttributeValues = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionMode {
    Fresh,
    Reconstructed,
}

#[derive(Debug, Clone)]
pub struct EventCore {
    identifier: String,
    previous_event_identifiers: Vec<String>,
    mode: ConstructionMode,
}

impl EventCore {
    /// Derive identity locally from the type's primary-key attributes
    pub fn fresh(
        event_type: &str,
        classification: &Classification,
        attributes: &AttributeValues,
        previous_event_identifiers: Vec<String>,
    ) -> Result<Self, EventError> {
        validate_parents(event_type, &previous_event_identifiers)?;

        if classification.is_keyless() {
            tracing::debug!(event_type, "Keyless event type; identifier is constant for the type");
        }

        let key_values = primary_key_values(event_type, classification, attributes)?;
        let identifier = derive_identifier(event_type, &key_values)?;

        tracing::debug!(
            event_type,
            identifier = %identifier,
            parents = previous_event_identifiers.len(),
            "Fresh event constructed"
        );

        Ok(Self {
            identifier,
            previous_event_identifiers,
            mode: ConstructionMode::Fresh,
        })
    }

    /// Accept identity and causal links fixed at original creation time
    pub fn reconstructed(
        event_type: &str,
        identifier: impl Into<String>,
        previous_event_identifiers: Vec<String>,
    ) -> Result<Self, EventError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(EventError::MissingIdentifier {
                event_type: event_type.to_string(),
            });
        }

        validate_parents(event_type, &previous_event_identifiers)?;

        tracing::debug!(
            event_type,
            identifier = %identifier,
            parents = previous_event_identifiers.len(),
            "Event reconstructed"
        );

        Ok(Self {
            identifier,
            previous_event_identifiers,
            mode: ConstructionMode::Reconstructed,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn previous_event_identifiers(&self) -> &[String] {
        &self.previous_event_identifiers
    }

    pub fn mode(&self) -> ConstructionMode {
        self.mode
    }
}

fn validate_parents(event_type: &str, parents: &[String]) -> Result<(), EventError> {
    match parents.iter().position(|id| id.trim().is_empty()) {
        Some(position) => Err(EventError::EmptyParentIdentifier {
            event_type: event_type.to_string(),
            position,
        }),
        None => Ok(()),
    }
}

/// Collect primary-key values in declaration order
pub fn primary_key_values(
    event_type: &str,
    classification: &Classification,
    attributes: &AttributeValues,
) -> Result<Vec<Value>, EventError> {
    classification
        .primary_keys()
        .map(|name| {
            attributes
                .get(name)
                .cloned()
                .ok_or_else(|| EventError::MissingAttribute {
                    event_type: event_type.to_string(),
                    attribute: name.to_string(),
                })
        })
        .collect()
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Implemented by every concrete event type
///
/// Concrete types embed an `EventCore` and expose their fields as JSON
/// values; identity, causality and the primary-key view come for free.
/// `PartialEq` and `Hash` on concrete types delegate to
/// `primary_key_eq` / `primary_key_hash`, so they follow the type's
/// classification exactly as the identifier does.
pub trait DomainEvent {
    fn event_type() -> &'static str
    where
        Self: Sized;

    fn classification() -> &'static Classification
    where
        Self: Sized;

    fn core(&self) -> &EventCore;

    /// Every declared attribute, plain and primary-key, by name
    fn attributes(&self) -> Result<AttributeValues, EventError>;

    fn identifier(&self) -> &str {
        self.core().identifier()
    }

    fn previous_event_identifiers(&self) -> &[String] {
        self.core().previous_event_identifiers()
    }

    fn mode(&self) -> ConstructionMode {
        self.core().mode()
    }

    fn attribute(&self, name: &str) -> Result<Option<Value>, EventError> {
        Ok(self.attributes()?.remove(name))
    }

    fn primary_key_values(&self) -> Result<Vec<Value>, EventError>
    where
        Self: Sized,
    {
        primary_key_values(Self::event_type(), Self::classification(), &self.attributes()?)
    }

    /// Canonical bytes of the primary-key values in declaration order
    fn primary_key_encoding(&self) -> Result<Vec<u8>, EventError>
    where
        Self: Sized,
    {
        canonical_key_encoding(&self.primary_key_values()?)
    }

    /// Equality over classified primary-key values only
    ///
    /// An event whose attributes fail to encode equals nothing.
    fn primary_key_eq(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        match (self.primary_key_encoding(), other.primary_key_encoding()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn primary_key_hash<H: Hasher>(&self, state: &mut H)
    where
        Self: Sized,
    {
        if let Ok(encoding) = self.primary_key_encoding() {
            encoding.hash(state);
        }
    }

    /// Derive the identifier the current attributes would produce
    ///
    /// Never touches the stored identifier. For a Reconstructed event this
    /// is an explicit audit, not part of construction.
    fn recompute_identifier(&self) -> Result<String, EventError>
    where
        Self: Sized,
    {
        derive_identifier(Self::event_type(), &self.primary_key_values()?)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
