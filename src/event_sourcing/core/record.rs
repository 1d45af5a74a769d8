use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::EventError;
use super::event::{AttributeValues, DomainEvent};

// ============================================================================
// Event Record - Captured Identity, Causality & Attributes
// ============================================================================
//
// The shape external collaborators (serializers, stores, brokers) hand back
// when an event has to be rebuilt. Identifier and causal links are opaque
// strings; rebuilding never recomputes them.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub event_type: String,
    pub identifier: String,
    pub previous_event_identifiers: Vec<String>,
    pub attributes: AttributeValues,
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    /// Snapshot an event as it stands
    pub fn capture<E: DomainEvent>(event: &E) -> Result<Self, EventError> {
        Ok(Self {
            event_type: E::event_type().to_string(),
            identifier: event.identifier().to_string(),
            previous_event_identifiers: event.previous_event_identifiers().to_vec(),
            attributes: event.attributes()?,
            recorded_at: Utc::now(),
        })
    }

    /// Fail unless this record was captured from an `E`
    pub fn expect_type<E: DomainEvent>(&self) -> Result<(), EventError> {
        if self.event_type != E::event_type() {
            return Err(EventError::TypeMismatch {
                expected: E::event_type().to_string(),
                found: self.event_type.clone(),
            });
        }
        Ok(())
    }

    /// Decode one attribute into its business type
    pub fn attribute<T: DeserializeOwned>(&self, name: &str) -> Result<T, EventError> {
        let value = self
            .attributes
            .get(name)
            .cloned()
            .ok_or_else(|| EventError::MissingAttribute {
                event_type: self.event_type.clone(),
                attribute: name.to_string(),
            })?;

        Ok(serde_json::from_value(value)?)
    }
}

/// Rebuild a concrete event in Reconstructed mode
pub trait Rehydrate: DomainEvent + Sized {
    fn from_record(record: &EventRecord) -> Result<Self, EventError>;
}

// ============================================================================
// Record Serialization Helpers
// ============================================================================

pub fn serialize_record(record: &EventRecord) -> Result<String, EventError> {
    Ok(serde_json::to_string(record)?)
}

pub fn deserialize_record(json: &str) -> Result<EventRecord, EventError> {
    serde_json::from_str(json).map_err(EventError::MalformedRecord)
}

// ============================================================================
// Unit Tests
// ============================================================================
