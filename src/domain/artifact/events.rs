use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use once_cell::sync::Lazy;

use crate::event_sourcing::core::{
    AttributeClassifier, AttributeValues, Classification, DomainEvent, EventCore, EventError,
    EventRecord, Rehydrate,
};
use super::value_objects::Change;

// ============================================================================
// Artifact Events - Staging Requests & Commits
// ============================================================================
//
// ChangeStagingCodeDescribed  (request)
//          |
//          v  causal parent
// ChangesCommitted / ArtifactChangesCommitted
//
// Equality and hashing go through the classification, never through
// hand-picked fields.
//
// ============================================================================

fn insert<T: serde::Serialize>(
    attributes: &mut AttributeValues,
    name: &str,
    value: &T,
) -> Result<(), EventError> {
    attributes.insert(name.to_string(), serde_json::to_value(value)?);
    Ok(())
}

// ============================================================================
// Change Staging Code Described - Request Event
// ============================================================================

static STAGING_CODE_CLASSIFICATION: Lazy<Classification> = Lazy::new(|| {
    AttributeClassifier::new()
        .mark_primary_key("change")
        .mark_plain("code")
        .build()
});

/// Describes the code that stages a change; the request a commit answers
#[derive(Debug, Clone)]
pub struct ChangeStagingCodeDescribed {
    core: EventCore,
    change: Change,
    code: String,
}

impl ChangeStagingCodeDescribed {
    pub fn new(
        change: Change,
        code: impl Into<String>,
        previous_event_identifiers: Vec<String>,
    ) -> Result<Self, EventError> {
        let code = code.into();
        let core = EventCore::fresh(
            Self::event_type(),
            Self::classification(),
            &Self::attribute_values(&change, &code)?,
            previous_event_identifiers,
        )?;
        Ok(Self { core, change, code })
    }

    pub fn rehydrate(
        identifier: impl Into<String>,
        previous_event_identifiers: Vec<String>,
        change: Change,
        code: impl Into<String>,
    ) -> Result<Self, EventError> {
        let core = EventCore::reconstructed(Self::event_type(), identifier, previous_event_identifiers)?;
        Ok(Self {
            core,
            change,
            code: code.into(),
        })
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn attribute_values(change: &Change, code: &str) -> Result<AttributeValues, EventError> {
        let mut attributes = AttributeValues::new();
        insert(&mut attributes, "change", change)?;
        insert(&mut attributes, "code", &code)?;
        Ok(attributes)
    }
}

impl DomainEvent for ChangeStagingCodeDescribed {
    fn event_type() -> &'static str { "ChangeStagingCodeDescribed" }

    fn classification() -> &'static Classification {
        &STAGING_CODE_CLASSIFICATION
    }

    fn core(&self) -> &EventCore {
        &self.core
    }

    fn attributes(&self) -> Result<AttributeValues, EventError> {
        Self::attribute_values(&self.change, &self.code)
    }
}

impl Rehydrate for ChangeStagingCodeDescribed {
    fn from_record(record: &EventRecord) -> Result<Self, EventError> {
        record.expect_type::<Self>()?;
        Self::rehydrate(
            record.identifier.clone(),
            record.previous_event_identifiers.clone(),
            record.attribute("change")?,
            record.attribute::<String>("code")?,
        )
    }
}

impl PartialEq for ChangeStagingCodeDescribed {
    fn eq(&self, other: &Self) -> bool {
        self.primary_key_eq(other)
    }
}

impl Eq for ChangeStagingCodeDescribed {}

impl Hash for ChangeStagingCodeDescribed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primary_key_hash(state);
    }
}

// ============================================================================
// Committed Changes - Shared Body of Every "Changes Committed" Event
// ============================================================================

/// Message (plain), change and commit hash (primary keys)
#[derive(Debug, Clone)]
pub struct CommittedChanges {
    pub message: String,
    pub change: Change,
    pub commit: String,
}

static COMMITTED_CHANGES_CLASSIFICATION: Lazy<Classification> = Lazy::new(|| {
    AttributeClassifier::new()
        .mark_plain("message")
        .mark_primary_key("change")
        .mark_primary_key("commit")
        .build()
});

impl CommittedChanges {
    pub fn new(message: impl Into<String>, change: Change, commit: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            change,
            commit: commit.into(),
        }
    }

    fn attribute_values(&self) -> Result<AttributeValues, EventError> {
        let mut attributes = AttributeValues::new();
        insert(&mut attributes, "message", &self.message)?;
        insert(&mut attributes, "change", &self.change)?;
        insert(&mut attributes, "commit", &self.commit)?;
        Ok(attributes)
    }

    fn from_record(record: &EventRecord) -> Result<Self, EventError> {
        Ok(Self {
            message: record.attribute("message")?,
            change: record.attribute("change")?,
            commit: record.attribute("commit")?,
        })
    }
}

// ============================================================================
// Commit Targets - Which Repository the Changes Landed In
// ============================================================================

/// Names the event type of a `Committed` flavour
pub trait CommitTarget {
    const EVENT_TYPE: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct SourceRepository;

impl CommitTarget for SourceRepository {
    const EVENT_TYPE: &'static str = "ChangesCommitted";
}

/// Changes committed in an artifact repository rather than its source
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRepository;

impl CommitTarget for ArtifactRepository {
    const EVENT_TYPE: &'static str = "ArtifactChangesCommitted";
}

// ============================================================================
// Committed - Generic "Changes Committed" Event
// ============================================================================

/// Staged changes were committed
///
/// Every flavour shares one classification; only the event type name,
/// and therefore the identifier, differs.
#[derive(Debug, Clone)]
pub struct Committed<T: CommitTarget> {
    core: EventCore,
    body: CommittedChanges,
    _target: PhantomData<T>,
}

pub type ChangesCommitted = Committed<SourceRepository>;
pub type ArtifactChangesCommitted = Committed<ArtifactRepository>;

impl<T: CommitTarget> Committed<T> {
    /// Fresh event; the originating request, if any, becomes the sole causal parent
    pub fn new(
        message: impl Into<String>,
        change: Change,
        commit: impl Into<String>,
        request_identifier: Option<&str>,
    ) -> Result<Self, EventError> {
        let body = CommittedChanges::new(message, change, commit);
        let previous_event_identifiers = request_identifier.map(str::to_string).into_iter().collect();
        let core = EventCore::fresh(
            T::EVENT_TYPE,
            &COMMITTED_CHANGES_CLASSIFICATION,
            &body.attribute_values()?,
            previous_event_identifiers,
        )?;
        Ok(Self {
            core,
            body,
            _target: PhantomData,
        })
    }

    pub fn rehydrate(
        identifier: impl Into<String>,
        previous_event_identifiers: Vec<String>,
        body: CommittedChanges,
    ) -> Result<Self, EventError> {
        let core = EventCore::reconstructed(T::EVENT_TYPE, identifier, previous_event_identifiers)?;
        Ok(Self {
            core,
            body,
            _target: PhantomData,
        })
    }

    pub fn message(&self) -> &str {
        &self.body.message
    }

    pub fn change(&self) -> &Change {
        &self.body.change
    }

    pub fn commit(&self) -> &str {
        &self.body.commit
    }
}

impl<T: CommitTarget> DomainEvent for Committed<T> {
    fn event_type() -> &'static str {
        T::EVENT_TYPE
    }

    fn classification() -> &'static Classification {
        &COMMITTED_CHANGES_CLASSIFICATION
    }

    fn core(&self) -> &EventCore {
        &self.core
    }

    fn attributes(&self) -> Result<AttributeValues, EventError> {
        self.body.attribute_values()
    }
}

impl<T: CommitTarget> Rehydrate for Committed<T> {
    fn from_record(record: &EventRecord) -> Result<Self, EventError> {
        record.expect_type::<Self>()?;
        Self::rehydrate(
            record.identifier.clone(),
            record.previous_event_identifiers.clone(),
            CommittedChanges::from_record(record)?,
        )
    }
}

impl<T: CommitTarget> PartialEq for Committed<T> {
    fn eq(&self, other: &Self) -> bool {
        self.primary_key_eq(other)
    }
}

impl<T: CommitTarget> Eq for Committed<T> {}

impl<T: CommitTarget> Hash for Committed<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primary_key_hash(state);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::core::{
        derive_identifier, deserialize_record, serialize_record, ConstructionMode,
    };
    use serde_json::json;
    use std::collections::HashSet;

    fn change_c() -> Change {
        Change::new(
            "--- a/flake.nix\n+++ b/flake.nix\n",
            "main",
            "https://github.com/example/artifact",
            "/tmp/artifact",
        )
    }

    fn change_c2() -> Change {
        Change::new(
            "--- a/README.md\n+++ b/README.md\n",
            "main",
            "https://github.com/example/artifact",
            "/tmp/artifact",
        )
    }

    #[test]
    fn test_changes_committed_scenario() {
        let e1 = ChangesCommitted::new("initial", change_c(), "abc123", None).unwrap();
        let e2 = ChangesCommitted::new("different text", change_c(), "abc123", None).unwrap();

        assert_eq!(e1.identifier(), e2.identifier());
        assert_eq!(e1, e2);

        let e3 = ChangesCommitted::new("m", change_c2(), "def456", Some(e1.identifier())).unwrap();

        assert_eq!(e3.previous_event_identifiers(), [e1.identifier().to_string()]);
        assert_ne!(e3.identifier(), e1.identifier());
        assert!(e1.previous_event_identifiers().is_empty());
    }

    #[test]
    fn test_determinism() {
        let a = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let b = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();

        assert_eq!(a.identifier(), b.identifier());
        assert_eq!(a.mode(), ConstructionMode::Fresh);
    }

    #[test]
    fn test_identifier_matches_derivation() {
        let event = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();

        let expected = derive_identifier(
            "ChangesCommitted",
            &[serde_json::to_value(change_c()).unwrap(), json!("abc123")],
        )
        .unwrap();

        assert_eq!(event.identifier(), expected);
    }

    #[test]
    fn test_value_equality_and_hash() {
        let a = ChangesCommitted::new("one", change_c(), "abc123", None).unwrap();
        let b = ChangesCommitted::new("two", change_c(), "abc123", Some("request-1")).unwrap();
        let c = ChangesCommitted::new("one", change_c(), "fff000", None).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = vec![a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_plain_attribute_does_not_change_identifier() {
        let a = ChangesCommitted::new("before", change_c(), "abc123", None).unwrap();
        let b = ChangesCommitted::new("after", change_c(), "abc123", None).unwrap();

        assert_eq!(a.identifier(), b.identifier());
        assert_ne!(a.message(), b.message());
    }

    #[test]
    fn test_primary_key_change_changes_identifier() {
        let a = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let b = ChangesCommitted::new("m", change_c2(), "abc123", None).unwrap();

        assert_ne!(a.identifier(), b.identifier());
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_type_participates_in_identity() {
        let plain = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let artifact = ArtifactChangesCommitted::new("m", change_c(), "abc123", None).unwrap();

        assert_ne!(plain.identifier(), artifact.identifier());
        assert_eq!(
            ChangesCommitted::classification(),
            ArtifactChangesCommitted::classification()
        );
    }

    #[test]
    fn test_causality_from_request() {
        let request = ChangeStagingCodeDescribed::new(change_c(), "nix develop --command git add -A", vec![]).unwrap();
        let committed = ChangesCommitted::new("m", change_c(), "abc123", Some(request.identifier())).unwrap();

        assert_eq!(committed.previous_event_identifiers(), [request.identifier().to_string()]);
    }

    #[test]
    fn test_empty_request_identifier_rejected() {
        let err = ChangesCommitted::new("m", change_c(), "abc123", Some("")).unwrap_err();
        assert!(matches!(err, EventError::EmptyParentIdentifier { position: 0, .. }));
    }

    #[test]
    fn test_reconstruction_fidelity() {
        let body = CommittedChanges::new("m", change_c(), "abc123");
        let event = ChangesCommitted::rehydrate(
            "externally-assigned",
            vec!["parent-a".to_string(), "parent-b".to_string()],
            body,
        )
        .unwrap();

        assert_eq!(event.mode(), ConstructionMode::Reconstructed);
        assert_eq!(event.identifier(), "externally-assigned");
        assert_eq!(
            event.previous_event_identifiers(),
            ["parent-a".to_string(), "parent-b".to_string()]
        );
        assert_eq!(event.message(), "m");
        assert_eq!(event.change(), &change_c());
        assert_eq!(event.commit(), "abc123");

        // Supplied identity is kept even though derivation would disagree
        assert_ne!(event.recompute_identifier().unwrap(), "externally-assigned");
    }

    #[test]
    fn test_reconstruction_requires_identifier() {
        let body = CommittedChanges::new("m", change_c(), "abc123");
        let err = ChangesCommitted::rehydrate("", vec![], body).unwrap_err();

        assert!(matches!(err, EventError::MissingIdentifier { .. }));
    }

    #[test]
    fn test_reconstructed_equals_fresh_by_primary_key() {
        let fresh = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let rebuilt = ChangesCommitted::rehydrate(
            "other-id",
            vec![],
            CommittedChanges::new("x", change_c(), "abc123"),
        )
        .unwrap();

        assert_eq!(fresh, rebuilt);
    }

    #[test]
    fn test_record_round_trip_preserves_identity() {
        let request = ChangeStagingCodeDescribed::new(change_c(), "git add -A", vec![]).unwrap();
        let original = ChangesCommitted::new("initial", change_c(), "abc123", Some(request.identifier())).unwrap();

        let json = serialize_record(&EventRecord::capture(&original).unwrap()).unwrap();
        let record = deserialize_record(&json).unwrap();
        let rebuilt = ChangesCommitted::from_record(&record).unwrap();

        assert_eq!(rebuilt.mode(), ConstructionMode::Reconstructed);
        assert_eq!(rebuilt.identifier(), original.identifier());
        assert_eq!(rebuilt.previous_event_identifiers(), original.previous_event_identifiers());
        assert_eq!(rebuilt.message(), "initial");
        assert_eq!(rebuilt, original);
        assert_eq!(record.attributes.get("commit"), Some(&json!("abc123")));
    }

    #[test]
    fn test_record_type_mismatch() {
        let original = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let record = EventRecord::capture(&original).unwrap();

        let err = ArtifactChangesCommitted::from_record(&record).unwrap_err();
        assert!(matches!(err, EventError::TypeMismatch { .. }));
    }

    #[test]
    fn test_record_missing_attribute() {
        let original = ChangesCommitted::new("m", change_c(), "abc123", None).unwrap();
        let mut record = EventRecord::capture(&original).unwrap();
        record.attributes.remove("commit");

        let err = ChangesCommitted::from_record(&record).unwrap_err();
        assert!(matches!(err, EventError::MissingAttribute { .. }));
    }

    #[test]
    fn test_attribute_accessors_by_name() {
        let event = ChangesCommitted::new("hello", change_c(), "abc123", None).unwrap();

        assert_eq!(event.attribute("message").unwrap(), Some(json!("hello")));
        assert_eq!(event.attribute("commit").unwrap(), Some(json!("abc123")));
        assert_eq!(event.attribute("unknown").unwrap(), None);

        let keys = event.primary_key_values().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1], json!("abc123"));
    }

    #[test]
    fn test_staging_request_identity() {
        let a = ChangeStagingCodeDescribed::new(change_c(), "code one", vec![]).unwrap();
        let b = ChangeStagingCodeDescribed::new(change_c(), "code two", vec![]).unwrap();

        assert_eq!(a.identifier(), b.identifier());
        assert_eq!(a, b);
        assert_eq!(a.code(), "code one");

        let record = EventRecord::capture(&a).unwrap();
        let rebuilt = ChangeStagingCodeDescribed::from_record(&record).unwrap();
        assert_eq!(rebuilt.identifier(), a.identifier());
        assert_eq!(rebuilt.code(), "code one");
    }

    #[test]
    fn test_concurrent_construction() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    ChangesCommitted::new(format!("thread {i}"), change_c(), "abc123", None)
                        .unwrap()
                        .identifier()
                        .to_string()
                })
            })
            .collect();

        let ids: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_artifact_changes_committed_equality_and_hash() {
        let a = ArtifactChangesCommitted::new("one", change_c(), "abc123", None).unwrap();
        let b = ArtifactChangesCommitted::new("two", change_c(), "abc123", Some("request-1")).unwrap();
        let c = ArtifactChangesCommitted::new("one", change_c2(), "abc123", None).unwrap();

        assert_eq!(a.identifier(), b.identifier());
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = vec![a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_artifact_changes_committed_causality() {
        let request = ChangeStagingCodeDescribed::new(change_c(), "git add -A", vec![]).unwrap();
        let committed =
            ArtifactChangesCommitted::new("m", change_c(), "abc123", Some(request.identifier())).unwrap();

        assert_eq!(committed.previous_event_identifiers(), [request.identifier().to_string()]);
        assert_eq!(committed.mode(), ConstructionMode::Fresh);
    }

    #[test]
    fn test_artifact_changes_committed_record_round_trip() {
        let original = ArtifactChangesCommitted::new("initial", change_c(), "abc123", Some("request-1")).unwrap();

        let json = serialize_record(&EventRecord::capture(&original).unwrap()).unwrap();
        let record = deserialize_record(&json).unwrap();
        assert_eq!(record.event_type, "ArtifactChangesCommitted");

        let rebuilt = ArtifactChangesCommitted::from_record(&record).unwrap();

        assert_eq!(rebuilt.mode(), ConstructionMode::Reconstructed);
        assert_eq!(rebuilt.identifier(), original.identifier());
        assert_eq!(rebuilt.previous_event_identifiers(), ["request-1".to_string()]);
        assert_eq!(rebuilt.message(), "initial");
        assert_eq!(rebuilt.commit(), "abc123");
        assert_eq!(rebuilt, original);

        let err = ChangesCommitted::from_record(&record).unwrap_err();
        assert!(matches!(err, EventError::TypeMismatch { .. }));
    }

    #[test]
    fn test_artifact_changes_committed_rehydrate() {
        let event = ArtifactChangesCommitted::rehydrate(
            "externally-assigned",
            vec!["parent".to_string()],
            CommittedChanges::new("m", change_c(), "abc123"),
        )
        .unwrap();

        assert_eq!(event.identifier(), "externally-assigned");
        assert_eq!(event.mode(), ConstructionMode::Reconstructed);

        let err = ArtifactChangesCommitted::rehydrate("", vec![], CommittedChanges::new("m", change_c(), "abc123"))
            .unwrap_err();
        assert!(matches!(err, EventError::MissingIdentifier { .. }));
    }

    #[test]
    fn test_staging_request_equality_and_hash() {
        let a = ChangeStagingCodeDescribed::new(change_c(), "one", vec![]).unwrap();
        let b = ChangeStagingCodeDescribed::new(change_c(), "two", vec!["parent".to_string()]).unwrap();
        let c = ChangeStagingCodeDescribed::new(change_c2(), "one", vec![]).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = vec![a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
