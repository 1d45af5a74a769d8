// ============================================================================
// Attribute Classification - Which Fields Carry Identity
// ============================================================================
//
// Each event type declares its fields once, in order. Primary-key fields
// feed identifier derivation and equality; plain fields are informational.
//
// Declaration order is significant: it fixes the order in which key
// values are hashed.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Plain,
    PrimaryKey,
}

/// Mutable declaration phase for a type's attributes
#[derive(Debug, Default, Clone)]
pub struct AttributeClassifier {
    attributes: Vec<(&'static str, AttributeKind)>,
}

impl AttributeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `field` as informational only
    pub fn mark_plain(&mut self, field: &'static str) -> &mut Self {
        self.mark(field, AttributeKind::Plain)
    }

    /// Register `field` as identity-bearing
    pub fn mark_primary_key(&mut self, field: &'static str) -> &mut Self {
        self.mark(field, AttributeKind::PrimaryKey)
    }

    // Re-marking keeps the original position; the last kind wins.
    fn mark(&mut self, field: &'static str, kind: AttributeKind) -> &mut Self {
        match self.attributes.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => {
                if entry.1 != kind {
                    tracing::debug!(field, from = ?entry.1, to = ?kind, "Attribute reclassified");
                }
                entry.1 = kind;
            }
            None => self.attributes.push((field, kind)),
        }
        self
    }

    /// Freeze the declarations
    ///
    /// Built once per event type, so a keyless declaration is reported once
    /// rather than on every construction.
    pub fn build(&self) -> Classification {
        let classification = Classification {
            attributes: self.attributes.clone(),
        };

        if classification.is_keyless() {
            let declared: Vec<_> = classification.plain_attributes().collect();
            tracing::warn!(
                ?declared,
                "Classification declares no primary-key attributes; every instance shares one identifier"
            );
        }

        classification
    }
}

/// Frozen, read-only classification of one event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    attributes: Vec<(&'static str, AttributeKind)>,
}

impl Classification {
    /// Primary-key field names in declaration order
    pub fn primary_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names_of(AttributeKind::PrimaryKey)
    }

    pub fn plain_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names_of(AttributeKind::Plain)
    }

    pub fn attributes(&self) -> &[(&'static str, AttributeKind)] {
        &self.attributes
    }

    pub fn kind_of(&self, field: &str) -> Option<AttributeKind> {
        self.attributes
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }

    /// A keyless type derives the same identifier for every instance
    pub fn is_keyless(&self) -> bool {
        self.primary_keys().next().is_none()
    }

    fn names_of(&self, kind: AttributeKind) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(move |(_, k)| *k == kind)
            .map(|(name, _)| *name)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
