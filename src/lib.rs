//! Domain events with content-derived identity and explicit causal links.
//!
//! `event_sourcing` holds the generic core (classification, identifier
//! derivation, event core, records); `domain` holds concrete events.

pub mod domain;
pub mod event_sourcing;
