// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable event identity and causality.
// Domain-specific events are in src/domain/
//
// ============================================================================

pub mod core;

pub use self::core::*;
