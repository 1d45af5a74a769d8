// ============================================================================
// Domain Layer - Concrete Events
// ============================================================================
//
// Each subdirectory holds the value objects and events of one domain.
// Concrete events declare their attributes and thread values and causal
// parents into the generic event core; they never alter identity rules.
//
// ============================================================================

pub mod artifact;
