// ============================================================================
// Artifact Domain - Change Staging & Commit Events
// ============================================================================
//
// - Value objects (Change)
// - Events (ChangeStagingCodeDescribed, ChangesCommitted,
//   ArtifactChangesCommitted)
//
// ============================================================================

pub mod value_objects;
pub mod events;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
