use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use causal_events::domain::artifact::{Change, ChangeStagingCodeDescribed, ChangesCommitted};
use causal_events::event_sourcing::{deserialize_record, serialize_record, DomainEvent, EventRecord, Rehydrate};

fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,causal_events=debug"))
        )
        .init();

    tracing::info!("Starting causal events demo");

    let change = Change::new(
        "--- a/flake.nix\n+++ b/flake.nix\n@@ -1 +1 @@\n-old\n+new\n",
        "main",
        "https://github.com/example/artifact",
        "/tmp/artifact",
    );

    // === 1. Request event (root, no causal parents) ===
    let request = ChangeStagingCodeDescribed::new(change.clone(), "git add --all", vec![])?;
    tracing::info!(identifier = request.identifier(), "Staging code described");

    // === 2. Commit caused by the request ===
    let committed = ChangesCommitted::new("initial", change.clone(), "abc123", Some(request.identifier()))?;
    tracing::info!(
        identifier = committed.identifier(),
        caused_by = ?committed.previous_event_identifiers(),
        "Changes committed"
    );

    // === 3. Same primary key, different message: same identity ===
    let duplicate = ChangesCommitted::new("reworded", change, "abc123", None)?;
    tracing::info!(
        same_identifier = duplicate.identifier() == committed.identifier(),
        equal = duplicate == committed,
        "Independently constructed duplicate"
    );

    // === 4. Capture and rebuild without recomputation ===
    let json = serialize_record(&EventRecord::capture(&committed)?)?;
    let rebuilt = ChangesCommitted::from_record(&deserialize_record(&json)?)?;
    tracing::info!(
        identifier = rebuilt.identifier(),
        mode = ?rebuilt.mode(),
        "Event rebuilt from record"
    );

    tracing::info!("Demo complete");

    Ok(())
}
