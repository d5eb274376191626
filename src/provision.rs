//! Environment provisioning.
//!
//! Resets an engine's target database to an empty state by running the
//! engine's provisioning plan. Running it twice leaves the same state.

use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::Result;

/// Drops and recreates the engine's target database.
pub async fn provision(engine: &Engine) -> Result<()> {
    let plan = engine.adapter.dialect().provision_plan(&engine.target);

    for step in &plan {
        let outcome = engine.adapter.execute(&step.statement, &step.target).await;
        match outcome {
            Ok(_) => {}
            Err(e) if step.tolerate_failure => {
                warn!(
                    engine = engine.name(),
                    "Could not run `{}` (the database may not exist): {e}", step.statement
                );
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        engine = engine.name(),
        "Database '{}' has been set up", engine.target.database
    );
    Ok(())
}
