// File: src/test_utils/helpers.rs

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::db::Database;
use crate::Error;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process. Safe to call from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Fresh in-memory database with all migrations applied.
pub async fn setup_test_database() -> Result<Database, Error> {
    let db = Database::open_in_memory().await?;
    db.migrate().await?;
    Ok(db)
}
