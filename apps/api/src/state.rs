use std::sync::Arc;

use crate::store::SkillStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable skill store. Production: `PgSkillStore` over the Postgres
    /// pool; handler tests swap in an in-memory mock.
    pub store: Arc<dyn SkillStore>,
}
