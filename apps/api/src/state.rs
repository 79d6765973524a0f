use std::sync::Arc;

use crate::config::Config;
use crate::notify::Mailer;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Document store. Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn DocumentStore>,
    /// Verification emails. Resend when an API key is configured.
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        Self {
            store: Arc::new(crate::store::MemoryDocumentStore::new()),
            mailer: Arc::new(crate::notify::LogMailer),
            config: Config::for_tests(),
        }
    }
}
