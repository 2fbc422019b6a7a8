use std::sync::Arc;

use tokio::sync::Mutex;

use stockroom_infra::{InventoryStore, StoreConfig, open_store};
use stockroom_session::{InventorySession, SessionError};

/// The process-wide session. The mutex serializes requests so each
/// read-then-write sequence completes before the next begins.
pub type SharedSession = Arc<Mutex<InventorySession<Arc<dyn InventoryStore>>>>;

/// Wrap a store in a freshly loaded session.
///
/// A failed initial load is logged and leaves the list empty; the session
/// stays usable and `POST /inventory/refresh` retries.
pub async fn session_for(store: Arc<dyn InventoryStore>) -> SharedSession {
    let mut session = InventorySession::new(store);
    if let Err(err) = session.refresh().await {
        tracing::warn!(error = %err, "initial inventory load failed; starting empty");
    }
    Arc::new(Mutex::new(session))
}

/// Open the configured store and start a session on it.
pub async fn open_session(config: &StoreConfig) -> Result<SharedSession, SessionError> {
    let store = open_store(config).await?;
    Ok(session_for(store).await)
}
