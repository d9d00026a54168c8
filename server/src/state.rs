use std::sync::Arc;

use crate::chat::router::ChatRouter;

/// Shared application state passed to all handlers via axum's State
/// extractor. Created once in main.rs.
#[derive(Clone)]
pub struct AppState {
    /// Event router owning the presence registry, the persistence log,
    /// and the user directory.
    pub router: Arc<ChatRouter>,
}
