use std::sync::Arc;

/// Shared state handed to every handler: the store and the path prefix the
/// entity routes are mounted under.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub base_path: Arc<str>,
}

// Manual impl: deriving would require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            base_path: Arc::clone(&self.base_path),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, base_path: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            base_path: base_path.into(),
        }
    }

    /// Canonical URL of one record, e.g. `/api/scientists/4`.
    pub fn resource_path(&self, collection: &str, id: impl std::fmt::Display) -> String {
        format!("{}/{}/{}", self.base_path, collection, id)
    }
}
