use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedState<S> = Arc<AppState<S>>;

pub struct AppState<S> {
    pub store: S,
    /// Single-writer gate. All appends serialize here so the
    /// read-modify-write on the frontier is race-free regardless of the
    /// backend's isolation level.
    pub gate: Mutex<()>,
}

impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }
}
