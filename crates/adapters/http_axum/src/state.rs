//! Shared application state for axum handlers.

use std::sync::Arc;

use habridge_app::event_bus::InProcessEventBus;
use habridge_app::services::registry::AccessoryRegistry;

/// State shared by every handler.
///
/// Generic over the remote server `R` and the host `H` the registry pushes
/// changes to.
pub struct AppState<R, H> {
    pub registry: Arc<AccessoryRegistry<R, H>>,
    /// Source of the SSE stream.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<R, H> Clone for AppState<R, H> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<R, H> AppState<R, H> {
    pub fn new(registry: Arc<AccessoryRegistry<R, H>>, event_bus: Arc<InProcessEventBus>) -> Self {
        Self {
            registry,
            event_bus,
        }
    }
}
