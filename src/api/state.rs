use crate::simulation::MeshState;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// The simulation, shared with the settlement task
    pub mesh: MeshState,
}

impl AppState {
    pub fn new(mesh: MeshState) -> Self {
        Self { mesh }
    }
}
