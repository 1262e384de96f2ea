use std::sync::Arc;

use pip_bounds::{BoundsAlgorithm, BoundsState};
use pip_config::PipConfig;

use crate::{AnimationSlot, Collaborators, TransitionRegistry, TransitionState};

/// State and capabilities shared by the scheduler and the executors.
///
/// Every field is a cheap handle; cloning the context shares the underlying
/// state.
#[derive(Clone)]
pub struct PipContext {
    /// Tunables.
    pub config: Arc<PipConfig>,
    /// Injected collaborators.
    pub collab: Collaborators,
    /// Lifecycle ledger.
    pub transition_state: TransitionState,
    /// Geometry ledger.
    pub bounds_state: BoundsState,
    /// Geometry calculations over `bounds_state`.
    pub algorithm: BoundsAlgorithm,
    /// The single in-flight animation on the pinned leash.
    pub slot: AnimationSlot,
    /// Submitted transitions.
    pub registry: TransitionRegistry,
}

impl PipContext {
    /// Fresh state for the display reported by `collab`.
    pub fn new(config: Arc<PipConfig>, collab: Collaborators) -> Self {
        let bounds_state = BoundsState::new(collab.display.display_layout());
        let algorithm = BoundsAlgorithm::new(config.clone(), bounds_state.clone());
        algorithm.update_size_limits();
        Self {
            config,
            collab,
            transition_state: TransitionState::new(),
            bounds_state,
            algorithm,
            slot: AnimationSlot::new(),
            registry: TransitionRegistry::new(),
        }
    }
}
