use std::sync::Arc;

use pip_bounds::{BoundsAlgorithm, BoundsState};
use pip_config::PipConfig;

use crate::{
    Collaborators, ExpandHandler, PipContext, PipScheduler, PipTransitionRouter, TransitionState,
};

/// Composition root: one scheduler, one expand handler and the router in
/// front of them, all sharing a [`PipContext`].
///
/// Collaborators are owned by the caller and only referenced here, so the
/// shell can be dropped and rebuilt without touching them.
#[derive(Clone)]
pub struct PipShell {
    /// Shared state.
    ctx: PipContext,
    /// Request entry point.
    scheduler: PipScheduler,
    /// Expand executor.
    expand: ExpandHandler,
    /// Transition-manager callback entry point.
    router: PipTransitionRouter,
}

impl PipShell {
    /// Wire a shell from `config` and `collab`.
    pub fn new(config: Arc<PipConfig>, collab: Collaborators) -> Self {
        let ctx = PipContext::new(config, collab);
        let scheduler = PipScheduler::new(ctx.clone());
        let expand = ExpandHandler::new(ctx.clone());
        let router = PipTransitionRouter::new(ctx.clone(), scheduler.clone(), expand.clone());
        Self {
            ctx,
            scheduler,
            expand,
            router,
        }
    }

    /// Shared context.
    pub fn context(&self) -> &PipContext {
        &self.ctx
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &PipScheduler {
        &self.scheduler
    }

    /// The expand executor.
    pub fn expand_handler(&self) -> &ExpandHandler {
        &self.expand
    }

    /// The router the transition manager calls back into.
    pub fn router(&self) -> &PipTransitionRouter {
        &self.router
    }

    /// Lifecycle ledger.
    pub fn transition_state(&self) -> &TransitionState {
        &self.ctx.transition_state
    }

    /// Geometry ledger.
    pub fn bounds_state(&self) -> &BoundsState {
        &self.ctx.bounds_state
    }

    /// Geometry calculations.
    pub fn algorithm(&self) -> &BoundsAlgorithm {
        &self.ctx.algorithm
    }
}
