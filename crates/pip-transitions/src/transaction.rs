//! Window-hierarchy and surface transactions exchanged with collaborators.

use std::fmt;

use pip_geom::{Matrix, Rect, Rotation};
use pip_ids::{ContainerToken, SurfaceId, TaskId};

/// Kind of transition requested from the transition manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionType {
    /// Task moves into PiP.
    EnterPip,
    /// Task expands out of PiP to its normal bounds.
    ExitPip,
    /// Task expands out of PiP into a split-screen stage.
    ExitPipToSplit,
    /// PiP task is dismissed.
    RemovePip,
    /// PiP bounds change with an animation.
    ResizePip,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EnterPip => "enter-pip",
            Self::ExitPip => "exit-pip",
            Self::ExitPipToSplit => "exit-pip-to-split",
            Self::RemovePip => "remove-pip",
            Self::ResizePip => "resize-pip",
        };
        f.write_str(s)
    }
}

/// Windowing mode assigned to a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowingMode {
    /// Inherit from the parent.
    Undefined,
    /// Full screen.
    Fullscreen,
    /// Picture-in-picture.
    Pinned,
    /// Free-floating desktop window.
    Freeform,
}

/// Bounds edit carried by a [`HierarchyChange`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundsUpdate {
    /// Set explicit bounds.
    Set(Rect),
    /// Drop explicit bounds so the container fills its parent.
    Clear,
}

/// Edits to a single container.
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyChange {
    /// Container being edited.
    pub token: ContainerToken,
    /// Bounds edit, if any.
    pub bounds: Option<BoundsUpdate>,
    /// Windowing mode edit, if any.
    pub windowing_mode: Option<WindowingMode>,
    /// Defer the configuration change until the transition ends.
    pub config_at_transition_end: bool,
    /// Remove the task entirely.
    pub remove: bool,
}

impl HierarchyChange {
    fn new(token: ContainerToken) -> Self {
        Self {
            token,
            bounds: None,
            windowing_mode: None,
            config_at_transition_end: false,
            remove: false,
        }
    }
}

/// A batch of window-hierarchy edits submitted with a transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HierarchyTransaction {
    /// Per-container edits, in first-touched order.
    changes: Vec<HierarchyChange>,
    /// Requested animation duration, carried as transition metadata.
    duration_ms: Option<u64>,
}

impl HierarchyTransaction {
    /// An empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit for `token`, created on first use.
    fn entry(&mut self, token: ContainerToken) -> &mut HierarchyChange {
        let idx = match self.changes.iter().position(|c| c.token == token) {
            Some(idx) => idx,
            None => {
                self.changes.push(HierarchyChange::new(token));
                self.changes.len() - 1
            }
        };
        &mut self.changes[idx]
    }

    /// Give `token` explicit bounds.
    pub fn set_bounds(&mut self, token: ContainerToken, bounds: Rect) -> &mut Self {
        self.entry(token).bounds = Some(BoundsUpdate::Set(bounds));
        self
    }

    /// Drop explicit bounds on `token`.
    pub fn clear_bounds(&mut self, token: ContainerToken) -> &mut Self {
        self.entry(token).bounds = Some(BoundsUpdate::Clear);
        self
    }

    /// Change the windowing mode of `token`.
    pub fn set_windowing_mode(&mut self, token: ContainerToken, mode: WindowingMode) -> &mut Self {
        self.entry(token).windowing_mode = Some(mode);
        self
    }

    /// Defer configuration of `token` until the transition ends.
    pub fn set_config_at_transition_end(
        &mut self,
        token: ContainerToken,
        deferred: bool,
    ) -> &mut Self {
        self.entry(token).config_at_transition_end = deferred;
        self
    }

    /// Remove the task behind `token`.
    pub fn remove_task(&mut self, token: ContainerToken) -> &mut Self {
        self.entry(token).remove = true;
        self
    }

    /// Tag the transaction with an animation duration.
    pub fn set_duration_ms(&mut self, duration_ms: u64) -> &mut Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Requested animation duration, if tagged.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// All edits.
    pub fn changes(&self) -> &[HierarchyChange] {
        &self.changes
    }

    /// Edit for `token`, if any.
    pub fn change_for(&self, token: ContainerToken) -> Option<&HierarchyChange> {
        self.changes.iter().find(|c| c.token == token)
    }

    /// True when no edits are present.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// One surface-level operation.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// Move a surface.
    SetPosition {
        /// Target surface.
        surface: SurfaceId,
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
    },
    /// Replace a surface's transform.
    SetMatrix {
        /// Target surface.
        surface: SurfaceId,
        /// New transform.
        matrix: Matrix,
    },
    /// Set or clear the crop window.
    SetCrop {
        /// Target surface.
        surface: SurfaceId,
        /// Crop in surface-local coordinates; `None` clears it.
        crop: Option<Rect>,
    },
    /// Set surface opacity.
    SetAlpha {
        /// Target surface.
        surface: SurfaceId,
        /// Opacity in `[0, 1]`.
        alpha: f32,
    },
    /// Make a surface visible.
    Show {
        /// Target surface.
        surface: SurfaceId,
    },
}

impl SurfaceOp {
    /// Surface the operation targets.
    pub fn surface(&self) -> SurfaceId {
        match self {
            Self::SetPosition { surface, .. }
            | Self::SetMatrix { surface, .. }
            | Self::SetCrop { surface, .. }
            | Self::SetAlpha { surface, .. }
            | Self::Show { surface } => *surface,
        }
    }
}

/// An ordered batch of surface operations applied atomically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceTransaction {
    /// Operations in application order.
    ops: Vec<SurfaceOp>,
}

impl SurfaceTransaction {
    /// An empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `surface` to `(x, y)`.
    pub fn set_position(&mut self, surface: SurfaceId, x: f64, y: f64) -> &mut Self {
        self.ops.push(SurfaceOp::SetPosition { surface, x, y });
        self
    }

    /// Replace the transform of `surface`.
    pub fn set_matrix(&mut self, surface: SurfaceId, matrix: Matrix) -> &mut Self {
        self.ops.push(SurfaceOp::SetMatrix { surface, matrix });
        self
    }

    /// Set or clear the crop of `surface`.
    pub fn set_crop(&mut self, surface: SurfaceId, crop: Option<Rect>) -> &mut Self {
        self.ops.push(SurfaceOp::SetCrop { surface, crop });
        self
    }

    /// Set the opacity of `surface`.
    pub fn set_alpha(&mut self, surface: SurfaceId, alpha: f32) -> &mut Self {
        self.ops.push(SurfaceOp::SetAlpha { surface, alpha });
        self
    }

    /// Show `surface`.
    pub fn show(&mut self, surface: SurfaceId) -> &mut Self {
        self.ops.push(SurfaceOp::Show { surface });
        self
    }

    /// Append all operations of `other`.
    pub fn merge(&mut self, other: Self) -> &mut Self {
        self.ops.extend(other.ops);
        self
    }

    /// Operations in order.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// True when no operations are present.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Completion callback handed over with a ready transition. Any returned
/// hierarchy transaction is applied by the transition manager on finish.
pub type FinishCallback = Box<dyn FnOnce(Option<HierarchyTransaction>) + Send>;

/// One participant in a transition as reported by the transition manager.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionChange {
    /// Container that changed, if it is a task-level container.
    pub container: Option<ContainerToken>,
    /// Container that hosted this one before the transition.
    pub last_parent: Option<ContainerToken>,
    /// Task id, when the change is a task.
    pub task_id: Option<TaskId>,
    /// Surface animated for this change.
    pub leash: SurfaceId,
    /// Absolute bounds before the transition.
    pub start_abs_bounds: Rect,
    /// Absolute bounds after the transition.
    pub end_abs_bounds: Rect,
    /// Fixed rotation the destination is laid out in, when it differs from
    /// the display.
    pub end_fixed_rotation: Option<Rotation>,
}

impl TransitionChange {
    /// A change for `container` animated through `leash`.
    pub fn new(container: ContainerToken, leash: SurfaceId, start: Rect, end: Rect) -> Self {
        Self {
            container: Some(container),
            last_parent: None,
            task_id: None,
            leash,
            start_abs_bounds: start,
            end_abs_bounds: end,
            end_fixed_rotation: None,
        }
    }
}

/// Concrete geometry delivered when a transition is ready to animate.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionInfo {
    /// Type the transition was requested with.
    pub kind: TransitionType,
    /// Participants.
    pub changes: Vec<TransitionChange>,
}

impl TransitionInfo {
    /// Info with no changes.
    pub fn new(kind: TransitionType) -> Self {
        Self {
            kind,
            changes: Vec::new(),
        }
    }

    /// Builder-style change append.
    #[must_use]
    pub fn with_change(mut self, change: TransitionChange) -> Self {
        self.changes.push(change);
        self
    }

    /// The change for `token`: the container itself, or else a child whose
    /// last parent is `token`.
    pub fn find_change(&self, token: ContainerToken) -> Option<&TransitionChange> {
        self.changes
            .iter()
            .find(|c| c.container == Some(token))
            .or_else(|| self.changes.iter().find(|c| c.last_parent == Some(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_to_one_container_share_a_change() {
        let token = ContainerToken::new(7);
        let mut txn = HierarchyTransaction::new();
        txn.set_bounds(token, Rect::new(0.0, 0.0, 10.0, 10.0))
            .set_config_at_transition_end(token, true)
            .set_windowing_mode(token, WindowingMode::Pinned);
        assert_eq!(txn.changes().len(), 1);
        let change = txn.change_for(token).unwrap();
        assert!(change.config_at_transition_end);
        assert_eq!(change.windowing_mode, Some(WindowingMode::Pinned));
    }

    #[test]
    fn find_change_prefers_container_over_last_parent() {
        let token = ContainerToken::new(1);
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut child = TransitionChange::new(ContainerToken::new(2), SurfaceId::new(20), r, r);
        child.last_parent = Some(token);
        let own = TransitionChange::new(token, SurfaceId::new(10), r, r);

        let info = TransitionInfo::new(TransitionType::ExitPip)
            .with_change(child.clone())
            .with_change(own);
        assert_eq!(info.find_change(token).map(|c| c.leash), Some(SurfaceId::new(10)));

        let info = TransitionInfo::new(TransitionType::ExitPip).with_change(child);
        assert_eq!(info.find_change(token).map(|c| c.leash), Some(SurfaceId::new(20)));
        assert!(info.find_change(ContainerToken::new(99)).is_none());
    }
}
