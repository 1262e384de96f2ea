//! Mock collaborators for tests (enabled with the `test-utils` feature).
//!
//! Every mock appends a short line to a shared [`CallLog`], so a test can
//! assert on the interleaving of animator, composer and latency calls.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::Mutex;
use pip_bounds::{DisplayLayout, PipParams};
use pip_config::PipConfig;
use pip_geom::Rect;
use pip_ids::{ComponentId, ContainerToken, DisplayId, SurfaceId, TaskId, TransitionHandle};

use crate::{
    AlphaAnimationSpec, Animator, AnimatorCallbacks, AnimatorFactory, BoundsAnimationSpec,
    Collaborators, DesktopWindowing, DisplayLayoutProvider, FinishCallback, Handled,
    HierarchyTransaction, InteractionKind, LatencyTracker, PipShell, PipTask, SplitPosition,
    SplitScreen, SurfaceComposer, SurfaceTransaction, TaskInfo, TransitionChange,
    TransitionInfo, TransitionManager, TransitionType,
};

/// Shared, ordered record of mock calls.
#[derive(Clone, Default)]
pub struct CallLog {
    /// Recorded lines.
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn note(&self, s: impl Into<String>) {
        self.calls.lock().push(s.into());
    }

    /// Snapshot of every line.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// True when some line equals `s`.
    pub fn contains(&self, s: &str) -> bool {
        self.calls.lock().iter().any(|x| x == s)
    }

    /// Number of lines equal to `s`.
    pub fn count(&self, s: &str) -> usize {
        self.calls.lock().iter().filter(|x| *x == s).count()
    }

    /// Index of the first line equal to `s`.
    pub fn position(&self, s: &str) -> Option<usize> {
        self.calls.lock().iter().position(|x| x == s)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Transition manager handing out sequential handles.
#[derive(Clone, Default)]
pub struct MockTransitionManager {
    /// Shared call log.
    log: CallLog,
    /// Next handle value.
    next: Arc<AtomicU64>,
    /// Every submission.
    submitted: Arc<Mutex<Vec<(TransitionHandle, TransitionType, HierarchyTransaction)>>>,
}

impl MockTransitionManager {
    /// Manager writing to `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            next: Arc::new(AtomicU64::new(1)),
            submitted: Arc::default(),
        }
    }

    /// Every submission in order.
    pub fn submitted(&self) -> Vec<(TransitionHandle, TransitionType, HierarchyTransaction)> {
        self.submitted.lock().clone()
    }

    /// The latest submission.
    pub fn last(&self) -> Option<(TransitionHandle, TransitionType, HierarchyTransaction)> {
        self.submitted.lock().last().cloned()
    }
}

impl TransitionManager for MockTransitionManager {
    fn start_transition(&self, kind: TransitionType, txn: HierarchyTransaction) -> TransitionHandle {
        let handle = TransitionHandle::new(self.next.fetch_add(1, Ordering::SeqCst));
        self.log.note(format!("start_transition {kind}"));
        self.submitted.lock().push((handle, kind, txn));
        handle
    }
}

/// Split-screen controller with a configurable set of split tasks.
#[derive(Clone, Default)]
pub struct MockSplitScreen {
    /// Shared call log.
    log: CallLog,
    /// Tasks hosted in a split stage.
    in_split: Arc<Mutex<Vec<TaskId>>>,
}

impl MockSplitScreen {
    /// Controller writing to `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            in_split: Arc::default(),
        }
    }

    /// Mark `task` as hosted in a split stage.
    pub fn set_in_split(&self, task: TaskId) {
        self.in_split.lock().push(task);
    }
}

impl SplitScreen for MockSplitScreen {
    fn is_task_in_split_screen(&self, task: TaskId) -> bool {
        self.in_split.lock().contains(&task)
    }

    fn prepare_enter_split_screen(
        &self,
        _txn: &mut HierarchyTransaction,
        task: &TaskInfo,
        position: SplitPosition,
    ) {
        self.log
            .note(format!("split.prepare {} {position:?}", task.task_id));
    }

    fn finish_enter_split_screen(&self, _finish: &mut SurfaceTransaction) {
        self.log.note("split.finish");
    }
}

/// Desktop-windowing controller with a single switch.
#[derive(Clone, Default)]
pub struct MockDesktop {
    /// Desktop mode switch.
    active: Arc<AtomicBool>,
}

impl MockDesktop {
    /// Toggle desktop mode on every display.
    pub fn set_active(&self, v: bool) {
        self.active.store(v, Ordering::SeqCst);
    }
}

impl DesktopWindowing for MockDesktop {
    fn is_desktop_mode_active(&self, _display: DisplayId) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Display provider returning a settable layout.
#[derive(Clone, Default)]
pub struct MockDisplay {
    /// Reported layout.
    layout: Arc<Mutex<DisplayLayout>>,
}

impl MockDisplay {
    /// Replace the reported layout.
    pub fn set_layout(&self, layout: DisplayLayout) {
        *self.layout.lock() = layout;
    }
}

impl DisplayLayoutProvider for MockDisplay {
    fn display_layout(&self) -> DisplayLayout {
        self.layout.lock().clone()
    }
}

/// Latency tracker logging begin and end.
#[derive(Clone, Default)]
pub struct MockLatencyTracker {
    /// Shared call log.
    log: CallLog,
}

impl LatencyTracker for MockLatencyTracker {
    fn begin(&self, _surface: SurfaceId, kind: InteractionKind) {
        self.log.note(format!("latency.begin {kind}"));
    }

    fn end(&self, kind: InteractionKind) {
        self.log.note(format!("latency.end {kind}"));
    }
}

/// Composer keeping every applied transaction.
#[derive(Clone, Default)]
pub struct MockSurfaceComposer {
    /// Shared call log.
    log: CallLog,
    /// Applied transactions.
    applied: Arc<Mutex<Vec<SurfaceTransaction>>>,
}

impl MockSurfaceComposer {
    /// Every applied transaction in order.
    pub fn applied(&self) -> Vec<SurfaceTransaction> {
        self.applied.lock().clone()
    }
}

impl SurfaceComposer for MockSurfaceComposer {
    fn apply(&self, txn: SurfaceTransaction) {
        self.log.note("composer.apply");
        self.applied.lock().push(txn);
    }
}

/// Animator that never ticks: tests drive it with [`Animator::end`].
pub struct MockAnimator {
    /// Log label.
    name: String,
    /// Shared call log.
    log: CallLog,
    /// Start was called.
    started: AtomicBool,
    /// Ended or cancelled.
    ended: AtomicBool,
    /// Pending lifecycle callbacks.
    callbacks: Mutex<AnimatorCallbacks>,
}

impl MockAnimator {
    /// Label used in the call log, e.g. `bounds#3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once ended or cancelled.
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

impl Animator for MockAnimator {
    fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.log.note(format!("{} start", self.name));
        let cb = self.callbacks.lock().take_start();
        if let Some(cb) = cb {
            cb();
        }
    }

    fn end(&self) {
        if self.is_ended() {
            return;
        }
        self.start();
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        self.log.note(format!("{} end", self.name));
        let cb = self.callbacks.lock().take_end();
        if let Some(cb) = cb {
            cb();
        }
    }

    fn cancel(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        self.log.note(format!("{} cancel", self.name));
        drop(self.callbacks.lock().take_end());
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.is_ended()
    }

    fn is_running(&self) -> bool {
        self.is_started()
    }
}

/// Factory producing [`MockAnimator`]s and recording their specs.
#[derive(Clone, Default)]
pub struct MockAnimatorFactory {
    /// Shared call log.
    log: CallLog,
    /// Animators built so far.
    next: Arc<AtomicU64>,
    /// Built animators.
    animators: Arc<Mutex<Vec<Arc<MockAnimator>>>>,
    /// Bounds specs.
    bounds_specs: Arc<Mutex<Vec<BoundsAnimationSpec>>>,
    /// Alpha specs.
    alpha_specs: Arc<Mutex<Vec<AlphaAnimationSpec>>>,
}

impl MockAnimatorFactory {
    /// Build and remember one animator.
    fn make(&self, kind: &str, callbacks: AnimatorCallbacks) -> Arc<MockAnimator> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let a = Arc::new(MockAnimator {
            name: format!("{kind}#{n}"),
            log: self.log.clone(),
            started: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            callbacks: Mutex::new(callbacks),
        });
        self.animators.lock().push(a.clone());
        a
    }

    /// Every animator built so far.
    pub fn animators(&self) -> Vec<Arc<MockAnimator>> {
        self.animators.lock().clone()
    }

    /// The most recently built animator.
    pub fn last(&self) -> Option<Arc<MockAnimator>> {
        self.animators.lock().last().cloned()
    }

    /// Animators started and not yet ended.
    pub fn running(&self) -> usize {
        self.animators
            .lock()
            .iter()
            .filter(|a| a.is_started())
            .count()
    }

    /// Specs of bounds animators in order.
    pub fn bounds_specs(&self) -> Vec<BoundsAnimationSpec> {
        self.bounds_specs.lock().clone()
    }

    /// Specs of alpha animators in order.
    pub fn alpha_specs(&self) -> Vec<AlphaAnimationSpec> {
        self.alpha_specs.lock().clone()
    }
}

impl AnimatorFactory for MockAnimatorFactory {
    fn bounds(&self, spec: BoundsAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator> {
        self.bounds_specs.lock().push(spec);
        self.make("bounds", callbacks)
    }

    fn alpha(&self, spec: AlphaAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator> {
        self.alpha_specs.lock().push(spec);
        self.make("alpha", callbacks)
    }
}

/// All mocks sharing one [`CallLog`].
#[derive(Clone)]
pub struct MockEnv {
    /// Shared call log.
    pub log: CallLog,
    /// Transition manager.
    pub transitions: MockTransitionManager,
    /// Split-screen controller.
    pub split: MockSplitScreen,
    /// Desktop-windowing controller.
    pub desktop: MockDesktop,
    /// Display provider.
    pub display: MockDisplay,
    /// Latency tracker.
    pub latency: MockLatencyTracker,
    /// Surface composer.
    pub composer: MockSurfaceComposer,
    /// Animator factory.
    pub animators: MockAnimatorFactory,
}

impl Default for MockEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnv {
    /// Fresh mocks on the default 1080x2400 display.
    pub fn new() -> Self {
        let log = CallLog::new();
        Self {
            transitions: MockTransitionManager::new(log.clone()),
            split: MockSplitScreen::new(log.clone()),
            desktop: MockDesktop::default(),
            display: MockDisplay::default(),
            latency: MockLatencyTracker { log: log.clone() },
            composer: MockSurfaceComposer {
                log: log.clone(),
                applied: Arc::default(),
            },
            animators: MockAnimatorFactory {
                log: log.clone(),
                ..MockAnimatorFactory::default()
            },
            log,
        }
    }

    /// Collaborators backed by these mocks.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            transitions: Arc::new(self.transitions.clone()),
            composer: Arc::new(self.composer.clone()),
            animators: Arc::new(self.animators.clone()),
            latency: Arc::new(self.latency.clone()),
            display: Arc::new(self.display.clone()),
            split: Some(Arc::new(self.split.clone())),
            desktop: Some(Arc::new(self.desktop.clone())),
        }
    }

    /// A shell with the default configuration.
    pub fn shell(&self) -> PipShell {
        self.shell_with(PipConfig::default())
    }

    /// A shell with `config`.
    pub fn shell_with(&self, config: PipConfig) -> PipShell {
        PipShell::new(Arc::new(config), self.collaborators())
    }
}

/// Token of the task built by [`pip_task`].
pub const TASK_TOKEN: ContainerToken = ContainerToken::new(0x70);
/// Leash passed by the helpers.
pub const LEASH: SurfaceId = SurfaceId::new(7);

/// A fullscreen task with `params`, id 42, on the default display.
pub fn pip_task(params: PipParams) -> PipTask {
    PipTask {
        token: TASK_TOKEN,
        info: TaskInfo {
            task_id: TaskId::new(42),
            component: ComponentId::new("com.example.player", "PlayerActivity"),
            display: DisplayId::DEFAULT,
            bounds: Rect::new(0.0, 0.0, 1080.0, 2400.0),
            last_parent_task: None,
            params,
        },
    }
}

/// Ready geometry for the test task moving from `start` to `end`.
pub fn ready_info(kind: TransitionType, start: Rect, end: Rect) -> TransitionInfo {
    TransitionInfo::new(kind).with_change(TransitionChange::new(TASK_TOKEN, LEASH, start, end))
}

/// Records whether and how often a finish callback ran.
#[derive(Clone, Default)]
pub struct FinishProbe {
    /// Invocations.
    calls: Arc<AtomicU64>,
}

impl FinishProbe {
    /// A finish callback bumping this probe.
    pub fn callback(&self) -> FinishCallback {
        let calls = self.calls.clone();
        Box::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Number of times a callback from this probe ran.
    pub fn count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Deliver `info` for `handle` through the shell's router with empty start
/// and finish transactions.
pub fn deliver(
    shell: &PipShell,
    handle: TransitionHandle,
    info: &TransitionInfo,
    probe: &FinishProbe,
) -> Option<Handled> {
    shell.router().start_animation(
        handle,
        info,
        SurfaceTransaction::new(),
        SurfaceTransaction::new(),
        probe.callback(),
    )
}
