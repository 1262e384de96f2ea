//! Authoritative PiP geometry.
//!
//! [`BoundsState`] is a cheap, clonable handle. Every setter is a value
//! replacement that short-circuits when the value is unchanged, so listeners
//! only ever observe real changes. Listeners are invoked after the internal
//! lock is released and may call back into the state.

use std::sync::Arc;

use parking_lot::Mutex;
use pip_geom::{Rect, Size};
use pip_ids::ComponentId;
use tracing::{debug, trace};

use crate::DisplayLayout;

/// Saved position (and optionally size) restored when PiP is re-entered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReentryState {
    /// Snap fraction of the bounds at the time of saving.
    pub snap_fraction: f32,
    /// Size to restore, present only when the user had resized the window.
    pub size: Option<Size>,
}

/// Callback receiving the new current bounds.
pub type BoundsListener = Arc<dyn Fn(Rect) + Send + Sync>;
/// Callback receiving `(visible, height)` of the shelf or IME.
pub type InsetListener = Arc<dyn Fn(bool, f64) + Send + Sync>;
/// Callback receiving the effective minimum size.
pub type MinSizeListener = Arc<dyn Fn(Size) + Send + Sync>;

/// Registered change listeners, cloned out before invocation.
#[derive(Default)]
struct Listeners {
    /// Current-bounds observers.
    bounds: Vec<BoundsListener>,
    /// Shelf visibility observers.
    shelf: Vec<InsetListener>,
    /// IME visibility observers.
    ime: Vec<InsetListener>,
    /// Effective min-size observers.
    min_size: Vec<MinSizeListener>,
}

/// Visibility and height of a bottom obstruction (shelf or IME).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Obstruction {
    /// Showing on screen.
    visible: bool,
    /// Height in pixels, kept while hidden.
    height: f64,
}

impl Obstruction {
    /// Height to keep clear, or 0 when hidden.
    fn offset(self) -> f64 {
        if self.visible { self.height } else { 0.0 }
    }
}

/// Lock-protected geometry fields.
struct Inner {
    /// Current PiP bounds.
    bounds: Rect,
    /// Bounds of the task outside PiP.
    normal_bounds: Rect,
    /// Device minimum size.
    min_size: Size,
    /// Device maximum size.
    max_size: Size,
    /// App-requested minimum, never larger than `min_size`.
    override_min_size: Option<Size>,
    /// Position and size to restore on the next entry.
    reentry: Option<ReentryState>,
    /// Component that owns `reentry`.
    last_owning_component: Option<ComponentId>,
    /// Current aspect ratio.
    aspect_ratio: f32,
    /// Shelf obstruction.
    shelf: Obstruction,
    /// IME obstruction.
    ime: Obstruction,
    /// The user resized PiP since entry.
    has_user_resized: bool,
    /// The user moved PiP since entry.
    has_user_moved: bool,
    /// Display hosting PiP.
    display_layout: DisplayLayout,
    /// Registered observers.
    listeners: Listeners,
}

impl Inner {
    /// Override when valid, else the device minimum.
    fn effective_min_size(&self) -> Size {
        match self.override_min_size {
            Some(o) if !o.exceeds(&self.min_size) => o,
            _ => self.min_size,
        }
    }
}

/// Shared handle to the PiP geometry ledger.
#[derive(Clone)]
pub struct BoundsState {
    /// Shared geometry.
    inner: Arc<Mutex<Inner>>,
}

impl Default for BoundsState {
    fn default() -> Self {
        Self::new(DisplayLayout::default())
    }
}

impl BoundsState {
    /// Create an empty state for `display`.
    pub fn new(display: DisplayLayout) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bounds: Rect::default(),
                normal_bounds: Rect::default(),
                min_size: Size::default(),
                max_size: Size::default(),
                override_min_size: None,
                reentry: None,
                last_owning_component: None,
                aspect_ratio: 0.0,
                shelf: Obstruction::default(),
                ime: Obstruction::default(),
                has_user_resized: false,
                has_user_moved: false,
                display_layout: display,
                listeners: Listeners::default(),
            })),
        }
    }

    // ---- Accessors ----

    /// Last committed on-screen bounds.
    pub fn bounds(&self) -> Rect {
        self.inner.lock().bounds
    }

    /// Bounds the task occupies outside PiP; the expand target.
    pub fn normal_bounds(&self) -> Rect {
        self.inner.lock().normal_bounds
    }

    /// Device-derived minimum size.
    pub fn min_size(&self) -> Size {
        self.inner.lock().min_size
    }

    /// Device-derived maximum size.
    pub fn max_size(&self) -> Size {
        self.inner.lock().max_size
    }

    /// Caller-supplied minimum size, if accepted.
    pub fn override_min_size(&self) -> Option<Size> {
        self.inner.lock().override_min_size
    }

    /// Minimum size after applying a valid override.
    pub fn effective_min_size(&self) -> Size {
        self.inner.lock().effective_min_size()
    }

    /// Saved re-entry state, if any.
    pub fn reentry_state(&self) -> Option<ReentryState> {
        self.inner.lock().reentry
    }

    /// Component that last owned the PiP task.
    pub fn last_owning_component(&self) -> Option<ComponentId> {
        self.inner.lock().last_owning_component.clone()
    }

    /// Current aspect ratio (0 when unset).
    pub fn aspect_ratio(&self) -> f32 {
        self.inner.lock().aspect_ratio
    }

    /// Bottom offset from whichever of shelf and IME is taller and visible.
    pub fn bottom_obstruction(&self) -> f64 {
        let g = self.inner.lock();
        g.shelf.offset().max(g.ime.offset())
    }

    /// Whether the shelf is showing.
    pub fn is_shelf_showing(&self) -> bool {
        self.inner.lock().shelf.visible
    }

    /// Whether the IME is showing.
    pub fn is_ime_showing(&self) -> bool {
        self.inner.lock().ime.visible
    }

    /// Whether the user resized PiP during this instance.
    pub fn has_user_resized(&self) -> bool {
        self.inner.lock().has_user_resized
    }

    /// Whether the user moved PiP during this instance.
    pub fn has_user_moved(&self) -> bool {
        self.inner.lock().has_user_moved
    }

    /// Current display layout.
    pub fn display_layout(&self) -> DisplayLayout {
        self.inner.lock().display_layout.clone()
    }

    // ---- Setters ----

    /// Commit new on-screen bounds.
    pub fn set_bounds(&self, bounds: Rect) {
        let listeners = {
            let mut g = self.inner.lock();
            if g.bounds == bounds {
                return;
            }
            g.bounds = bounds;
            g.listeners.bounds.clone()
        };
        trace!(%bounds, "pip bounds changed");
        for l in listeners {
            l(bounds);
        }
    }

    /// Record the bounds the task would occupy outside PiP.
    pub fn set_normal_bounds(&self, bounds: Rect) {
        self.inner.lock().normal_bounds = bounds;
    }

    /// Replace the device-derived minimum size.
    pub fn set_min_size(&self, size: Size) {
        let notify = {
            let mut g = self.inner.lock();
            if g.min_size == size {
                return;
            }
            let before = g.effective_min_size();
            g.min_size = size;
            let after = g.effective_min_size();
            (before != after).then(|| (after, g.listeners.min_size.clone()))
        };
        if let Some((effective, listeners)) = notify {
            for l in listeners {
                l(effective);
            }
        }
    }

    /// Replace the device-derived maximum size.
    pub fn set_max_size(&self, size: Size) {
        self.inner.lock().max_size = size;
    }

    /// Apply a caller-supplied minimum size.
    ///
    /// An override wider or taller than the device minimum is ignored and the
    /// previous value retained.
    pub fn set_override_min_size(&self, size: Option<Size>) {
        let notify = {
            let mut g = self.inner.lock();
            if g.override_min_size == size {
                return;
            }
            if let Some(s) = size
                && s.exceeds(&g.min_size)
            {
                debug!(requested = %s, min = %g.min_size, "override min size rejected");
                return;
            }
            g.override_min_size = size;
            (g.effective_min_size(), g.listeners.min_size.clone())
        };
        let (effective, listeners) = notify;
        for l in listeners {
            l(effective);
        }
    }

    /// Save the position to restore on the next entry.
    pub fn save_reentry_state(&self, snap_fraction: f32) {
        let mut g = self.inner.lock();
        let size = g.has_user_resized.then(|| g.bounds.size());
        g.reentry = Some(ReentryState {
            snap_fraction,
            size,
        });
        debug!(snap_fraction, ?size, "saved reentry state");
    }

    /// Forget any saved re-entry position.
    pub fn clear_reentry_state(&self) {
        self.inner.lock().reentry = None;
    }

    /// Track the component owning the PiP task; a different component
    /// invalidates saved re-entry state.
    pub fn set_last_owning_component(&self, component: ComponentId) {
        let mut g = self.inner.lock();
        if g.last_owning_component.as_ref() == Some(&component) {
            return;
        }
        if g.reentry.take().is_some() {
            debug!(%component, "owning component changed; reentry state cleared");
        }
        g.last_owning_component = Some(component);
    }

    /// Set the current aspect ratio.
    pub fn set_aspect_ratio(&self, ratio: f32) {
        self.inner.lock().aspect_ratio = ratio;
    }

    /// Update shelf visibility and height.
    pub fn set_shelf_visibility(&self, visible: bool, height: f64) {
        let next = Obstruction { visible, height };
        let listeners = {
            let mut g = self.inner.lock();
            if g.shelf == next {
                return;
            }
            g.shelf = next;
            g.listeners.shelf.clone()
        };
        for l in listeners {
            l(visible, height);
        }
    }

    /// Update IME visibility and height.
    pub fn set_ime_visibility(&self, visible: bool, height: f64) {
        let next = Obstruction { visible, height };
        let listeners = {
            let mut g = self.inner.lock();
            if g.ime == next {
                return;
            }
            g.ime = next;
            g.listeners.ime.clone()
        };
        for l in listeners {
            l(visible, height);
        }
    }

    /// Mark whether the user resized PiP.
    pub fn set_has_user_resized(&self, resized: bool) {
        self.inner.lock().has_user_resized = resized;
    }

    /// Mark whether the user moved PiP.
    pub fn set_has_user_moved(&self, moved: bool) {
        self.inner.lock().has_user_moved = moved;
    }

    /// Replace the display layout.
    pub fn set_display_layout(&self, layout: DisplayLayout) {
        self.inner.lock().display_layout = layout;
    }

    // ---- Listener registration ----

    /// Register a bounds listener; it is called immediately with the current bounds.
    pub fn add_on_bounds_changed(&self, listener: impl Fn(Rect) + Send + Sync + 'static) {
        let listener: BoundsListener = Arc::new(listener);
        let current = {
            let mut g = self.inner.lock();
            g.listeners.bounds.push(listener.clone());
            g.bounds
        };
        listener(current);
    }

    /// Register a shelf listener; it is called immediately with the current shelf state.
    pub fn add_on_shelf_visibility_changed(
        &self,
        listener: impl Fn(bool, f64) + Send + Sync + 'static,
    ) {
        let listener: InsetListener = Arc::new(listener);
        let current = {
            let mut g = self.inner.lock();
            g.listeners.shelf.push(listener.clone());
            g.shelf
        };
        listener(current.visible, current.height);
    }

    /// Register an IME listener; it is called immediately with the current IME state.
    pub fn add_on_ime_visibility_changed(
        &self,
        listener: impl Fn(bool, f64) + Send + Sync + 'static,
    ) {
        let listener: InsetListener = Arc::new(listener);
        let current = {
            let mut g = self.inner.lock();
            g.listeners.ime.push(listener.clone());
            g.ime
        };
        listener(current.visible, current.height);
    }

    /// Register a min-size listener; it is called immediately with the
    /// current effective minimum size.
    pub fn add_on_min_size_changed(&self, listener: impl Fn(Size) + Send + Sync + 'static) {
        let listener: MinSizeListener = Arc::new(listener);
        let current = {
            let mut g = self.inner.lock();
            g.listeners.min_size.push(listener.clone());
            g.effective_min_size()
        };
        listener(current);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Shared call counter.
    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn registration_delivers_current_value() {
        let state = BoundsState::default();
        state.set_bounds(Rect::new(1.0, 2.0, 3.0, 4.0));
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        state.add_on_bounds_changed(move |r| *s.lock() = Some(r));
        assert_eq!(*seen.lock(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn same_bounds_fire_once() {
        let state = BoundsState::default();
        let hits = counter();
        let h = hits.clone();
        state.add_on_bounds_changed(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        // Registration itself delivers one callback.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let r = Rect::new(10.0, 10.0, 100.0, 100.0);
        state.set_bounds(r);
        state.set_bounds(r);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shelf_and_ime_short_circuit() {
        let state = BoundsState::default();
        let hits = counter();
        let h = hits.clone();
        state.add_on_shelf_visibility_changed(move |_, _| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        state.set_shelf_visibility(true, 80.0);
        state.set_shelf_visibility(true, 80.0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        state.set_ime_visibility(true, 300.0);
        assert_eq!(state.bottom_obstruction(), 300.0);
        state.set_ime_visibility(false, 300.0);
        assert_eq!(state.bottom_obstruction(), 80.0);
    }

    #[test]
    fn override_min_size_larger_than_default_is_ignored() {
        let state = BoundsState::default();
        state.set_min_size(Size::new(100.0, 100.0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        state.add_on_min_size_changed(move |sz| s.lock().push(sz));
        state.set_override_min_size(Some(Size::new(40.0, 40.0)));
        state.set_override_min_size(Some(Size::new(300.0, 300.0)));
        assert_eq!(state.override_min_size(), Some(Size::new(40.0, 40.0)));
        assert_eq!(
            *seen.lock(),
            vec![Size::new(100.0, 100.0), Size::new(40.0, 40.0)]
        );
    }

    #[test]
    fn same_component_keeps_reentry_state() {
        let state = BoundsState::default();
        let c = ComponentId::new("pkg", "A");
        state.set_last_owning_component(c.clone());
        state.save_reentry_state(1.5);
        state.set_last_owning_component(c);
        assert_eq!(state.reentry_state().map(|r| r.snap_fraction), Some(1.5));
    }

    #[test]
    fn different_component_clears_reentry_state() {
        let state = BoundsState::default();
        state.set_last_owning_component(ComponentId::new("pkg", "A"));
        state.save_reentry_state(1.5);
        state.set_last_owning_component(ComponentId::new("pkg", "B"));
        assert!(state.reentry_state().is_none());
    }

    #[test]
    fn reentry_size_only_saved_after_user_resize() {
        let state = BoundsState::default();
        state.set_bounds(Rect::new(0.0, 0.0, 320.0, 180.0));
        state.save_reentry_state(2.0);
        assert_eq!(state.reentry_state().and_then(|r| r.size), None);
        state.set_has_user_resized(true);
        state.save_reentry_state(2.0);
        assert_eq!(
            state.reentry_state().and_then(|r| r.size),
            Some(Size::new(320.0, 180.0))
        );
    }

    #[test]
    fn listener_may_read_state_reentrantly() {
        let state = BoundsState::default();
        let probe = state.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        state.add_on_bounds_changed(move |_| s.lock().push(probe.bounds()));
        state.set_bounds(Rect::new(5.0, 5.0, 50.0, 50.0));
        assert_eq!(seen.lock().last(), Some(&Rect::new(5.0, 5.0, 50.0, 50.0)));
    }
}
