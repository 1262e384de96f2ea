use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pip_bounds::{BoundsAlgorithm, BoundsState, DisplayLayout};
use pip_config::PipConfig;
use pip_geom::{Insets, Rect, Size};
use pip_ids::DisplayId;
use proptest::prelude::*;

/// Algorithm over a `width` x `height` display with a top inset.
fn algorithm_for(width: f64, height: f64, top_inset: f64) -> BoundsAlgorithm {
    let mut display = DisplayLayout::new(DisplayId::DEFAULT, width, height);
    display.stable_insets = Insets {
        top: top_inset,
        ..Insets::default()
    };
    let algo = BoundsAlgorithm::new(Arc::new(PipConfig::default()), BoundsState::new(display));
    algo.update_size_limits();
    algo
}

proptest! {
    #[test]
    fn snap_fraction_round_trips(
        fraction in 0.0f32..4.0,
        width in 600.0f64..3000.0,
        height in 600.0f64..3000.0,
        top_inset in 0.0f64..80.0,
        aspect in 0.5f32..2.0,
        shelf in 0.0f64..150.0,
    ) {
        let algo = algorithm_for(width, height, top_inset);
        algo.state().set_shelf_visibility(shelf > 0.0, shelf);
        let size = algo.default_size(aspect);
        let bounds = algo.snap_fraction_to_bounds(fraction, size);
        let back = algo.bounds_to_snap_fraction(&bounds);
        prop_assert!((back - fraction).abs() <= 1e-3, "{fraction} -> {bounds} -> {back}");
    }

    #[test]
    fn snapped_bounds_stay_inside_inset_area(
        fraction in 0.0f32..4.0,
        width in 600.0f64..3000.0,
        height in 600.0f64..3000.0,
    ) {
        let algo = algorithm_for(width, height, 0.0);
        let size = algo.default_size(16.0 / 9.0);
        let bounds = algo.snap_fraction_to_bounds(fraction, size);
        let inset = algo.inset_bounds();
        prop_assert!(bounds.left() >= inset.left() - 1e-9);
        prop_assert!(bounds.top() >= inset.top() - 1e-9);
        prop_assert!(bounds.right() <= inset.right() + 1e-9);
        prop_assert!(bounds.bottom() <= inset.bottom() + 1e-9);
    }
}

#[test]
fn repeated_setters_notify_once() {
    let state = BoundsState::default();
    let bounds_hits = Arc::new(AtomicUsize::new(0));
    let shelf_hits = Arc::new(AtomicUsize::new(0));
    let min_hits = Arc::new(AtomicUsize::new(0));
    {
        let h = bounds_hits.clone();
        state.add_on_bounds_changed(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let h = shelf_hits.clone();
        state.add_on_shelf_visibility_changed(move |_, _| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let h = min_hits.clone();
        state.add_on_min_size_changed(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
    }
    for _ in 0..2 {
        state.set_bounds(Rect::new(1.0, 1.0, 10.0, 10.0));
        state.set_shelf_visibility(true, 40.0);
        state.set_min_size(Size::new(100.0, 100.0));
    }
    // One callback at registration, one for the first real change.
    assert_eq!(bounds_hits.load(Ordering::SeqCst), 2);
    assert_eq!(shelf_hits.load(Ordering::SeqCst), 2);
    assert_eq!(min_hits.load(Ordering::SeqCst), 2);
}

#[test]
fn oversized_override_is_ignored_silently() {
    let state = BoundsState::default();
    state.set_min_size(Size::new(100.0, 100.0));
    state.set_override_min_size(Some(Size::new(40.0, 40.0)));

    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    state.add_on_min_size_changed(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    });
    state.set_override_min_size(Some(Size::new(300.0, 300.0)));

    assert_eq!(state.override_min_size(), Some(Size::new(40.0, 40.0)));
    assert_eq!(state.effective_min_size(), Size::new(40.0, 40.0));
    // Only the registration callback.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
