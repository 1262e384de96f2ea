//! Picture-in-picture geometry: the authoritative [`BoundsState`] ledger and
//! the [`BoundsAlgorithm`] that computes target rectangles from it.
#![warn(missing_docs)]

mod algorithm;
mod display;
mod params;
mod snap;
mod state;

pub use algorithm::BoundsAlgorithm;
pub use display::DisplayLayout;
pub use params::PipParams;
pub use snap::SnapAlgorithm;
pub use state::{BoundsListener, BoundsState, InsetListener, MinSizeListener, ReentryState};
