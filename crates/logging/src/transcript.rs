//! Capture rendered tracing events in memory.
//!
//! Install [`TranscriptLayer`] in a subscriber and read the captured lines
//! back through the [`Transcript`] handle, e.g. to print or compare a scenario
//! run after the fact.

use std::{mem, sync::Arc};

use parking_lot::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::fmt::{self, RenderedLog};

/// Shared buffer of captured events.
#[derive(Clone, Default)]
pub struct Transcript {
    /// Captured events in arrival order.
    lines: Arc<Mutex<Vec<RenderedLog>>>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer appending to this transcript.
    pub fn layer(&self) -> TranscriptLayer {
        TranscriptLayer {
            transcript: self.clone(),
        }
    }

    /// Snapshot of every captured event.
    pub fn lines(&self) -> Vec<RenderedLog> {
        self.lines.lock().clone()
    }

    /// Take every captured event, leaving the transcript empty.
    pub fn drain(&self) -> Vec<RenderedLog> {
        mem::take(&mut *self.lines.lock())
    }

    /// True when some captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.message.contains(needle))
    }
}

/// Tracing layer feeding a [`Transcript`].
pub struct TranscriptLayer {
    /// Destination buffer.
    transcript: Transcript,
}

impl<S> Layer<S> for TranscriptLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let r = fmt::render_event(event);
        self.transcript.lines.lock().push(r);
    }
}
