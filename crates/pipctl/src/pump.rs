//! Frame pump: ticks a [`FrameClock`] on a fixed interval until cancelled.

use std::time::Duration;

use pip_transitions::FrameClock;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Upper bound on waiting for the pump task to exit after cancellation.
pub const STOP_WAIT_TIMEOUT_MS: u64 = 100;

/// Running pump task.
pub struct FramePump {
    /// Cancels the pump loop.
    token: CancellationToken,
    /// The pump task.
    handle: JoinHandle<()>,
}

impl FramePump {
    /// Spawn a pump advancing `clock` by the elapsed time on every tick of
    /// `interval`. Must be called from inside a tokio runtime.
    pub fn start(clock: FrameClock, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();
        let fut = async move {
            trace!(int_ms = interval.as_millis(), "frame_pump_start");
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!("frame_pump_cancelled");
                        return;
                    }
                    now = ticker.tick() => {
                        let dt = now - last;
                        last = now;
                        let advanced = clock.tick(dt);
                        if advanced > 0 {
                            trace!(advanced, dt_ms = dt.as_millis(), "frame");
                        }
                    }
                }
            }
        };
        Self {
            token,
            handle: tokio::spawn(fut),
        }
    }

    /// Stop the pump without waiting.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop the pump and wait briefly for the task to finish.
    pub async fn shutdown(&mut self) {
        self.token.cancel();
        let wait = Duration::from_millis(STOP_WAIT_TIMEOUT_MS);
        if time::timeout(wait, &mut self.handle).await.is_err() {
            debug!("frame pump did not stop in time");
        }
    }
}
