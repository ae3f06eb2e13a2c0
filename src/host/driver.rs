use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::host::renderer::RendererHost;
use crate::playback::{PlaybackController, SessionPhase, SessionSummary};

/// Tick the controller as fast as possible with a fixed frame length
///
/// Useful for previewing a route offline. A session still live after
/// `max_ticks` is interrupted.
pub fn run_headless<H: RendererHost>(
    controller: &mut PlaybackController<H>,
    frame: Duration,
    max_ticks: u64,
) -> Option<SessionSummary> {
    let mut ticks = 0;
    while controller.phase().is_live() {
        if ticks >= max_ticks {
            info!("Giving up after {} ticks", max_ticks);
            controller.interrupt();
            break;
        }
        controller.tick(frame);
        ticks += 1;
    }
    controller.last_summary().cloned()
}

/// Tick the controller in real time on a tokio interval
///
/// Each tick passes the measured time since the previous one, so a slow or
/// jittery frame rate does not change how long the route takes. Setting
/// `stop_signal` interrupts the session at the next frame.
pub async fn run_realtime<H: RendererHost>(
    controller: &mut PlaybackController<H>,
    frame: Duration,
    stop_signal: Arc<AtomicBool>,
) -> Option<SessionSummary> {
    let mut frames = interval(frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first interval tick fires immediately
    let mut last = frames.tick().await;

    while controller.phase().is_live() {
        let now = frames.tick().await;

        if stop_signal.load(Ordering::SeqCst) {
            debug!("Stop requested");
            controller.interrupt();
            break;
        }

        let elapsed = now.duration_since(last);
        last = now;

        if controller.tick(elapsed) == SessionPhase::Running {
            let status = controller.status();
            if status.ticks % 300 == 0 {
                debug!(
                    "Segment {}/{} at {:.1} m/s ({:.0}s simulated)",
                    status.segment_index, status.segment_count, status.current_speed_estimate, status.simulated_seconds
                );
            }
        }
    }

    controller.last_summary().cloned()
}

/// Real time elapsed since `start`, for callers reporting wall-clock runtime
pub fn wall_clock_since(start: Instant) -> Duration {
    Instant::now().duration_since(start)
}
