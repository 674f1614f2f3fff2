//! Progress refresh background task

use std::time::Duration;

use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::state::{Clock, RoutineSnapshot};

/// Recompute the phase progress fraction at a fixed rate.
///
/// Reads only the latest snapshot's phase clock and the wall clock; it has
/// no way to touch runner state. Ends when the session drops its snapshot
/// sender.
pub async fn progress_task<C: Clock>(
    mut snapshots: watch::Receiver<RoutineSnapshot>,
    progress: watch::Sender<f64>,
    clock: C,
    period: Duration,
) {
    info!("Starting progress refresh task");

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let fraction = {
                    let snapshot = snapshots.borrow();
                    if snapshot.phase.is_active() {
                        snapshot.clock.progress_at(clock.now())
                    } else {
                        0.0
                    }
                };
                progress.send_if_modified(|current| {
                    if (*current - fraction).abs() > f64::EPSILON {
                        *current = fraction;
                        true
                    } else {
                        false
                    }
                });
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("Snapshot channel closed, stopping progress refresh");
                    break;
                }
            }
        }
    }
}
