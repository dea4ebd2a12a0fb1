use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::app_system::SimulationSchedule;
use crate::projector::{project, DisplayStatus, StatusProjection};

/// Customer-side status view driven by local timers.
///
/// Stands in for live updates: starting at `requested`, it moves to
/// `scanning`, `en_route` and `arriving` at fixed offsets from creation.
/// The timers belong to the view. [`StatusView::teardown`], or dropping the
/// view, aborts all of them at once and nothing is applied afterwards.
/// Durable request state is never touched.
pub struct StatusView {
    status: watch::Receiver<DisplayStatus>,
    publisher: Arc<watch::Sender<DisplayStatus>>,
    closed: Arc<AtomicBool>,
    timers: Vec<JoinHandle<()>>,
}

/// Apply a simulated step unless the view is closed or already further along.
fn step(publisher: &watch::Sender<DisplayStatus>, closed: &AtomicBool, next: DisplayStatus) -> bool {
    publisher.send_if_modified(|current| {
        // Checked under the channel's write lock, so it orders with `close`.
        if closed.load(Ordering::Acquire) || next <= *current {
            return false;
        }
        *current = next;
        true
    })
}

/// Mark the view closed. Holding the write lock while flipping the flag
/// means a timer already past `abort` cannot publish afterwards.
fn close(publisher: &watch::Sender<DisplayStatus>, closed: &AtomicBool) {
    publisher.send_if_modified(|_| {
        closed.store(true, Ordering::Release);
        false
    });
}

impl StatusView {
    pub fn start(schedule: SimulationSchedule) -> Self {
        let (publisher, status) = watch::channel(DisplayStatus::Requested);
        let publisher = Arc::new(publisher);
        let closed = Arc::new(AtomicBool::new(false));
        let created = Instant::now();

        let steps = [
            (schedule.scanning, DisplayStatus::Scanning),
            (schedule.en_route, DisplayStatus::EnRoute),
            (schedule.arriving, DisplayStatus::Arriving),
        ];
        let timers = steps
            .into_iter()
            .map(|(offset, next)| {
                let publisher = Arc::clone(&publisher);
                let closed = Arc::clone(&closed);
                tokio::spawn(async move {
                    tokio::time::sleep_until(created + offset).await;
                    // Never step backwards, even with overlapping offsets.
                    if step(&publisher, &closed, next) {
                        debug!(status = ?next, "Simulated status reached");
                    }
                })
            })
            .collect();

        Self {
            status,
            publisher,
            closed,
            timers,
        }
    }

    pub fn current(&self) -> DisplayStatus {
        *self.status.borrow()
    }

    pub fn projection(&self) -> StatusProjection {
        project(Some(self.current()))
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayStatus> {
        self.status.clone()
    }

    /// Timers that have neither fired nor been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.iter().filter(|t| !t.is_finished()).count()
    }

    /// Close the view, discarding every pending update.
    pub fn teardown(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        close(&self.publisher, &self.closed);
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

impl Drop for StatusView {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn reaches_arriving_after_the_full_delay() {
        let view = StatusView::start(SimulationSchedule::default());
        assert_eq!(view.current(), DisplayStatus::Requested);
        assert_eq!(view.projection().progress_percent, 25);

        tokio::time::sleep(Duration::from_millis(2_001)).await;
        assert_eq!(view.current(), DisplayStatus::Scanning);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(view.current(), DisplayStatus::EnRoute);

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(view.current(), DisplayStatus::EnRoute);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let projection = view.projection();
        assert_eq!(view.current(), DisplayStatus::Arriving);
        assert_eq!(projection.progress_percent, 100);
        assert!(projection.timeline.iter().all(|check| check.completed));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_discards_pending_updates() {
        let view = StatusView::start(SimulationSchedule::default());
        let observer = view.subscribe();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(view.pending_timers(), 3);
        view.teardown();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*observer.borrow(), DisplayStatus::Requested);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_view_also_cancels() {
        let view = StatusView::start(SimulationSchedule::default());
        let mut observer = view.subscribe();
        drop(view);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(observer.has_changed().is_err());
        assert_eq!(*observer.borrow(), DisplayStatus::Requested);
    }

    #[test]
    fn a_step_that_fires_after_close_is_discarded() {
        let (publisher, observer) = watch::channel(DisplayStatus::Requested);
        let closed = AtomicBool::new(false);

        assert!(step(&publisher, &closed, DisplayStatus::Scanning));
        close(&publisher, &closed);

        // A timer that escaped the abort still cannot publish.
        assert!(!step(&publisher, &closed, DisplayStatus::EnRoute));
        assert_eq!(*observer.borrow(), DisplayStatus::Scanning);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn teardown_is_final_on_a_multi_thread_runtime() {
        let immediate = SimulationSchedule {
            scanning: Duration::ZERO,
            en_route: Duration::ZERO,
            arriving: Duration::ZERO,
        };
        for _ in 0..50 {
            let view = StatusView::start(immediate);
            let observer = view.subscribe();
            view.teardown();
            let frozen = *observer.borrow();

            tokio::time::sleep(Duration::from_millis(2)).await;
            assert_eq!(*observer.borrow(), frozen);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_offsets_never_go_backwards() {
        let schedule = SimulationSchedule {
            scanning: Duration::from_secs(3),
            en_route: Duration::from_secs(1),
            arriving: Duration::from_secs(2),
        };
        let view = StatusView::start(schedule);
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(view.current(), DisplayStatus::Arriving);
    }
}
