//! Active request feed for staff views.
//!
//! [`RequestFeed`] is an actor that keeps the list of requests still in
//! progress current. It refetches the full active set from the Request
//! store on start, on every change notification and on the optional poll
//! interval. Entries are never patched locally.
//!
//! All refreshes run on the actor task, one at a time. Notifications that
//! pile up while a refresh is in flight are drained and folded into a
//! single follow-up refresh, and snapshots are published in completion
//! order, so the newest result always wins.

use std::time::Duration;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{ChangeNotification, Entity};
use crate::clients::RequestClient;
use crate::domain::Request;
use crate::request_actor::RequestError;

/// What staff views render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Requests in `requested`, `scanning` or `en_route`, newest first.
    pub requests: Vec<Request>,
    /// Completed refresh attempts, failed ones included.
    pub refreshes: u64,
    /// Set when the latest refresh failed; `requests` is then the previous list.
    pub last_error: Option<String>,
}

#[derive(Debug)]
enum FeedCommand {
    Refresh {
        respond_to: oneshot::Sender<FeedSnapshot>,
    },
    Shutdown,
}

pub struct RequestFeed {
    receiver: mpsc::Receiver<FeedCommand>,
    requests: RequestClient,
    changes: broadcast::Receiver<ChangeNotification>,
    listening: bool,
    snapshot: watch::Sender<FeedSnapshot>,
    poll_interval: Option<Duration>,
}

impl RequestFeed {
    /// `changes` should be subscribed before any write the feed must see.
    pub fn new(
        buffer_size: usize,
        requests: RequestClient,
        changes: broadcast::Receiver<ChangeNotification>,
        poll_interval: Option<Duration>,
    ) -> (Self, FeedClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (snapshot, snapshot_rx) = watch::channel(FeedSnapshot::default());
        let feed = Self {
            receiver,
            requests,
            changes,
            listening: true,
            snapshot,
            poll_interval,
        };
        let client = FeedClient {
            sender,
            snapshot: snapshot_rx,
        };
        (feed, client)
    }

    #[instrument(name = "request_feed", skip(self))]
    pub async fn run(mut self) {
        info!("RequestFeed starting");
        self.refresh().await;

        let mut poll = self.poll_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                biased;

                command = self.receiver.recv() => match command {
                    Some(FeedCommand::Refresh { respond_to }) => {
                        self.drain_pending();
                        self.refresh().await;
                        let _ = respond_to.send(self.snapshot.borrow().clone());
                    }
                    Some(FeedCommand::Shutdown) | None => break,
                },
                _ = next_tick(&mut poll) => {
                    debug!("Poll interval elapsed");
                    self.drain_pending();
                    self.refresh().await;
                }
                change = self.changes.recv(), if self.listening => {
                    match change {
                        Ok(notification) => self.inspect(&notification),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Change stream lagged, refetching");
                        }
                        Err(RecvError::Closed) => {
                            info!("Change stream closed, relying on polling and explicit refreshes");
                            self.listening = false;
                            continue;
                        }
                    }
                    self.drain_pending();
                    self.refresh().await;
                }
            }
        }
        info!("RequestFeed stopped");
    }

    /// Fold every notification already queued into the refresh about to run.
    fn drain_pending(&mut self) {
        let mut coalesced = 0usize;
        while self.listening {
            match self.changes.try_recv() {
                Ok(notification) => {
                    self.inspect(&notification);
                    coalesced += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => coalesced += skipped as usize,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => self.listening = false,
            }
        }
        if coalesced > 0 {
            debug!(coalesced, "Coalesced change notifications");
        }
    }

    /// Payloads are only logged; the refresh that follows is what counts.
    fn inspect(&self, notification: &ChangeNotification) {
        if notification.table != Request::TABLE {
            debug!(table = notification.table, "Ignoring change for another table");
            return;
        }
        match serde_json::from_value::<Request>(notification.payload.clone()) {
            Ok(request) => debug!(
                request_id = %request.id,
                status = %request.status,
                kind = ?notification.kind,
                "Request changed"
            ),
            Err(e) => {
                let e = RequestError::MalformedNotification(e.to_string());
                warn!(error = %e, "Refetching anyway");
            }
        }
    }

    async fn refresh(&mut self) {
        match self.requests.list_active_requests().await {
            Ok(requests) => {
                debug!(active = requests.len(), "Active requests refreshed");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.requests = requests;
                    snapshot.refreshes += 1;
                    snapshot.last_error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping previous list");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.refreshes += 1;
                    snapshot.last_error = Some(e.user_message());
                });
            }
        }
    }
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Handle to a running [`RequestFeed`].
#[derive(Clone)]
pub struct FeedClient {
    sender: mpsc::Sender<FeedCommand>,
    snapshot: watch::Receiver<FeedSnapshot>,
}

impl FeedClient {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.clone()
    }

    /// Refetch now and return the resulting snapshot.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<FeedSnapshot, RequestError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(FeedCommand::Refresh { respond_to })
            .await
            .map_err(|_| RequestError::StoreUnavailable("request feed stopped".to_string()))?;
        response
            .await
            .map_err(|_| RequestError::StoreUnavailable("request feed dropped".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        self.sender
            .send(FeedCommand::Shutdown)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ChangeKind;
    use crate::domain::Request;
    use crate::mock_framework::{create_mock_client, expect_list};
    use chrono::{Duration as ChronoDuration, Utc};
    use uuid::Uuid;

    fn request_at(minutes_ago: i64) -> Request {
        Request::new(
            Uuid::new_v4(),
            "product_1",
            "Garden",
            Utc::now() - ChronoDuration::minutes(minutes_ago),
        )
    }

    fn notification(payload: serde_json::Value) -> ChangeNotification {
        ChangeNotification {
            table: "requests",
            kind: ChangeKind::Update,
            payload,
        }
    }

    #[tokio::test]
    async fn notifications_queued_during_a_refresh_are_coalesced() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (changes_tx, changes_rx) = broadcast::channel(16);
        let (feed, client) = RequestFeed::new(4, RequestClient::new(inner), changes_rx, None);
        tokio::spawn(feed.run());

        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        let first = request_at(5);
        // Three writes land while the initial load is still in flight.
        for _ in 0..3 {
            changes_tx.send(notification(serde_json::to_value(&first).unwrap())).unwrap();
        }
        respond_to.send(Ok(vec![first.clone()])).unwrap();

        let second = request_at(1);
        let (filter, respond_to) = expect_list(&mut store).await.expect("coalesced refresh");
        assert_eq!(filter.statuses.len(), 3);
        respond_to.send(Ok(vec![second.clone(), first.clone()])).unwrap();

        let no_more = tokio::time::timeout(Duration::from_millis(50), expect_list(&mut store)).await;
        assert!(no_more.is_err(), "expected a single refresh for the burst");

        let snapshot = client.snapshot();
        assert_eq!(snapshot.refreshes, 2);
        assert_eq!(snapshot.requests, vec![second, first]);
    }

    #[tokio::test]
    async fn malformed_payload_still_triggers_a_refetch() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (changes_tx, changes_rx) = broadcast::channel(16);
        let (feed, client) = RequestFeed::new(4, RequestClient::new(inner), changes_rx, None);
        tokio::spawn(feed.run());

        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        respond_to.send(Ok(vec![])).unwrap();

        changes_tx.send(notification(serde_json::json!({ "unexpected": true }))).unwrap();
        let fresh = request_at(0);
        let (_, respond_to) = expect_list(&mut store).await.expect("refresh after malformed payload");
        respond_to.send(Ok(vec![fresh.clone()])).unwrap();

        let mut updates = client.subscribe();
        let snapshot = updates
            .wait_for(|s| s.refreshes == 2)
            .await
            .expect("feed alive")
            .clone();
        assert_eq!(snapshot.requests, vec![fresh]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_list() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (_changes_tx, changes_rx) = broadcast::channel(16);
        let (feed, client) = RequestFeed::new(4, RequestClient::new(inner), changes_rx, None);
        tokio::spawn(feed.run());

        let kept = request_at(3);
        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        respond_to.send(Ok(vec![kept.clone()])).unwrap();

        let refresh = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        let (_, respond_to) = expect_list(&mut store).await.expect("manual refresh");
        drop(respond_to);

        let snapshot = refresh.await.unwrap().unwrap();
        assert_eq!(snapshot.requests, vec![kept]);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refetches_without_notifications() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (feed, client) = RequestFeed::new(
            4,
            RequestClient::new(inner.clone()),
            inner.subscribe(),
            Some(Duration::from_secs(10)),
        );
        tokio::spawn(feed.run());

        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        respond_to.send(Ok(vec![])).unwrap();

        let polled = request_at(0);
        let (_, respond_to) = expect_list(&mut store).await.expect("poll");
        respond_to.send(Ok(vec![polled.clone()])).unwrap();

        let mut updates = client.subscribe();
        let snapshot = updates.wait_for(|s| s.refreshes == 2).await.unwrap().clone();
        assert_eq!(snapshot.requests, vec![polled]);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_refresh_absorbs_queued_notifications() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (changes_tx, changes_rx) = broadcast::channel(16);
        let (feed, client) = RequestFeed::new(
            4,
            RequestClient::new(inner),
            changes_rx,
            Some(Duration::from_secs(10)),
        );
        tokio::spawn(feed.run());

        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        respond_to.send(Ok(vec![])).unwrap();

        let manual = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        let (_, respond_to) = expect_list(&mut store).await.expect("manual refresh");
        // The poll comes due and writes pile up while the manual refresh is in flight.
        tokio::time::advance(Duration::from_secs(11)).await;
        let written = request_at(0);
        for _ in 0..3 {
            changes_tx.send(notification(serde_json::to_value(&written).unwrap())).unwrap();
        }
        respond_to.send(Ok(vec![])).unwrap();
        manual.await.unwrap().unwrap();

        let (_, respond_to) = expect_list(&mut store).await.expect("poll refresh");
        respond_to.send(Ok(vec![written.clone()])).unwrap();

        let no_more = tokio::time::timeout(Duration::from_millis(50), expect_list(&mut store)).await;
        assert!(no_more.is_err(), "queued notifications should fold into the poll refresh");

        let snapshot = client.snapshot();
        assert_eq!(snapshot.refreshes, 3);
        assert_eq!(snapshot.requests, vec![written]);
    }

    #[tokio::test]
    async fn lagged_stream_triggers_one_refetch() {
        let (inner, mut store) = create_mock_client::<Request>(10);
        let (changes_tx, changes_rx) = broadcast::channel(1);
        let (feed, client) = RequestFeed::new(4, RequestClient::new(inner), changes_rx, None);
        tokio::spawn(feed.run());

        let (_, respond_to) = expect_list(&mut store).await.expect("initial load");
        let latest = request_at(0);
        // Overflow the one-slot stream while the initial load is in flight.
        for _ in 0..5 {
            changes_tx.send(notification(serde_json::to_value(&latest).unwrap())).unwrap();
        }
        respond_to.send(Ok(vec![])).unwrap();

        let (_, respond_to) = expect_list(&mut store).await.expect("refetch after lag");
        respond_to.send(Ok(vec![latest.clone()])).unwrap();

        let no_more = tokio::time::timeout(Duration::from_millis(50), expect_list(&mut store)).await;
        assert!(no_more.is_err(), "a lagged burst should cost a single refetch");

        let snapshot = client.snapshot();
        assert_eq!(snapshot.refreshes, 2);
        assert_eq!(snapshot.requests, vec![latest]);
        assert_eq!(snapshot.last_error, None);
    }
}
