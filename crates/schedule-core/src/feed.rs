//! Polling schedule feed
//!
//! Wraps a [`ScheduleSource`] in a periodic refresher: fetch the records,
//! re-derive each status against the current wall clock, and broadcast both
//! the full snapshot and the individual status transitions. Fetch failures
//! are logged and the previous snapshot stands until the next tick.
//!
//! The poll task is owned by the feed and aborted on [`ScheduleFeed::stop`]
//! or drop - the same timer-ownership discipline as the session watchdog: no
//! tick fires after the owner is gone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::ScheduleResult;
use crate::record::{derive_status, SessionRecord, SessionStatus};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Source of raw session records (typically the scheduling backend)
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch the current set of session records
    async fn fetch_sessions(&self) -> ScheduleResult<Vec<SessionRecord>>;
}

/// A record paired with its derived status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The raw record
    pub record: SessionRecord,
    /// Status derived at snapshot time
    pub status: SessionStatus,
}

/// Events emitted by a schedule feed
#[derive(Debug, Clone)]
pub enum ScheduleEvent {
    /// A fresh snapshot was fetched and derived
    SnapshotUpdated {
        /// All sessions with their derived statuses
        sessions: Vec<SessionSnapshot>,
    },
    /// One session's derived status changed since the previous snapshot
    StatusChanged {
        /// The session whose status changed
        session_id: u64,
        /// Status in the previous snapshot
        previous: SessionStatus,
        /// Status in the fresh snapshot
        current: SessionStatus,
    },
}

/// Periodic schedule refresher
pub struct ScheduleFeed {
    events: broadcast::Sender<ScheduleEvent>,
    poll_abort: AbortHandle,
}

impl ScheduleFeed {
    /// Spawn a feed polling `source` every `interval`
    ///
    /// The first fetch happens immediately, then on the interval.
    pub fn spawn(source: Arc<dyn ScheduleSource>, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let task_events = events.clone();
        let poll = tokio::spawn(async move {
            let mut known: HashMap<u64, SessionStatus> = HashMap::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match source.fetch_sessions().await {
                    Ok(records) => {
                        refresh(&task_events, &mut known, records);
                    }
                    Err(error) => {
                        warn!(%error, "schedule fetch failed; keeping previous snapshot");
                    }
                }
            }
        });
        Self {
            events,
            poll_abort: poll.abort_handle(),
        }
    }

    /// Subscribe to feed events
    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleEvent> {
        self.events.subscribe()
    }

    /// Stop polling (idempotent)
    pub fn stop(&self) {
        self.poll_abort.abort();
    }
}

impl Drop for ScheduleFeed {
    fn drop(&mut self) {
        self.poll_abort.abort();
    }
}

fn refresh(
    events: &broadcast::Sender<ScheduleEvent>,
    known: &mut HashMap<u64, SessionStatus>,
    records: Vec<SessionRecord>,
) {
    let now = Utc::now();
    let snapshots: Vec<SessionSnapshot> = records
        .into_iter()
        .map(|record| {
            let status = derive_status(&record, now);
            SessionSnapshot { record, status }
        })
        .collect();

    for snapshot in &snapshots {
        let session_id = snapshot.record.session_id;
        match known.insert(session_id, snapshot.status) {
            Some(previous) if previous != snapshot.status => {
                debug!(
                    session_id,
                    %previous,
                    current = %snapshot.status,
                    "session status changed"
                );
                let _ = events.send(ScheduleEvent::StatusChanged {
                    session_id,
                    previous,
                    current: snapshot.status,
                });
            }
            _ => {}
        }
    }
    // Sessions that vanished from the source stop being tracked.
    known.retain(|id, _| snapshots.iter().any(|s| s.record.session_id == *id));

    let _ = events.send(ScheduleEvent::SnapshotUpdated {
        sessions: snapshots,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        fetches: AtomicUsize,
        records: Mutex<Vec<SessionRecord>>,
    }

    impl ScriptedSource {
        fn new(records: Vec<SessionRecord>) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                records: Mutex::new(records),
            })
        }

        fn set_records(&self, records: Vec<SessionRecord>) {
            *self.records.lock() = records;
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScheduleSource for ScriptedSource {
        async fn fetch_sessions(&self) -> ScheduleResult<Vec<SessionRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.lock().clone())
        }
    }

    fn upcoming_record(session_id: u64) -> SessionRecord {
        SessionRecord::new(
            session_id,
            7,
            Utc::now() + ChronoDuration::hours(2),
            60,
        )
    }

    async fn next_status_change(
        rx: &mut broadcast::Receiver<ScheduleEvent>,
    ) -> (u64, SessionStatus, SessionStatus) {
        loop {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv())
                .await
                .expect("feed event within deadline")
                .expect("feed channel open")
            {
                ScheduleEvent::StatusChanged {
                    session_id,
                    previous,
                    current,
                } => return (session_id, previous, current),
                ScheduleEvent::SnapshotUpdated { .. } => continue,
            }
        }
    }

    #[tokio::test]
    async fn feed_emits_status_transitions() {
        let source = ScriptedSource::new(vec![upcoming_record(1)]);
        let feed = ScheduleFeed::spawn(source.clone(), Duration::from_millis(20));
        let mut rx = feed.subscribe();

        // Wait for the first snapshot, then script the session going live.
        loop {
            if let ScheduleEvent::SnapshotUpdated { sessions } = tokio::time::timeout(
                Duration::from_millis(500),
                rx.recv(),
            )
            .await
            .unwrap()
            .unwrap()
            {
                assert_eq!(sessions[0].status, SessionStatus::Upcoming);
                break;
            }
        }

        let mut live = upcoming_record(1);
        live.started_at = Some(Utc::now());
        source.set_records(vec![live]);

        let (session_id, previous, current) = next_status_change(&mut rx).await;
        assert_eq!(session_id, 1);
        assert_eq!(previous, SessionStatus::Upcoming);
        assert_eq!(current, SessionStatus::Live);
    }

    #[tokio::test]
    async fn stopping_the_feed_stops_polling() {
        let source = ScriptedSource::new(vec![]);
        let feed = ScheduleFeed::spawn(source.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        feed.stop();
        let after_stop = source.fetches();
        assert!(after_stop >= 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.fetches(), after_stop, "no fetch after stop");
    }

    #[tokio::test]
    async fn fetch_failures_keep_the_previous_snapshot() {
        struct FlakySource {
            fetches: AtomicUsize,
        }

        #[async_trait]
        impl ScheduleSource for FlakySource {
            async fn fetch_sessions(&self) -> ScheduleResult<Vec<SessionRecord>> {
                let n = self.fetches.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 1 {
                    Err(crate::error::ScheduleError::source("HTTP 502"))
                } else {
                    Ok(vec![])
                }
            }
        }

        let source = Arc::new(FlakySource {
            fetches: AtomicUsize::new(0),
        });
        let feed = ScheduleFeed::spawn(source.clone(), Duration::from_millis(10));
        let mut rx = feed.subscribe();

        // Snapshots keep flowing despite every other fetch failing.
        let mut snapshots = 0;
        while snapshots < 3 {
            if let Ok(Ok(ScheduleEvent::SnapshotUpdated { .. })) =
                tokio::time::timeout(Duration::from_millis(500), rx.recv()).await
            {
                snapshots += 1;
            }
        }
    }
}
