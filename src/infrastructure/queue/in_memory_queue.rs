use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

use crate::application::ports::{MessageQueue, QueueError, SendStatus};
use crate::domain::{DeduplicationId, LeaseHandle, OutgoingMessage, QueueMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub body: String,
    pub dedup_id: DeduplicationId,
    pub receive_count: u32,
    pub reason: String,
}

struct Entry {
    body: String,
    group_id: String,
    dedup_id: DeduplicationId,
    receive_count: u32,
    lease: Option<(LeaseHandle, Instant)>,
}

impl Entry {
    fn is_leased(&self, now: Instant) -> bool {
        matches!(&self.lease, Some((_, expires)) if *expires > now)
    }
}

#[derive(Default)]
struct State {
    entries: VecDeque<Entry>,
    recent: HashMap<(String, DeduplicationId), Instant>,
    dead_letters: Vec<DeadLetter>,
}

/// Process-local queue with the same delivery semantics as the durable one:
/// group FIFO, visibility-timeout leases and a deduplication window.
pub struct InMemoryQueue {
    state: Mutex<State>,
    notify: Notify,
    visibility_timeout: Duration,
    dedup_window: Duration,
}

impl InMemoryQueue {
    pub fn new(visibility_timeout: Duration, dedup_window: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            visibility_timeout,
            dedup_window,
        }
    }

    /// Messages not yet acknowledged, leased or not.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.lock().dead_letters.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Leases the first visible message whose group has nothing in flight.
    fn try_lease(&self) -> Option<QueueMessage> {
        let now = Instant::now();
        let mut state = self.lock();
        let mut blocked: HashSet<String> = HashSet::new();

        for entry in state.entries.iter_mut() {
            if blocked.contains(&entry.group_id) {
                continue;
            }
            if entry.is_leased(now) {
                blocked.insert(entry.group_id.clone());
                continue;
            }

            let lease = LeaseHandle::new(Uuid::new_v4().to_string());
            entry.receive_count += 1;
            entry.lease = Some((lease.clone(), now + self.visibility_timeout));
            return Some(QueueMessage {
                body: entry.body.clone(),
                lease,
                dedup_id: entry.dedup_id.clone(),
                receive_count: entry.receive_count,
            });
        }
        None
    }

    fn next_lease_expiry(&self) -> Option<Instant> {
        let now = Instant::now();
        self.lock()
            .entries
            .iter()
            .filter_map(|e| e.lease.as_ref().map(|(_, expires)| *expires))
            .filter(|expires| *expires > now)
            .min()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn send(&self, message: OutgoingMessage) -> Result<SendStatus, QueueError> {
        let now = Instant::now();
        {
            let mut state = self.lock();
            let window = self.dedup_window;
            state
                .recent
                .retain(|_, sent_at| now.duration_since(*sent_at) < window);

            let dedup_key = (message.group_id.clone(), message.dedup_id.clone());
            if state.recent.contains_key(&dedup_key) {
                return Ok(SendStatus::Duplicate);
            }
            state.recent.insert(dedup_key, now);
            state.entries.push_back(Entry {
                body: message.body,
                group_id: message.group_id,
                dedup_id: message.dedup_id,
                receive_count: 0,
                lease: None,
            });
        }
        self.notify.notify_waiters();
        Ok(SendStatus::Enqueued)
    }

    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>, QueueError> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.notify.notified();
            if let Some(message) = self.try_lease() {
                return Ok(Some(message));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            let wake_at = self
                .next_lease_expiry()
                .map_or(deadline, |expiry| expiry.min(deadline));
            let _ = tokio::time::timeout_at(wake_at, notified).await;
        }
    }

    async fn acknowledge(&self, lease: &LeaseHandle) -> Result<(), QueueError> {
        {
            let now = Instant::now();
            let mut state = self.lock();
            let position = state.entries.iter().position(|e| {
                matches!(&e.lease, Some((handle, expires)) if handle == lease && *expires > now)
            });
            match position {
                Some(index) => {
                    state.entries.remove(index);
                }
                None => return Err(QueueError::UnknownLease(lease.to_string())),
            }
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn dead_letter(&self, message: &QueueMessage, reason: &str) -> Result<(), QueueError> {
        self.lock().dead_letters.push(DeadLetter {
            body: message.body.clone(),
            dedup_id: message.dedup_id.clone(),
            receive_count: message.receive_count,
            reason: reason.to_string(),
        });
        Ok(())
    }
}
