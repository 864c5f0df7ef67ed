//! Pending queue: batches awaiting a worker, highest priority and earliest submission first.

use batch_types::{Batch, BatchKey, Priority};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tokio::sync::{Mutex, Notify};

/// Queue entry. Ordered by priority weight (desc), then timestamp (asc), then insertion seq (asc).
#[derive(Debug, Clone)]
pub struct PendingBatch {
    pub key: BatchKey,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    seq: u64,
}

impl PendingBatch {
    pub fn new(key: BatchKey, priority: Priority, timestamp: DateTime<Utc>) -> Self {
        Self {
            key,
            priority,
            timestamp,
            seq: 0,
        }
    }
}

impl From<&Batch> for PendingBatch {
    fn from(b: &Batch) -> Self {
        Self::new(b.key(), b.priority, b.timestamp)
    }
}

impl PartialEq for PendingBatch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingBatch {}

impl PartialOrd for PendingBatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingBatch {
    // BinaryHeap is a max-heap: "greater" pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .weight()
            .cmp(&other.priority.weight())
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    heap: BinaryHeap<PendingBatch>,
    next_seq: u64,
}

/// Shared pending queue. Push and pop are mutually exclusive; `pop` parks until work arrives.
pub struct PendingQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Enqueue a group of batches atomically and wake waiting workers.
    pub async fn push_all<I>(&self, batches: I) -> usize
    where
        I: IntoIterator<Item = PendingBatch>,
    {
        let pushed = {
            let mut guard = self.inner.lock().await;
            let mut n = 0;
            for mut b in batches {
                b.seq = guard.next_seq;
                guard.next_seq += 1;
                guard.heap.push(b);
                n += 1;
            }
            n
        };
        for _ in 0..pushed {
            self.notify.notify_one();
        }
        pushed
    }

    pub async fn try_pop(&self) -> Option<PendingBatch> {
        self.inner.lock().await.heap.pop()
    }

    /// Take the head of the queue, waiting while it is empty.
    pub async fn pop(&self) -> PendingBatch {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(b) = self.try_pop().await {
                return b;
            }
            notified.await;
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.heap.is_empty()
    }

    /// Keys in the order they would be popped.
    pub async fn snapshot(&self) -> Vec<BatchKey> {
        let guard = self.inner.lock().await;
        let mut items: Vec<PendingBatch> = guard.heap.iter().cloned().collect();
        items.sort_by(|a, b| b.cmp(a));
        items.into_iter().map(|b| b.key).collect()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}
