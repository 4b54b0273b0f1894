/*!
 * Bounded multi-lane priority queue.
 *
 * One FIFO lane per priority level; dispatch always drains the most urgent
 * non-empty lane first, so ordering within a priority is strictly
 * first-come-first-served and starvation across lanes is bounded by lane
 * discipline, not by aging.
 */

use std::collections::VecDeque;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::errors::CoreError;
use crate::request::{Priority, ProcessedTranslation, TranslationRequest};

/// Channel half used to answer a queued request
pub type Responder = oneshot::Sender<Result<ProcessedTranslation, CoreError>>;

/// A queued unit of work
pub struct QueueItem {
    /// The request
    pub request: TranslationRequest,
    /// When the item entered the queue
    pub enqueued_at: Instant,
    /// Absolute deadline covering queue wait and execution
    pub deadline: Instant,
    /// Completion channel back to the submitter
    pub responder: Responder,
}

/// Fixed-lane priority queue with a shared capacity bound
pub struct PriorityQueue {
    lanes: [VecDeque<QueueItem>; 5],
    capacity: usize,
    len: usize,
}

impl PriorityQueue {
    /// Create a queue holding at most `capacity` items across all lanes
    pub fn new(capacity: usize) -> Self {
        Self {
            lanes: std::array::from_fn(|_| VecDeque::new()),
            capacity,
            len: 0,
        }
    }

    /// Append an item to its priority lane. Returns the item back when the
    /// queue is at capacity; admission control stays with the caller.
    pub fn push(&mut self, item: QueueItem) -> Result<(), QueueItem> {
        if self.len >= self.capacity {
            return Err(item);
        }
        let lane = item.request.priority.lane();
        self.lanes[lane].push_back(item);
        self.len += 1;
        Ok(())
    }

    /// Remove the head of the most urgent non-empty lane
    pub fn pop_next(&mut self) -> Option<QueueItem> {
        for priority in Priority::ALL {
            if let Some(item) = self.lanes[priority.lane()].pop_front() {
                self.len -= 1;
                return Some(item);
            }
        }
        None
    }

    /// Remove and return every item whose deadline has passed
    pub fn expire_overdue(&mut self, now: Instant) -> Vec<QueueItem> {
        let mut expired = Vec::new();
        for lane in &mut self.lanes {
            let mut keep = VecDeque::with_capacity(lane.len());
            while let Some(item) = lane.pop_front() {
                if item.deadline <= now {
                    expired.push(item);
                } else {
                    keep.push_back(item);
                }
            }
            *lane = keep;
        }
        self.len -= expired.len();
        expired
    }

    /// Remove and return everything still queued
    pub fn drain_all(&mut self) -> Vec<QueueItem> {
        let mut items = Vec::with_capacity(self.len);
        for lane in &mut self.lanes {
            items.extend(lane.drain(..));
        }
        self.len = 0;
        items
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
