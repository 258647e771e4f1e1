//! Cooperative delayed-task queue.
//!
//! Tasks are plain values released by `advance()` once their delay has
//! elapsed. The queue lives inside whoever scheduled the tasks, so
//! dropping or clearing the owner drops every pending task with it.

use std::time::Duration;

/// Handle returned by [`DelayQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

#[derive(Debug, Clone)]
pub struct DelayQueue<T> {
    /// Time elapsed since the queue was created.
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due: self.now.saturating_add(delay),
            task,
        });
        id
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and release every task now due, earliest first.
    /// Tasks due at the same instant come out in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;

        due.sort_by_key(|s| (s.due, s.id.0));
        due.into_iter().map(|s| s.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_tasks_when_due() {
        let mut queue = DelayQueue::new();
        queue.schedule(Duration::from_millis(500), "short");
        queue.schedule(Duration::from_millis(1000), "long");

        assert!(queue.advance(Duration::from_millis(499)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(1)), vec!["short"]);
        assert_eq!(queue.advance(Duration::from_millis(500)), vec!["long"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn releases_in_due_order() {
        let mut queue = DelayQueue::new();
        queue.schedule(Duration::from_millis(900), 2);
        queue.schedule(Duration::from_millis(100), 1);
        queue.schedule(Duration::from_millis(900), 3);
        assert_eq!(queue.advance(Duration::from_secs(1)), vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut queue = DelayQueue::new();
        let id = queue.schedule(Duration::from_millis(10), "stray");
        assert!(queue.is_pending(id));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut queue = DelayQueue::new();
        queue.schedule(Duration::ZERO, 1);
        queue.schedule(Duration::from_secs(1), 2);
        assert_eq!(queue.len(), 2);
        queue.cancel_all();
        assert!(queue.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut queue = DelayQueue::new();
        queue.schedule(Duration::ZERO, ());
        assert_eq!(queue.advance(Duration::ZERO).len(), 1);
    }
}
