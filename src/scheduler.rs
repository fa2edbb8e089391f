//! Frame scheduling and delayed tasks
//!
//! The controller never calls `requestAnimationFrame` directly; it gets a
//! `FrameScheduler`. Delayed side effects are queued against the session that
//! scheduled them and dropped when that session goes away.

use crate::sim::SessionId;

/// Ability to ask for (and cancel) the next frame callback
pub trait FrameScheduler {
    /// Ask for one more frame; repeated requests before it fires collapse
    fn request_frame(&mut self);
    /// Drop the outstanding request, if any
    fn cancel_frame(&mut self);
    /// Called at the top of every delivered frame
    fn frame_started(&mut self) {}
}

/// Frame stepper for tests and the headless runner
#[derive(Debug, Default)]
pub struct ManualFrames {
    pending: bool,
    /// Total `request_frame` calls
    pub requests: u32,
    /// Total `cancel_frame` calls that dropped a pending frame
    pub cancels: u32,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending frame; true if one was requested
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        if std::mem::take(&mut self.pending) {
            self.cancels += 1;
        }
    }

    fn frame_started(&mut self) {
        self.pending = false;
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    owner: SessionId,
    due_ms: f64,
    task: T,
}

/// One-shot tasks keyed by owning session
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queue `task` for `owner` at absolute time `due_ms`
    pub fn schedule(&mut self, owner: SessionId, due_ms: f64, task: T) {
        self.tasks.push(Scheduled {
            owner,
            due_ms,
            task,
        });
    }

    /// Drop every task owned by `owner`; returns how many were dropped
    pub fn invalidate(&mut self, owner: SessionId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.owner != owner);
        before - self.tasks.len()
    }

    /// Remove and return tasks due at `now_ms`, earliest first
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<(SessionId, T)> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due_ms <= now_ms);
        self.tasks = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|t| (t.owner, t.task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_frames() {
        let mut frames = ManualFrames::new();
        assert!(!frames.take());

        frames.request_frame();
        frames.request_frame();
        assert!(frames.is_pending());
        assert!(frames.take());
        assert!(!frames.take(), "requests collapse into one frame");

        frames.request_frame();
        frames.cancel_frame();
        frames.cancel_frame();
        assert!(!frames.is_pending());
        assert_eq!(frames.cancels, 1);
        assert_eq!(frames.requests, 3);
    }

    #[test]
    fn test_drain_due_in_order() {
        let mut q = TaskQueue::new();
        q.schedule(SessionId(1), 300.0, "late");
        q.schedule(SessionId(1), 100.0, "early");
        q.schedule(SessionId(1), 900.0, "future");

        assert!(q.drain_due(50.0).is_empty());
        let due = q.drain_due(300.0);
        assert_eq!(due, vec![(SessionId(1), "early"), (SessionId(1), "late")]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_invalidate_only_owner() {
        let mut q = TaskQueue::new();
        q.schedule(SessionId(1), 10.0, 'a');
        q.schedule(SessionId(2), 10.0, 'b');
        q.schedule(SessionId(1), 20.0, 'c');

        assert_eq!(q.invalidate(SessionId(1)), 2);
        assert_eq!(q.invalidate(SessionId(1)), 0);
        assert_eq!(q.drain_due(100.0), vec![(SessionId(2), 'b')]);
        assert!(q.is_empty());
    }
}
