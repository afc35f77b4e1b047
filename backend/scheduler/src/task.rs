//! Registered periodic work units.

use std::fmt;
use std::sync::Arc;

/// Callback invoked when a task is due. Returning an error marks that run as
/// failed; it never affects sibling tasks.
pub type TaskFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Identity of one registration. Slugs may repeat, ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Per-registration options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOptions {
    /// Invoke the callback once, synchronously, before `register` returns.
    /// This run is in addition to the tick-driven ones and does not advance
    /// the tick counter.
    pub run_now: bool,
}

impl TaskOptions {
    pub fn run_now() -> Self {
        Self { run_now: true }
    }
}

#[derive(Clone)]
pub(crate) struct Task {
    pub id: TaskId,
    pub slug: String,
    pub interval: u64,
    pub callback: TaskFn,
}

impl Task {
    pub fn is_due(&self, tick: u64) -> bool {
        tick % self.interval == 0
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("slug", &self.slug)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(interval: u64) -> Task {
        Task {
            id: TaskId(1),
            slug: "refresh-events".into(),
            interval,
            callback: Arc::new(|| Ok(())),
        }
    }

    #[test]
    fn due_on_multiples_of_interval() {
        let t = task(3);
        let due: Vec<u64> = (1..=10).filter(|n| t.is_due(*n)).collect();
        assert_eq!(due, vec![3, 6, 9]);
    }

    #[test]
    fn interval_of_one_is_due_every_tick() {
        let t = task(1);
        assert!((1..=5).all(|n| t.is_due(n)));
    }
}
