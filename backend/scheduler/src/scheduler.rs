//! Shared-tick scheduler: any number of periodic callbacks multiplexed onto a
//! single timer.
//!
//! Every `tick_rate` the tick counter is incremented and each task whose
//! interval divides the counter is invoked, in registration order. Callbacks
//! run synchronously on the timer task and are never awaited; a callback
//! that starts I/O should spawn it and return.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use opsy_logging::{DashboardEvent, EventLogger};

use crate::error::{Result, SchedulerError};
use crate::task::{Task, TaskFn, TaskId, TaskOptions};

/// Base period used when none is configured.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(5_000);

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Counter value after the increment.
    pub tick: u64,
    /// Tasks invoked successfully.
    pub ran: usize,
    /// Tasks whose callback returned an error or panicked.
    pub failed: usize,
}

#[derive(Default)]
struct TaskList {
    tasks: Vec<Task>,
    tick: u64,
    next_id: u64,
}

enum TimerState {
    NotStarted,
    Running {
        shutdown: watch::Sender<bool>,
        // Detached on stop; the loop exits once it sees the shutdown signal.
        _handle: JoinHandle<()>,
    },
}

struct Inner {
    tick_rate: Duration,
    tasks: Mutex<TaskList>,
    timer: Mutex<TimerState>,
}

/// Cheaply cloneable handle to one session's scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(tick_rate: Duration) -> Self {
        let tick_rate = if tick_rate.is_zero() {
            warn!(
                default_ms = DEFAULT_TICK_RATE.as_millis() as u64,
                "Zero tick rate requested, using default"
            );
            DEFAULT_TICK_RATE
        } else {
            tick_rate
        };

        Self {
            inner: Arc::new(Inner {
                tick_rate,
                tasks: Mutex::new(TaskList::default()),
                timer: Mutex::new(TimerState::NotStarted),
            }),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        self.inner.tick_rate
    }

    /// Register `callback` to run every `interval` ticks.
    pub fn register<F>(&self, slug: impl Into<String>, interval: u64, callback: F) -> Result<TaskId>
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_with(slug, interval, TaskOptions::default(), callback)
    }

    /// Register with explicit options.
    ///
    /// Slugs are not deduplicated: registering the same slug twice yields two
    /// independent tasks. The shared timer is started on the first
    /// registration when a Tokio runtime is available; without one, ticks
    /// must be driven through [`Scheduler::tick`].
    pub fn register_with<F>(
        &self,
        slug: impl Into<String>,
        interval: u64,
        options: TaskOptions,
        callback: F,
    ) -> Result<TaskId>
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(SchedulerError::EmptySlug);
        }
        if interval == 0 {
            return Err(SchedulerError::InvalidInterval { slug, interval });
        }

        let callback: TaskFn = Arc::new(callback);
        let (id, tick) = {
            let mut list = self.tasks();
            list.next_id += 1;
            let id = TaskId(list.next_id);
            list.tasks.push(Task {
                id,
                slug: slug.clone(),
                interval,
                callback: Arc::clone(&callback),
            });
            (id, list.tick)
        };

        debug!(task = %slug, %id, interval, "registering task to run every {interval} ticks");
        EventLogger::log_event(DashboardEvent::TaskRegistered {
            slug: slug.clone(),
            interval,
        });

        if options.run_now {
            invoke(&slug, tick, &callback);
        }

        if let Err(e) = self.start() {
            debug!(error = %e, "tick timer not started; ticks are driven manually");
        }

        Ok(id)
    }

    /// Remove the earliest registered task with `slug`. Takes effect for all
    /// later invocations, including ones due later in the current tick.
    pub fn remove(&self, slug: &str) -> bool {
        let removed = {
            let mut list = self.tasks();
            match list.tasks.iter().position(|t| t.slug == slug) {
                Some(idx) => {
                    list.tasks.remove(idx);
                    true
                }
                None => false,
            }
        };

        if removed {
            EventLogger::log_event(DashboardEvent::TaskRemoved {
                slug: slug.to_string(),
            });
        } else {
            debug!(task = %slug, "remove: no such task");
        }
        removed
    }

    /// Remove one specific registration.
    pub fn remove_id(&self, id: TaskId) -> bool {
        let removed = {
            let mut list = self.tasks();
            list.tasks
                .iter()
                .position(|t| t.id == id)
                .map(|idx| list.tasks.remove(idx))
        };

        match removed {
            Some(task) => {
                EventLogger::log_event(DashboardEvent::TaskRemoved { slug: task.slug });
                true
            }
            None => false,
        }
    }

    /// Advance the tick counter by one and run every due task.
    ///
    /// The due set is taken at the start of the tick, so tasks registered by
    /// a callback first run on a later tick. Each task is re-checked right
    /// before it runs so one removed mid-tick is skipped.
    pub fn tick(&self) -> TickReport {
        let (tick, due) = {
            let mut list = self.tasks();
            list.tick += 1;
            let tick = list.tick;
            let due: Vec<(TaskId, String, TaskFn)> = list
                .tasks
                .iter()
                .filter(|t| t.is_due(tick))
                .map(|t| (t.id, t.slug.clone(), Arc::clone(&t.callback)))
                .collect();
            (tick, due)
        };

        let mut report = TickReport {
            tick,
            ..Default::default()
        };

        for (id, slug, callback) in due {
            if !self.contains(id) {
                debug!(task = %slug, tick, "task removed earlier in this tick, skipping");
                continue;
            }
            if invoke(&slug, tick, &callback) {
                report.ran += 1;
            } else {
                report.failed += 1;
            }
        }

        report
    }

    /// Start the shared timer. Returns `Ok(false)` if it is already running.
    pub fn start(&self) -> Result<bool> {
        let mut timer = self.timer();
        if matches!(*timer, TimerState::Running { .. }) {
            return Ok(false);
        }

        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(run_loop(
            Arc::downgrade(&self.inner),
            self.inner.tick_rate,
            shutdown_rx,
        ));
        *timer = TimerState::Running {
            shutdown,
            _handle: handle,
        };

        info!(
            tick_rate_ms = self.inner.tick_rate.as_millis() as u64,
            "Starting event loop"
        );
        Ok(true)
    }

    /// Stop the shared timer. Returns `false` if it was not running.
    ///
    /// The tick counter keeps its value; a later `start` continues from it.
    pub fn stop(&self) -> bool {
        let previous = std::mem::replace(&mut *self.timer(), TimerState::NotStarted);
        match previous {
            TimerState::Running { shutdown, .. } => {
                let _ = shutdown.send(true);
                info!("Stopping event loop");
                true
            }
            TimerState::NotStarted => false,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.timer(), TimerState::Running { .. })
    }

    /// Current value of the tick counter.
    pub fn tick_count(&self) -> u64 {
        self.tasks().tick
    }

    pub fn len(&self) -> usize {
        self.tasks().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().tasks.is_empty()
    }

    /// Slugs of all registered tasks, in registration order.
    pub fn slugs(&self) -> Vec<String> {
        self.tasks().tasks.iter().map(|t| t.slug.clone()).collect()
    }

    fn contains(&self, id: TaskId) -> bool {
        self.tasks().tasks.iter().any(|t| t.id == id)
    }

    fn tasks(&self) -> MutexGuard<'_, TaskList> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, TimerState> {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick_rate", &self.inner.tick_rate)
            .field("tasks", &self.len())
            .field("tick", &self.tick_count())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Run one callback inside its own failure boundary. Returns `true` on
/// success.
fn invoke(slug: &str, tick: u64, callback: &TaskFn) -> bool {
    debug!(task = %slug, tick, "running task");

    let error_msg = match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
        Ok(Ok(())) => {
            EventLogger::log_event(DashboardEvent::TaskRan {
                slug: slug.to_string(),
                tick,
            });
            return true;
        }
        Ok(Err(e)) => format!("{e:#}"),
        Err(payload) => panic_message(payload.as_ref()),
    };

    error!(task = %slug, tick, error = %error_msg, "task failed");
    EventLogger::log_event(DashboardEvent::TaskFailed {
        slug: slug.to_string(),
        tick,
        error_msg,
    });
    false
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Timer loop. Holds only a weak reference so dropping the last
/// [`Scheduler`] handle ends it.
async fn run_loop(inner: Weak<Inner>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    // First tick one full period after start, not immediately.
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown wins over a tick that became due in the same poll.
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if *shutdown.borrow() {
                    break;
                }
                let Some(inner) = inner.upgrade() else { break };
                let report = Scheduler { inner }.tick();
                if report.failed > 0 {
                    warn!(tick = report.tick, failed = report.failed, ran = report.ran, "tick finished with failures");
                }
            }
        }
    }

    debug!("event loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (
        Arc<AtomicUsize>,
        impl Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    ) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn run_ticks(scheduler: &Scheduler, k: u64) {
        for _ in 0..k {
            scheduler.tick();
        }
    }

    #[test]
    fn runs_floor_k_over_interval_times() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let mut counters = Vec::new();
        for interval in [1u64, 2, 3, 5, 7] {
            let (count, cb) = counter();
            scheduler.register(format!("every-{interval}"), interval, cb).unwrap();
            counters.push((interval, count));
        }

        let k = 30;
        run_ticks(&scheduler, k);

        for (interval, count) in counters {
            assert_eq!(
                count.load(Ordering::SeqCst) as u64,
                k / interval,
                "interval {interval}"
            );
        }
        assert_eq!(scheduler.tick_count(), k);
    }

    #[test]
    fn run_now_adds_one_synchronous_invocation() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let (count, cb) = counter();
        scheduler
            .register_with("refresh-events", 2, TaskOptions::run_now(), cb)
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.tick_count(), 0);

        run_ticks(&scheduler, 4);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn rejects_zero_interval_and_empty_slug() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        assert_eq!(
            scheduler.register("bad", 0, || Ok(())),
            Err(SchedulerError::InvalidInterval {
                slug: "bad".into(),
                interval: 0
            })
        );
        assert_eq!(
            scheduler.register("  ", 3, || Ok(())),
            Err(SchedulerError::EmptySlug)
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn tasks_run_in_registration_order() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let order = Arc::new(Mutex::new(Vec::new()));
        for slug in ["clients", "events", "checks"] {
            let order = Arc::clone(&order);
            scheduler
                .register(slug, 1, move || {
                    order.lock().unwrap().push(slug);
                    Ok(())
                })
                .unwrap();
        }

        scheduler.tick();
        assert_eq!(*order.lock().unwrap(), vec!["clients", "events", "checks"]);
    }

    #[test]
    fn duplicate_slugs_are_independent_and_remove_takes_the_first() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        scheduler.register("refresh", 1, cb1).unwrap();
        scheduler.register("refresh", 1, cb2).unwrap();

        scheduler.tick();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(scheduler.remove("refresh"));
        scheduler.tick();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.slugs(), vec!["refresh".to_string()]);
    }

    #[test]
    fn removing_unknown_slug_leaves_schedules_alone() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let (count, cb) = counter();
        scheduler.register("events", 2, cb).unwrap();

        assert!(!scheduler.remove("nope"));
        run_ticks(&scheduler, 6);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn remove_by_id_targets_one_registration() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        scheduler.register("refresh", 1, cb1).unwrap();
        let id = scheduler.register("refresh", 1, cb2).unwrap();

        assert!(scheduler.remove_id(id));
        assert!(!scheduler.remove_id(id));
        scheduler.tick();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_removed_mid_tick_never_fires() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let remover = scheduler.clone();
        scheduler
            .register("remover", 1, move || {
                remover.remove("victim");
                Ok(())
            })
            .unwrap();
        let (count, cb) = counter();
        scheduler.register("victim", 1, cb).unwrap();

        let report = scheduler.tick();
        assert_eq!(report.ran, 1);
        run_ticks(&scheduler, 3);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_registered_mid_tick_waits_for_next_tick() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        let (count, cb) = counter();
        let cb = Arc::new(cb);
        let registrar = scheduler.clone();
        scheduler
            .register("registrar", 1, move || {
                if registrar.len() == 1 {
                    let cb = Arc::clone(&cb);
                    registrar.register("late", 1, move || cb())?;
                }
                Ok(())
            })
            .unwrap();

        scheduler.tick();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        scheduler.tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_tasks_do_not_stop_siblings() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        scheduler
            .register("errors", 1, || Err(anyhow::anyhow!("backend unreachable")))
            .unwrap();
        scheduler
            .register("panics", 1, || panic!("bad row"))
            .unwrap();
        let (count, cb) = counter();
        scheduler.register("healthy", 1, cb).unwrap();

        let report = scheduler.tick();
        assert_eq!(report.failed, 2);
        assert_eq!(report.ran, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Failing tasks stay registered.
        assert_eq!(scheduler.len(), 3);
    }

    #[test]
    fn start_without_runtime_is_reported() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        assert_eq!(scheduler.start(), Err(SchedulerError::NoRuntime));
        scheduler.register("events", 1, || Ok(())).unwrap();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn zero_tick_rate_falls_back_to_default() {
        let scheduler = Scheduler::new(Duration::ZERO);
        assert_eq!(scheduler.tick_rate(), DEFAULT_TICK_RATE);
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let scheduler = Scheduler::new(DEFAULT_TICK_RATE);
        assert!(!scheduler.is_running());

        scheduler.register("events", 6, || Ok(())).unwrap();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.start(), Ok(false));

        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert_eq!(scheduler.start(), Ok(true));
        assert!(scheduler.stop());
    }

    #[tokio::test]
    async fn timer_drives_ticks_until_stopped() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let (count, cb) = counter();
        scheduler.register("fast", 1, cb).unwrap();

        time::sleep(Duration::from_millis(120)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
        assert!(scheduler.tick_count() >= 3);

        assert!(scheduler.stop());
        time::sleep(Duration::from_millis(30)).await;
        let settled = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn no_tick_after_stop_even_when_one_is_overdue() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let (count, cb) = counter();
        scheduler.register("fast", 1, cb).unwrap();

        // Let the loop arm its timer, then block past the first deadline so
        // the tick and the shutdown are ready together.
        tokio::task::yield_now().await;
        std::thread::sleep(Duration::from_millis(30));
        assert!(scheduler.stop());

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.tick_count(), 0);
    }
}
