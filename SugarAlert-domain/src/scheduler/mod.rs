//! One-shot job scheduler
//!
//! A single background task owns a min-heap of jobs keyed by their run time.
//! Request handlers submit jobs through a channel; the background task fires
//! each job once its run time has been reached and then forgets it.

mod clock;

use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use clock::{Clock, SystemClock};

/// Identifier handed out for every accepted job
pub type JobId = Uuid;

type JobTask = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Scheduler errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler has been stopped and accepts no more jobs
    #[error("Job scheduler is not running")]
    Stopped,
}

/// Scheduler tuning
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Upper bound on how long the loop sleeps before re-reading the clock
    pub tick: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
        }
    }
}

struct ScheduledJob {
    id: JobId,
    run_at: DateTime<Local>,
    seq: u64,
    task: JobTask,
}

// Reversed so that `BinaryHeap` pops the earliest job first, FIFO among equal run times
impl Ord for ScheduledJob {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.run_at == other.run_at && self.seq == other.seq
    }
}

impl Eq for ScheduledJob {}

enum Command {
    Submit(ScheduledJob),
    Shutdown(oneshot::Sender<usize>),
}

struct Inner {
    sender: mpsc::UnboundedSender<Command>,
    clock: Arc<dyn Clock>,
    running: AtomicBool,
    pending: Arc<AtomicUsize>,
    next_seq: AtomicU64,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the background scheduler; clones share the same queue
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("running", &self.is_running())
            .field("pending_jobs", &self.pending_jobs())
            .finish()
    }
}

impl JobScheduler {
    /// Spawn the background loop on the current tokio runtime
    pub fn start(clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn(run_loop(
            receiver,
            Arc::clone(&clock),
            config.tick,
            Arc::clone(&pending),
        ));

        info!("Job scheduler started");

        Self {
            inner: Arc::new(Inner {
                sender,
                clock,
                running: AtomicBool::new(true),
                pending,
                next_seq: AtomicU64::new(0),
                handle: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Register `task` to run once at `run_at`
    ///
    /// A run time that has already passed fires on the next loop iteration.
    pub fn schedule_at<F, Fut>(&self, run_at: DateTime<Local>, task: F) -> Result<JobId, SchedulerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if !self.is_running() {
            return Err(SchedulerError::Stopped);
        }

        let job = ScheduledJob {
            id: Uuid::new_v4(),
            run_at,
            seq: self.inner.next_seq.fetch_add(1, AtomicOrdering::Relaxed),
            task: Box::new(move || -> BoxFuture<'static, ()> { Box::pin(task()) }),
        };
        let id = job.id;

        self.inner.pending.fetch_add(1, AtomicOrdering::SeqCst);
        if self.inner.sender.send(Command::Submit(job)).is_err() {
            self.inner.pending.fetch_sub(1, AtomicOrdering::SeqCst);
            return Err(SchedulerError::Stopped);
        }

        debug!(job_id = %id, run_at = %run_at, "Job submitted");
        Ok(id)
    }

    /// Current time according to the scheduler's clock
    pub fn now(&self) -> DateTime<Local> {
        self.inner.clock.now()
    }

    /// Number of jobs accepted but not yet fired
    pub fn pending_jobs(&self) -> usize {
        self.inner.pending.load(AtomicOrdering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(AtomicOrdering::SeqCst)
    }

    /// Stop the loop, discarding every job that has not fired yet
    ///
    /// Returns the number of discarded jobs.
    pub async fn stop(&self) -> Result<usize, SchedulerError> {
        if !self.inner.running.swap(false, AtomicOrdering::SeqCst) {
            return Err(SchedulerError::Stopped);
        }

        let (reply, discarded) = oneshot::channel();
        self.inner
            .sender
            .send(Command::Shutdown(reply))
            .map_err(|_| SchedulerError::Stopped)?;
        let discarded = discarded.await.map_err(|_| SchedulerError::Stopped)?;

        let handle = match self.inner.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Job scheduler task ended abnormally: {}", e);
            }
        }

        Ok(discarded)
    }
}

async fn run_loop(
    mut receiver: mpsc::UnboundedReceiver<Command>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    pending: Arc<AtomicUsize>,
) {
    let mut queue: BinaryHeap<ScheduledJob> = BinaryHeap::new();

    loop {
        fire_due_jobs(&mut queue, clock.as_ref(), &pending);

        let wait = queue
            .peek()
            .map(|job| (job.run_at - clock.now()).to_std().unwrap_or(Duration::ZERO).min(tick))
            .unwrap_or(tick);

        tokio::select! {
            command = receiver.recv() => match command {
                Some(Command::Submit(job)) => queue.push(job),
                Some(Command::Shutdown(reply)) => {
                    let discarded = discard(&mut queue, &pending);
                    let _ = reply.send(discarded);
                    break;
                }
                None => {
                    discard(&mut queue, &pending);
                    break;
                }
            },
            _ = tokio::time::sleep(wait), if !queue.is_empty() => {}
        }
    }

    // Jobs that raced the shutdown are dropped as well
    receiver.close();
    while let Ok(command) = receiver.try_recv() {
        if let Command::Submit(job) = command {
            pending.fetch_sub(1, AtomicOrdering::SeqCst);
            warn!(job_id = %job.id, "Job submitted during shutdown was discarded");
        }
    }

    info!("Job scheduler stopped");
}

fn fire_due_jobs(queue: &mut BinaryHeap<ScheduledJob>, clock: &dyn Clock, pending: &AtomicUsize) {
    let now = clock.now();
    while queue.peek().is_some_and(|job| job.run_at <= now) {
        if let Some(job) = queue.pop() {
            pending.fetch_sub(1, AtomicOrdering::SeqCst);
            info!(job_id = %job.id, run_at = %job.run_at, "Firing scheduled job");
            tokio::spawn((job.task)());
        }
    }
}

fn discard(queue: &mut BinaryHeap<ScheduledJob>, pending: &AtomicUsize) -> usize {
    let discarded = queue.len();
    if discarded > 0 {
        warn!("Discarding {} pending job(s) on shutdown", discarded);
    }
    pending.fetch_sub(discarded, AtomicOrdering::SeqCst);
    queue.clear();
    discarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;
    use chrono::TimeZone;
    use tokio::time::timeout;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 11, 27, hour, minute, 0).single().unwrap()
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_millis(5),
        }
    }

    fn job(run_at: DateTime<Local>, seq: u64) -> ScheduledJob {
        ScheduledJob {
            id: Uuid::new_v4(),
            run_at,
            seq,
            task: Box::new(|| -> BoxFuture<'static, ()> { Box::pin(async {}) }),
        }
    }

    #[test]
    fn test_queue_pops_earliest_first() {
        let mut queue = BinaryHeap::new();
        queue.push(job(at(9, 0), 0));
        queue.push(job(at(7, 30), 1));
        queue.push(job(at(8, 0), 2));
        queue.push(job(at(7, 30), 3));

        let order: Vec<(DateTime<Local>, u64)> = std::iter::from_fn(|| queue.pop())
            .map(|job| (job.run_at, job.seq))
            .collect();

        assert_eq!(
            order,
            vec![(at(7, 30), 1), (at(7, 30), 3), (at(8, 0), 2), (at(9, 0), 0)]
        );
    }

    #[tokio::test]
    async fn test_job_fires_when_clock_reaches_run_at() {
        let clock = Arc::new(ManualClock::new(at(7, 0)));
        let scheduler = JobScheduler::start(clock.clone(), fast_config());
        let (tx, mut rx) = mpsc::unbounded_channel();

        scheduler
            .schedule_at(at(8, 0), move || async move {
                let _ = tx.send("fired");
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "job must not fire before its run time");
        assert_eq!(scheduler.pending_jobs(), 1);

        clock.set(at(8, 0));
        let fired = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(fired, Some("fired"));
        assert_eq!(scheduler.pending_jobs(), 0);
    }

    #[tokio::test]
    async fn test_past_due_job_fires_immediately() {
        let clock = Arc::new(ManualClock::new(at(9, 0)));
        let scheduler = JobScheduler::start(clock, fast_config());
        let (tx, mut rx) = mpsc::unbounded_channel();

        scheduler
            .schedule_at(at(8, 0), move || async move {
                let _ = tx.send(());
            })
            .unwrap();

        assert!(timeout(Duration::from_secs(2), rx.recv()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_jobs_fire_independently() {
        let clock = Arc::new(ManualClock::new(at(9, 0)));
        let scheduler = JobScheduler::start(clock, fast_config());
        let (tx, mut rx) = mpsc::unbounded_channel();

        for _ in 0..2 {
            let tx = tx.clone();
            scheduler
                .schedule_at(at(8, 0), move || async move {
                    let _ = tx.send(());
                })
                .unwrap();
        }

        for _ in 0..2 {
            assert!(timeout(Duration::from_secs(2), rx.recv()).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_stop_discards_pending_and_rejects_new_jobs() {
        let clock = Arc::new(ManualClock::new(at(7, 0)));
        let scheduler = JobScheduler::start(clock, fast_config());

        scheduler.schedule_at(at(8, 0), || async {}).unwrap();
        scheduler.schedule_at(at(9, 0), || async {}).unwrap();

        let discarded = scheduler.stop().await.unwrap();
        assert_eq!(discarded, 2);
        assert_eq!(scheduler.pending_jobs(), 0);
        assert!(!scheduler.is_running());

        assert_eq!(
            scheduler.schedule_at(at(10, 0), || async {}),
            Err(SchedulerError::Stopped)
        );
        assert_eq!(scheduler.stop().await, Err(SchedulerError::Stopped));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_each_fire_once() {
        const TASKS: usize = 16;
        const JOBS_PER_TASK: usize = 250;
        const TOTAL: usize = TASKS * JOBS_PER_TASK;

        let clock = Arc::new(ManualClock::new(at(7, 0)));
        let scheduler = JobScheduler::start(clock.clone(), fast_config());
        let fired: Arc<Vec<AtomicUsize>> = Arc::new((0..TOTAL).map(|_| AtomicUsize::new(0)).collect());

        let submitters: Vec<_> = (0..TASKS)
            .map(|task| {
                let scheduler = scheduler.clone();
                let fired = Arc::clone(&fired);
                tokio::spawn(async move {
                    for n in 0..JOBS_PER_TASK {
                        let fired = Arc::clone(&fired);
                        let slot = task * JOBS_PER_TASK + n;
                        scheduler
                            .schedule_at(at(8, 0), move || async move {
                                fired[slot].fetch_add(1, AtomicOrdering::SeqCst);
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for submitter in submitters {
            submitter.await.unwrap();
        }
        assert_eq!(scheduler.pending_jobs(), TOTAL);

        clock.set(at(8, 0));

        let total_fired = || fired.iter().map(|count| count.load(AtomicOrdering::SeqCst)).sum::<usize>();
        timeout(Duration::from_secs(10), async {
            while total_fired() < TOTAL {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("every job should fire");

        // Give any duplicate firing a chance to show up
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fired.iter().all(|count| count.load(AtomicOrdering::SeqCst) == 1));
        assert_eq!(scheduler.pending_jobs(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_the_queue() {
        let clock = Arc::new(ManualClock::new(at(7, 0)));
        let scheduler = JobScheduler::start(clock, fast_config());
        let other = scheduler.clone();

        other.schedule_at(at(8, 0), || async {}).unwrap();
        assert_eq!(scheduler.pending_jobs(), 1);
        assert_eq!(scheduler.now(), at(7, 0));
    }
}
