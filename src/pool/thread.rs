//! Duty-cycled thread pool implementation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::error::{PoolError, PoolResult};
use super::PoolStats;
use crate::config::PoolConfig;
use crate::queue::ConcurrentQueue;

/// Default pool name used for thread names and log fields.
const DEFAULT_NAME: &str = "tidepool";

/// A queued unit of work.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    /// No threads running; `initialize` may start the pool.
    Idle,
    /// Workers and timer are live.
    Working,
    /// Shutdown in progress; settles back to `Idle`.
    Terminating,
}

/// State guarded by the pool mutex.
struct PoolState {
    lifecycle: Lifecycle,
    /// Tasks currently mid-execution across all workers.
    active_tasks: usize,
    stats: PoolStats,
}

/// State shared between the pool handle, the workers and the timer.
///
/// The hot flags live in atomics so state queries never contend with the
/// mutex; they are written only while `state` is held, which keeps them
/// consistent with the condition-variable protocol. Lock ordering is
/// always `state` before the queue's internal lock, never the reverse.
struct Shared {
    state: Mutex<PoolState>,
    /// Wakes workers: new task, phase flip to draining, or termination.
    task_waiter: Condvar,
    /// Wakes the timer once `active_tasks` drops to zero, or on termination.
    timer_waiter: Condvar,
    tasks: ConcurrentQueue<Job>,
    accepting: AtomicBool,
    paused: AtomicBool,
    working: AtomicBool,
}

impl Shared {
    fn set_accepting(&self, value: bool) {
        self.accepting.store(value, Ordering::SeqCst);
    }

    fn set_paused(&self, value: bool) {
        self.paused.store(value, Ordering::SeqCst);
    }

    fn set_working(&self, value: bool) {
        self.working.store(value, Ordering::SeqCst);
    }
}

/// Handle to a task submitted through [`ThreadPool::submit_with_result`].
///
/// The result arrives once a worker has executed the task; a panicking
/// task is reported as [`PoolError::WorkerPanic`], and a task discarded by
/// an immediate terminate as [`PoolError::ChannelClosed`].
pub struct JobHandle<R> {
    rx: Receiver<PoolResult<R>>,
}

impl<R> JobHandle<R> {
    /// Block until the task produces a result.
    pub fn wait(self) -> PoolResult<R> {
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => Err(PoolError::ChannelClosed),
        }
    }

    /// Poll for the result without blocking.
    pub fn try_wait(&self) -> Option<PoolResult<R>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PoolError::ChannelClosed)),
        }
    }
}

/// A worker-thread pool with duty-cycled admission control.
///
/// A timer thread flips the pool between a collecting phase (submissions
/// queued, nothing executes) and a draining phase (submissions rejected,
/// workers execute the backlog) every `interval`. The pool starts empty;
/// `initialize` spawns the threads and `terminate` joins them, after which
/// the pool may be initialized again.
pub struct ThreadPool {
    shared: Arc<Shared>,
    /// Worker thread handles, drained on terminate.
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Timer thread handle.
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Pool name for thread names and logging.
    name: String,
}

impl ThreadPool {
    /// Create an uninitialized pool with the default name.
    pub fn new() -> Self {
        Self::named(DEFAULT_NAME)
    }

    /// Create an uninitialized pool with the given name.
    ///
    /// The name shows up in worker/timer thread names and log fields.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    lifecycle: Lifecycle::Idle,
                    active_tasks: 0,
                    stats: PoolStats::default(),
                }),
                task_waiter: Condvar::new(),
                timer_waiter: Condvar::new(),
                tasks: ConcurrentQueue::new(),
                accepting: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                working: AtomicBool::new(false),
            }),
            workers: Mutex::new(Vec::new()),
            timer: Mutex::new(None),
            name: name.into(),
        }
    }

    /// Create and initialize a pool from configuration.
    ///
    /// Check `is_working()` afterwards; initialization only fails if a
    /// thread could not be spawned.
    pub fn from_config(config: &PoolConfig) -> Self {
        let pool = Self::named(config.name.clone());
        pool.initialize(config.worker_count(), config.interval);
        pool
    }

    /// Start the pool: spawn `worker_count` workers and the timer thread.
    ///
    /// Returns false without side effects if the pool is already running
    /// (or still shutting down), if `worker_count` is zero, or if a thread
    /// could not be spawned. On success the pool is in its collecting
    /// phase and accepts submissions.
    pub fn initialize(&self, worker_count: usize, interval: Duration) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        if state.lifecycle != Lifecycle::Idle {
            return false;
        }
        if worker_count == 0 {
            tracing::warn!(pool = %self.name, "initialize rejected: worker count is zero");
            return false;
        }

        // Spawned threads block on the state mutex until this call
        // finishes, so a concurrent terminate cannot observe a
        // half-started pool.
        state.lifecycle = Lifecycle::Working;
        self.shared.set_working(true);
        self.shared.set_accepting(true);

        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-worker-{}", self.name, id))
                .spawn(move || worker_loop(id, shared));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(pool = %self.name, worker = id, error = %e, "failed to spawn worker");
                    return self.roll_back_spawn(state, handles);
                }
            }
        }

        let shared = Arc::clone(&self.shared);
        let timer = thread::Builder::new()
            .name(format!("{}-timer", self.name))
            .spawn(move || timer_loop(shared, interval));
        let timer = match timer {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(pool = %self.name, error = %e, "failed to spawn timer");
                return self.roll_back_spawn(state, handles);
            }
        };

        *self.workers.lock().unwrap() = handles;
        *self.timer.lock().unwrap() = Some(timer);
        drop(state);

        tracing::info!(
            pool = %self.name,
            workers = worker_count,
            interval_ms = interval.as_millis() as u64,
            "pool initialized"
        );
        true
    }

    /// Unwind a partially started pool after a failed thread spawn.
    fn roll_back_spawn(
        &self,
        mut state: MutexGuard<'_, PoolState>,
        handles: Vec<JoinHandle<()>>,
    ) -> bool {
        state.lifecycle = Lifecycle::Terminating;
        self.shared.set_working(false);
        self.shared.set_accepting(false);
        drop(state);

        self.shared.task_waiter.notify_all();
        for handle in handles {
            let _ = handle.join();
        }

        self.shared.state.lock().unwrap().lifecycle = Lifecycle::Idle;
        false
    }

    /// Submit a fire-and-forget task.
    ///
    /// Arguments are bound by closure capture. The task is silently
    /// dropped unless the pool is working and the admission gate is open:
    /// collecting phase with no task still executing from the previous
    /// drain, or any time while paused. Submission never runs the task
    /// inline; an accepted task waits for the next draining phase.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = self.enqueue(Box::new(task));
    }

    /// Submit a task and receive its result through a channel.
    ///
    /// Follows the exact same admission gate as [`submit`](Self::submit),
    /// but rejection is surfaced as an error since this path has a return
    /// value anyway. A panic inside the task is caught and delivered as
    /// [`PoolError::WorkerPanic`].
    pub fn submit_with_result<F, R>(&self, task: F) -> PoolResult<JobHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let job = Box::new(move || {
            match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(value) => {
                    let _ = tx.send(Ok(value));
                }
                Err(payload) => {
                    let _ = tx.send(Err(PoolError::WorkerPanic(panic_message(payload.as_ref()))));
                    // Hand the panic back to the worker so it is logged
                    // and counted exactly like a fire-and-forget task.
                    panic::resume_unwind(payload);
                }
            }
        });

        self.enqueue(job)?;
        Ok(JobHandle { rx })
    }

    /// Run the admission gate and enqueue the job if it passes.
    fn enqueue(&self, job: Job) -> PoolResult<()> {
        let mut state = self.shared.state.lock().unwrap();
        if let Err(e) = self.admission(&state) {
            tracing::debug!(pool = %self.name, reason = e.message(), "submission rejected");
            return Err(e);
        }

        self.shared.tasks.push(job);
        state.stats.queue_len_sum += self.shared.tasks.len() as u64;
        state.stats.queue_len_samples += 1;
        drop(state);

        self.shared.task_waiter.notify_one();
        Ok(())
    }

    /// The admission gate. Must be called with the state lock held.
    fn admission(&self, state: &PoolState) -> PoolResult<()> {
        if state.lifecycle != Lifecycle::Working {
            return Err(PoolError::NotRunning);
        }
        if self.shared.paused.load(Ordering::SeqCst) {
            return Ok(());
        }
        // The gate only truly reopens once every task from the previous
        // draining phase has finished; a straggler blocks admission even
        // though `accepting` is already set.
        if self.shared.accepting.load(Ordering::SeqCst) && state.active_tasks == 0 {
            Ok(())
        } else {
            Err(PoolError::Rejected)
        }
    }

    /// Pause or unpause the pool. Effective only while working.
    ///
    /// Pausing pins the admission gate open and suspends execution:
    /// submissions always succeed, no new task starts. Unpausing wakes all
    /// workers so they re-evaluate whether work is available.
    pub fn set_paused(&self, paused: bool) {
        let state = self.shared.state.lock().unwrap();
        if state.lifecycle != Lifecycle::Working {
            return;
        }

        self.shared.set_paused(paused);
        if paused {
            self.shared.set_accepting(true);
        }
        tracing::debug!(pool = %self.name, paused, "pause flag updated");
        drop(state);

        if !paused {
            self.shared.task_waiter.notify_all();
        }
    }

    /// Whether the pool is paused.
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Whether the admission gate is nominally open (collecting phase).
    ///
    /// A submission may still be rejected while this returns true if a
    /// task from the previous draining phase is executing.
    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }

    /// Whether the pool has live workers (initialized, not terminating).
    pub fn is_working(&self) -> bool {
        self.shared.working.load(Ordering::SeqCst)
    }

    /// Number of queued, not-yet-executing tasks.
    pub fn pending_count(&self) -> usize {
        self.shared.tasks.len()
    }

    /// Number of live worker threads (zero while not working).
    pub fn worker_count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> PoolStats {
        self.shared.state.lock().unwrap().stats.clone()
    }

    /// Shut the pool down and join every thread. Effective only while
    /// working; otherwise returns immediately.
    ///
    /// With `immediately` set, queued-but-unstarted tasks are discarded;
    /// otherwise the workers drain the backlog first. A task already
    /// executing always runs to completion. The timer observes termination
    /// only after its current sleep, so this call can block for up to one
    /// full interval. Afterwards the pool is ready for re-initialization.
    pub fn terminate(&self, immediately: bool) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.lifecycle != Lifecycle::Working {
                return;
            }

            state.lifecycle = Lifecycle::Terminating;
            self.shared.set_working(false);
            self.shared.set_accepting(false);
            self.shared.set_paused(false);

            if immediately {
                self.shared.tasks.clear();
            }
            tracing::info!(pool = %self.name, immediately, "pool terminating");
        }

        self.shared.task_waiter.notify_all();
        self.shared.timer_waiter.notify_all();

        if let Some(timer) = self.timer.lock().unwrap().take() {
            let _ = timer.join();
        }
        for worker in self.workers.lock().unwrap().drain(..) {
            let _ = worker.join();
        }

        let mut state = self.shared.state.lock().unwrap();
        state.lifecycle = Lifecycle::Idle;
        let stats = state.stats.clone();
        drop(state);

        tracing::debug!(
            pool = %self.name,
            completed = stats.completed_tasks,
            panicked = stats.panicked_tasks,
            total_wait_ms = stats.total_wait.as_millis() as u64,
            total_exec_ms = stats.total_exec.as_millis() as u64,
            avg_queue_len = stats.avg_queue_len().unwrap_or(0.0),
            "pool terminated"
        );
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.terminate(false);
    }
}

/// Worker thread main loop.
///
/// Blocks until the pool is draining and a task could be dequeued, or the
/// pool is terminating. The dequeue happens inside the wait predicate
/// while the lock is held, so a wakeup can never race another worker for
/// the same task.
fn worker_loop(id: usize, shared: Arc<Shared>) {
    tracing::debug!(worker = id, "worker started");

    loop {
        let mut job: Option<Job> = None;
        let wait_start = Instant::now();

        let mut state = shared.state.lock().unwrap();
        state = shared
            .task_waiter
            .wait_while(state, |state| {
                if shared.accepting.load(Ordering::SeqCst) || shared.paused.load(Ordering::SeqCst)
                {
                    return true;
                }
                job = shared.tasks.try_pop();
                job.is_none() && state.lifecycle != Lifecycle::Terminating
            })
            .unwrap();
        let waited = wait_start.elapsed();

        let Some(job) = job else {
            // Woken by termination with nothing left to drain.
            drop(state);
            tracing::debug!(worker = id, "worker stopped");
            return;
        };

        state.active_tasks += 1;
        state.stats.queue_len_sum += shared.tasks.len() as u64;
        state.stats.queue_len_samples += 1;
        drop(state);

        let exec_start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| job()));
        let executed = exec_start.elapsed();

        let mut state = shared.state.lock().unwrap();
        state.active_tasks -= 1;
        state.stats.completed_tasks += 1;
        state.stats.total_wait += waited;
        state.stats.total_exec += executed;
        if let Err(payload) = outcome {
            state.stats.panicked_tasks += 1;
            tracing::error!(
                worker = id,
                panic = %panic_message(payload.as_ref()),
                "task panicked"
            );
        }
        drop(state);

        shared.timer_waiter.notify_one();
    }
}

/// Timer thread main loop: the duty cycle.
///
/// Termination is only observed after the sleep completes, so shutdown can
/// lag by up to one interval.
fn timer_loop(shared: Arc<Shared>, interval: Duration) {
    tracing::debug!(interval_ms = interval.as_millis() as u64, "timer started");

    loop {
        thread::sleep(interval);

        let state = shared.state.lock().unwrap();
        if state.lifecycle == Lifecycle::Terminating {
            shared.set_accepting(false);
            tracing::debug!("timer stopped");
            return;
        }

        // Pause pins the pool in its collecting phase.
        let accepting =
            !shared.accepting.load(Ordering::SeqCst) || shared.paused.load(Ordering::SeqCst);
        shared.set_accepting(accepting);
        tracing::debug!(accepting, "phase toggled");

        if !accepting {
            drop(state);
            shared.task_waiter.notify_all();
        } else {
            // Let stragglers from the drain that just ended finish before
            // treating the collecting phase as open.
            let _state = shared
                .timer_waiter
                .wait_while(state, |state| {
                    state.active_tasks > 0 && state.lifecycle != Lifecycle::Terminating
                })
                .unwrap();
        }
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
