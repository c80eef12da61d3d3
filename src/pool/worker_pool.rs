use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::debug;

type Task = Arc<dyn Fn(usize) + Send + Sync + 'static>;

/// A unit of repeatable work: the task is invoked once per repeat index in
/// `[0, repeat)`, each index claimed by exactly one worker.
struct Job {
    task: Task,
    repeat: usize,
    repeats_left: usize,
}

struct PoolState {
    queue: VecDeque<Job>,
    /// Workers currently executing a claimed slice of repeats.
    busy: usize,
    terminate: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    /// Signalled when work arrives or the pool shuts down.
    work_ready: Condvar,
    /// Signalled when the queue drains and the last busy worker finishes.
    all_idle: Condvar,
    worker_count: usize,
}

/// A fixed pool of persistent worker threads executing repeatable jobs.
///
/// Each submitted job carries a repeat count; woken workers claim contiguous
/// slices of the remaining repeats, sized `max(1, repeat / worker_count)`, so
/// large jobs split evenly while small ones stay on few threads. `wait`
/// blocks the caller until every dispatched repeat has run. Cross-worker
/// execution order is unspecified.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `worker_count` persistent workers.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0; callers wanting no pool simply run
    /// sequentially instead of constructing one.
    pub fn new(worker_count: usize) -> WorkerPool {
        assert!(worker_count > 0, "worker_count must be at least 1");

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                busy: 0,
                terminate: false,
            }),
            work_ready: Condvar::new(),
            all_idle: Condvar::new(),
            worker_count,
        });

        let workers = (0..worker_count)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(&shared, id))
            })
            .collect();

        WorkerPool { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.shared.worker_count
    }

    /// Enqueues one job to be executed `repeat` times.
    ///
    /// Wakes every worker when the job is large enough to occupy the whole
    /// pool, otherwise wakes exactly `repeat` of them. A job with
    /// `repeat == 0` is dropped without running.
    pub fn submit<F>(&self, task: F, repeat: usize)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        if repeat == 0 {
            return;
        }

        let mut state = self.shared.state.lock().unwrap();
        state.queue.push_back(Job {
            task: Arc::new(task),
            repeat,
            repeats_left: repeat,
        });
        drop(state);

        if repeat >= self.shared.worker_count {
            self.shared.work_ready.notify_all();
        } else {
            for _ in 0..repeat {
                self.shared.work_ready.notify_one();
            }
        }
    }

    /// Blocks until the queue is empty and no worker is mid-job.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !(state.queue.is_empty() && state.busy == 0) {
            state = self.shared.all_idle.wait(state).unwrap();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.terminate = true;
        }
        self.shared.work_ready.notify_all();

        debug!("joining {} pool workers", self.workers.len());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &PoolShared, id: usize) {
    debug!("pool worker {id} started");

    loop {
        // Claim a contiguous slice of the front job's remaining repeats.
        let (task, start, count) = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if state.terminate {
                    debug!("pool worker {id} terminating");
                    return;
                }
                if !state.queue.is_empty() {
                    break;
                }
                state = shared.work_ready.wait(state).unwrap();
            }

            state.busy += 1;
            let worker_count = shared.worker_count;
            let front = state.queue.front_mut().unwrap();
            let count = (front.repeat / worker_count).max(1).min(front.repeats_left);
            let start = front.repeat - front.repeats_left;
            let task = Arc::clone(&front.task);
            front.repeats_left -= count;
            if front.repeats_left == 0 {
                state.queue.pop_front();
            }
            (task, start, count)
        };

        for index in start..start + count {
            task(index);
        }

        let mut state = shared.state.lock().unwrap();
        state.busy -= 1;
        if state.busy == 0 && state.queue.is_empty() {
            shared.all_idle.notify_all();
        }
    }
}
