use std::collections::LinkedList;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread;

/// A small bounded-queue worker pool. One `JobRunner` closure is shared (via `Arc`) across
/// `size` worker threads; jobs are pulled off a synchronous channel and dispatched to the
/// first worker that reports idle.
///
/// This is the extrinsic parallelism layer described by the parser's resource model: each
/// worker owns its own `Configuration` and scratch feature buffer for the lifetime of the
/// pool, so per-sentence allocation is amortized across the whole run rather than repeated
/// per job.
pub struct ThreadPool<Payload: 'static + Send> {
    queue_tx: SyncSender<Signal<Payload>>,
    term_rx: Receiver<()>,
}

impl<Payload: 'static + Send> ThreadPool<Payload> {
    pub fn spawn<JobRunner>(size: usize, queue_size: usize, job_runner: JobRunner) -> ThreadPool<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (queue_tx, queue_rx) = mpsc::sync_channel(queue_size);
        let (term_tx, term_rx) = mpsc::channel();

        WorkerMux::spawn(size, job_runner, queue_rx, term_tx);

        ThreadPool { queue_tx, term_rx }
    }

    pub fn enqueue(&self, payload: Payload) {
        let _ = self.queue_tx.send(Signal::Job(payload));
    }

    pub fn terminate_and_join(&self) {
        let _ = self.queue_tx.send(Signal::Term);
        let _ = self.term_rx.recv();
    }
}

struct WorkerMux {}

impl WorkerMux {
    fn spawn<JobRunner, Payload: 'static + Send>(
        size: usize,
        job_runner: JobRunner,
        queue_rx: Receiver<Signal<Payload>>,
        term_tx: Sender<()>,
    ) -> WorkerMux
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let job_runner_arc = Arc::new(job_runner);

        let (mux_tx, mux_rx) = mpsc::channel();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::spawn(id, mux_tx.clone(), job_runner_arc.clone()));
        }

        thread::spawn(move || {
            let mut idle_workers: LinkedList<WorkerId> = LinkedList::new();

            loop {
                while idle_workers.is_empty() {
                    match WorkerMux::join_worker_report(&mux_rx).status {
                        WorkerStatus::Idle(id) => idle_workers.push_back(id),
                        WorkerStatus::Term => {}
                    }
                }

                match WorkerMux::join_job_queue(&queue_rx) {
                    Signal::Term => break,
                    Signal::Job(payload) => {
                        let worker_id = idle_workers.pop_back().unwrap();
                        workers.get(worker_id).unwrap().run_job(payload);
                    }
                }
            }

            for worker in &workers {
                worker.terminate();
            }

            let mut terminated_workers = 0;
            while terminated_workers < size {
                match WorkerMux::join_worker_report(&mux_rx).status {
                    WorkerStatus::Idle(_) => {}
                    WorkerStatus::Term => terminated_workers += 1,
                }
            }

            let _ = term_tx.send(());
        });

        WorkerMux {}
    }

    fn join_worker_report(mux_rx: &Receiver<WorkerReport>) -> WorkerReport {
        match mux_rx.recv() {
            Err(err) => panic!("worker report channel closed unexpectedly: {}", err),
            Ok(report) => report,
        }
    }

    fn join_job_queue<Payload: 'static + Send>(queue_rx: &Receiver<Signal<Payload>>) -> Signal<Payload> {
        match queue_rx.recv() {
            Err(err) => panic!("job queue channel closed unexpectedly: {}", err),
            Ok(sig) => sig,
        }
    }
}

struct Worker<Payload: 'static + Send> {
    tx: Sender<Signal<Payload>>,
}

impl<Payload: 'static + Send> Worker<Payload> {
    fn spawn<JobRunner>(id: WorkerId, mux_tx: Sender<WorkerReport>, job_runner: Arc<JobRunner>) -> Worker<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let _ = mux_tx.send(WorkerReport {
                status: WorkerStatus::Idle(id),
            });

            match Worker::join_job(&rx, id) {
                Signal::Term => {
                    let _ = mux_tx.send(WorkerReport {
                        status: WorkerStatus::Term,
                    });
                    break;
                }
                Signal::Job(payload) => job_runner(payload),
            }
        });

        Worker { tx }
    }

    fn run_job(&self, payload: Payload) {
        let _ = self.tx.send(Signal::Job(payload));
    }

    fn terminate(&self) {
        let _ = self.tx.send(Signal::Term);
    }

    fn join_job(rx: &Receiver<Signal<Payload>>, id: WorkerId) -> Signal<Payload> {
        match rx.recv() {
            Err(err) => panic!("mux channel closed unexpectedly on worker {}: {}", id, err),
            Ok(sig) => sig,
        }
    }
}

enum Signal<Payload: 'static + Send> {
    Term,
    Job(Payload),
}

struct WorkerReport {
    status: WorkerStatus,
}

type WorkerId = usize;

enum WorkerStatus {
    Term,
    Idle(WorkerId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn runs_every_enqueued_job() {
        let total = Arc::new(AtomicUsize::new(0));
        let total_clone = total.clone();

        let pool: ThreadPool<usize> = ThreadPool::spawn(4, 8, move |payload| {
            total_clone.fetch_add(payload, Ordering::SeqCst);
        });

        for i in 0..100 {
            pool.enqueue(i);
        }

        pool.terminate_and_join();

        assert_eq!(total.load(Ordering::SeqCst), (0..100).sum());
    }

    #[test]
    fn preserves_one_result_slot_per_job_via_index() {
        let results: Arc<Mutex<Vec<Option<usize>>>> = Arc::new(Mutex::new(vec![None; 10]));
        let results_clone = results.clone();

        let pool: ThreadPool<(usize, usize)> = ThreadPool::spawn(3, 16, move |(index, value)| {
            results_clone.lock().unwrap()[index] = Some(value);
        });

        for i in 0..10 {
            pool.enqueue((i, i * i));
        }

        pool.terminate_and_join();

        let results = results.lock().unwrap();
        for i in 0..10 {
            assert_eq!(results[i], Some(i * i));
        }
    }
}
