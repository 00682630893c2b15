use super::failure::{MoveBranchError, MoveOperation, MoveStaleBranchesError};
use super::mover::BranchMover;
use super::StaleBranch;
use crate::utils::error::GroombaError;
use std::panic;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info};

/// Moves a batch of branches through a fixed pool of workers.
///
/// Workers pull from one shared queue, so a worker that finishes early takes
/// the next pending branch. Failures travel over a second channel to a
/// single aggregator; nothing else is shared between workers.
pub struct BatchCoordinator<'a> {
    mover: BranchMover<'a>,
    max_concurrency: usize,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(mover: BranchMover<'a>, max_concurrency: usize) -> Self {
        Self {
            mover,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn pool_size(&self, pending: usize) -> usize {
        self.max_concurrency.min(pending.max(1))
    }

    /// Moves every candidate. Blocks until each one has either succeeded or
    /// been recorded as a failure.
    pub fn move_all(&self, candidates: &[StaleBranch]) -> Result<(), MoveStaleBranchesError> {
        let mut branches = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        for candidate in candidates {
            match candidate.reference.remote_branch() {
                Some((remote, branch)) if remote == self.mover.remote() => {
                    branches.push(branch.to_string())
                }
                _ => failures.push(MoveBranchError::new(
                    candidate.reference.name.as_str(),
                    MoveOperation::Copy,
                    GroombaError::invalid_args(format!(
                        "{} does not name a branch of remote {}",
                        candidate.reference.name,
                        self.mover.remote()
                    )),
                )),
            }
        }

        failures.extend(self.run_pool(branches));
        into_result(failures)
    }

    pub fn move_branches(&self, branches: Vec<String>) -> Result<(), MoveStaleBranchesError> {
        into_result(self.run_pool(branches))
    }

    fn run_pool(&self, branches: Vec<String>) -> Vec<MoveBranchError> {
        if branches.is_empty() {
            return Vec::new();
        }

        let pool_size = self.pool_size(branches.len());
        info!(
            "Moving {} branches with {} workers",
            branches.len(),
            pool_size
        );

        // Bounded so the producer waits on the pool instead of racing ahead.
        let (work_tx, work_rx) = mpsc::sync_channel::<String>(pool_size);
        let work_rx = Mutex::new(work_rx);
        let (failure_tx, failure_rx) = mpsc::channel::<MoveBranchError>();

        thread::scope(|scope| {
            let aggregator = scope.spawn(move || failure_rx.into_iter().collect::<Vec<_>>());

            let workers: Vec<_> = (0..pool_size)
                .map(|id| {
                    let work_rx = &work_rx;
                    let failure_tx = failure_tx.clone();
                    let mover = &self.mover;
                    scope.spawn(move || run_worker(id, mover, work_rx, failure_tx))
                })
                .collect();
            drop(failure_tx);

            for branch in branches {
                info!("Moving branch {}", branch);
                if work_tx.send(branch).is_err() {
                    // Every worker is gone; their panics surface on join below.
                    break;
                }
            }
            drop(work_tx);

            for worker in workers {
                if let Err(payload) = worker.join() {
                    panic::resume_unwind(payload);
                }
            }

            match aggregator.join() {
                Ok(failures) => failures,
                Err(payload) => panic::resume_unwind(payload),
            }
        })
    }
}

fn into_result(failures: Vec<MoveBranchError>) -> Result<(), MoveStaleBranchesError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(MoveStaleBranchesError::new(failures))
    }
}

fn run_worker(
    id: usize,
    mover: &BranchMover<'_>,
    queue: &Mutex<Receiver<String>>,
    failures: Sender<MoveBranchError>,
) {
    while let Some(branch) = next_branch(queue) {
        debug!(worker = id, branch = %branch, "picked up branch");
        if let Err(failure) = mover.move_branch(&branch) {
            // The aggregator outlives every worker, so this cannot fail.
            let _ = failures.send(failure);
        }
    }
    debug!(worker = id, "queue drained");
}

/// The lock is only held while waiting for the next item, never while moving.
fn next_branch(queue: &Mutex<Receiver<String>>) -> Option<String> {
    let receiver = match queue.lock() {
        Ok(receiver) => receiver,
        Err(poisoned) => poisoned.into_inner(),
    };
    receiver.recv().ok()
}
