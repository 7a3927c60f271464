//! Static partitioning of a target list across independent workers.

/// Split `targets` into `workers` disjoint slices.
///
/// Worker `w` receives every target whose position satisfies
/// `index % workers == w`. Surplus workers receive empty slices.
pub fn partition_targets<T: Clone>(targets: &[T], workers: usize) -> Vec<Vec<T>> {
    let mut partitions: Vec<Vec<T>> = vec![Vec::new(); workers];
    if workers == 0 {
        return partitions;
    }
    for (index, target) in targets.iter().enumerate() {
        partitions[index % workers].push(target.clone());
    }
    partitions
}

/// Outcome of one worker's slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Targets assigned to the worker.
    pub assigned: usize,
    /// Targets fetched and stored cleanly.
    pub succeeded: usize,
    /// Targets that failed or stored with item errors.
    pub failed: Vec<u64>,
    /// The worker task panicked; its remaining targets were not processed.
    pub panicked: bool,
}

/// Outcome of a whole list run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub workers: Vec<WorkerReport>,
}

impl BatchReport {
    pub fn targets(&self) -> usize {
        self.workers.iter().map(|w| w.assigned).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.workers.iter().map(|w| w.succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed.len()).sum()
    }

    /// Whether every target stored cleanly and no worker panicked.
    pub fn is_clean(&self) -> bool {
        self.workers.iter().all(|w| !w.panicked && w.failed.is_empty())
            && self.succeeded() == self.targets()
    }
}
