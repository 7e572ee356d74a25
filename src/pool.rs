//! A bounded worker pool shared by the orchestrator's category-level
//! scheduling and the security sub-orchestrator's shard-level scheduling
//! (spec §5, §9: "a bounded worker pool (semaphore of capacity N) is
//! sufficient throughout; avoid unbounded fan-out").
//!
//! Built on a dedicated `rayon::ThreadPool` sized independently of the
//! global rayon pool, so the two layers of parallelism in spec §5 don't
//! contend for the same thread budget.

use std::sync::Mutex;

/// Worker count resolution (spec §4.3 step 3 / §4.5): an explicit
/// `concurrency` wins; otherwise derive from `cores * percent / 100`,
/// minimum 1.
pub fn resolve_worker_count(concurrency: usize, concurrency_percent: u8) -> usize {
    if concurrency > 0 {
        return concurrency;
    }
    let cores = num_cpus::get();
    let derived = (cores * concurrency_percent as usize) / 100;
    derived.max(1)
}

/// Run `jobs` through `work`, bounded to `worker_count` concurrent
/// executions. A `worker_count` of 1 takes a sequential path with
/// identical semantics, per spec §4.3 step 3 ("selects a sequential code
/// path with identical semantics to preserve determinism in tests").
///
/// Results are returned in the same order as `jobs`, even though execution
/// may complete out of order (spec §5: "per-category results are
/// independent and may complete out of order"; ordering is restored here
/// purely for caller convenience, not because the spec requires it of the
/// pool itself).
pub fn run_bounded<J, R>(jobs: Vec<J>, worker_count: usize, work: impl Fn(J) -> R + Send + Sync) -> Vec<R>
where
    J: Send,
    R: Send,
{
    if worker_count <= 1 || jobs.len() <= 1 {
        return jobs.into_iter().map(work).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .expect("failed to build bounded worker pool");

    let results: Mutex<Vec<Option<R>>> = Mutex::new((0..jobs.len()).map(|_| None).collect());

    pool.install(|| {
        use rayon::prelude::*;
        jobs.into_iter().enumerate().par_bridge().for_each(|(index, job)| {
            let result = work(job);
            results.lock().unwrap()[index] = Some(result);
        });
    });

    results
        .into_inner()
        .unwrap()
        .into_iter()
        .map(|r| r.expect("every job slot is filled exactly once"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn explicit_concurrency_wins() {
        assert_eq!(resolve_worker_count(4, 50), 4);
    }

    #[test]
    fn derived_concurrency_is_at_least_one() {
        assert!(resolve_worker_count(0, 1) >= 1);
    }

    #[test]
    fn preserves_result_order() {
        let jobs = vec![1, 2, 3, 4, 5];
        let results = run_bounded(jobs, 3, |n| n * 10);
        assert_eq!(results, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn single_worker_is_sequential() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = order.clone();
        let jobs = vec![1, 2, 3];
        run_bounded(jobs, 1, move |n| {
            order_clone.lock().unwrap().push(n);
        });
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn runs_concurrently_faster_than_sequential_sum() {
        let counter = Arc::new(AtomicUsize::new(0));
        let jobs: Vec<usize> = (0..4).collect();
        let counter_clone = counter.clone();
        let start = Instant::now();
        run_bounded(jobs, 4, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
        });
        let elapsed = start.elapsed();
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        // Sequential would take >=200ms; bounded-parallel should be well under that.
        assert!(elapsed < Duration::from_millis(180), "elapsed={elapsed:?}");
    }
}
