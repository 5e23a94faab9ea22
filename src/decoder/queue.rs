//! Shared job queue.
//!
//! An unbounded multi-producer/multi-consumer FIFO of decode jobs.
//! `submit` never blocks the producer; `take` blocks the calling worker for
//! at most the given timeout. Each enqueued job is delivered to exactly one
//! caller.

use super::job::DecodeJob;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

/// FIFO queue shared by all producers and workers.
///
/// Ordering is FIFO across producers; there is no priority. The queue is the
/// only cross-worker coordination point besides the stop signal.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<DecodeJob>>,
    available: Notify,
}

impl JobQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a job without blocking.
    pub fn submit(&self, job: DecodeJob) {
        self.jobs.lock().push_back(job);
        self.available.notify_one();
    }

    /// Removes and returns the oldest job, blocking until one is available
    /// or `timeout` elapses.
    ///
    /// Returns `None` on timeout; a queue-empty timeout is expected and not
    /// an error. With `Duration::ZERO` this degenerates to a non-blocking
    /// poll, which workers use to drain the queue during shutdown.
    pub async fn take(&self, timeout: Duration) -> Option<DecodeJob> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(job) = self.pop() {
                return Some(job);
            }

            if tokio::time::timeout_at(deadline, self.available.notified())
                .await
                .is_err()
            {
                // A submit may have raced the timeout.
                return self.pop();
            }
        }
    }

    /// Number of jobs currently queued.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Returns true if no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    fn pop(&self) -> Option<DecodeJob> {
        let mut jobs = self.jobs.lock();
        let job = jobs.pop_front();
        // Notify permits don't accumulate, so chain the wakeup when more
        // work remains for other blocked takers.
        if job.is_some() && !jobs.is_empty() {
            self.available.notify_one();
        }
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::job::OnFinish;
    use std::sync::Arc;

    fn test_job(name: &str) -> DecodeJob {
        let handler: OnFinish = Arc::new(|_, _, _, _| {});
        DecodeJob::new(format!("/captures/{name}.wav"), handler, serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_take_returns_none_on_timeout() {
        let queue = JobQueue::new();
        let job = queue.take(Duration::from_millis(20)).await;
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn test_fifo_ordering() {
        let queue = JobQueue::new();
        queue.submit(test_job("first"));
        queue.submit(test_job("second"));
        queue.submit(test_job("third"));

        let a = queue.take(Duration::ZERO).await.unwrap();
        let b = queue.take(Duration::ZERO).await.unwrap();
        let c = queue.take(Duration::ZERO).await.unwrap();

        assert!(a.source_path.ends_with("first.wav"));
        assert!(b.source_path.ends_with("second.wav"));
        assert!(c.source_path.ends_with("third.wav"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_take_wakes_on_submit() {
        let queue = Arc::new(JobQueue::new());

        let taker = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.take(Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.submit(test_job("late"));

        let job = tokio::time::timeout(Duration::from_secs(1), taker)
            .await
            .expect("taker timed out")
            .unwrap();
        assert!(job.is_some());
    }

    #[tokio::test]
    async fn test_each_job_delivered_to_exactly_one_taker() {
        let queue = Arc::new(JobQueue::new());
        for i in 0..8 {
            queue.submit(test_job(&format!("job-{i}")));
        }

        let mut takers = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            takers.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                while let Some(job) = queue.take(Duration::from_millis(50)).await {
                    taken.push(job.source_path);
                }
                taken
            }));
        }

        let mut all: Vec<_> = Vec::new();
        for taker in takers {
            all.extend(taker.await.unwrap());
        }

        all.sort();
        all.dedup();
        assert_eq!(all.len(), 8, "every job delivered exactly once");
        assert!(queue.is_empty());
    }
}
