use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::Result;

/// Repeats full crawl cycles on a fixed period, or runs exactly one.
///
/// With a period, the next cycle starts `max(0, period - elapsed)` after the
/// previous one began; a cycle never overlaps the one before it. The stop
/// flag is cooperative: a running cycle always completes before the loop
/// exits.
pub struct Supervisor {
    period: Option<Duration>,
    running: Arc<AtomicBool>,
}

impl Supervisor {
    pub fn new(period: Option<Duration>) -> Self {
        Self {
            period,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn once() -> Self {
        Self::new(None)
    }

    /// Handle for stopping the loop from elsewhere (a signal handler).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub async fn run<F, Fut>(&self, mut cycle: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let period = match self.period {
            Some(period) => period,
            None => return cycle().await,
        };

        while self.running.load(Ordering::Acquire) {
            let started = Instant::now();
            cycle().await?;

            let wait = period.saturating_sub(started.elapsed());
            tracing::info!(seconds = wait.as_secs(), "sleeping until next cycle");

            if !self.running.load(Ordering::Acquire) {
                break;
            }
            tokio::time::sleep(wait).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_no_period_runs_once() {
        let supervisor = Supervisor::once();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        supervisor
            .run(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_period_repeats_until_stopped() {
        let supervisor = Supervisor::new(Some(Duration::from_millis(1)));
        let stop = supervisor.stop_handle();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        supervisor
            .run(move || {
                let counter = counter.clone();
                let stop = stop.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                        stop.store(false, Ordering::SeqCst);
                    }
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cycle_error_propagates() {
        let supervisor = Supervisor::once();
        let result = supervisor
            .run(|| async { Err(crate::app::TickertapeError::Other("boom".into())) })
            .await;
        assert!(result.is_err());
    }
}
