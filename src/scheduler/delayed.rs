use std::sync::Arc;
use std::time::Duration;

use super::{Action, Scheduler};
use crate::computation::Computation;
use crate::runtime;
use crate::subscription::WithCallbacksSubscription;

/// Runs actions after a fixed delay.
///
/// The timer is disarmed by a listener on the computation's
/// [`WithCallbacksSubscription`]; cancelling before the delay elapses means
/// the action never runs.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use lazy_future::scheduler::{DelayedScheduler, Scheduler};
/// use lazy_future::runtime::block_on;
///
/// let scheduler = DelayedScheduler::new(Duration::from_millis(1));
/// assert!(block_on(scheduler.schedule(Box::new(|| Ok(())))).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedScheduler {
    delay: Duration,
}

impl DelayedScheduler {
    /// Creates a scheduler that waits `delay` before running each action.
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The configured delay.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `action` after `delay`.
    pub fn schedule_after(action: Action, delay: Duration) -> Computation<()> {
        let subscription = Arc::new(WithCallbacksSubscription::new());
        let (settler, computation) = Computation::pending(subscription.clone());

        let timer = runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            if settler.is_cancelled() {
                return;
            }
            settler.settle(action());
        });

        let timer = timer.abort_handle();
        subscription.add_listener(move || timer.abort());

        computation
    }
}

impl Scheduler for DelayedScheduler {
    fn schedule(&self, action: Action) -> Computation<()> {
        Self::schedule_after(action, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FutureError;
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn flagging_action(flag: &Arc<AtomicBool>) -> Action {
        let flag = Arc::clone(flag);
        Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let scheduler = DelayedScheduler::new(Duration::from_millis(100));
        let computation = scheduler.schedule(flagging_action(&ran));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!ran.load(Ordering::SeqCst));

        assert!(computation.await.is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_delay_prevents_action() {
        let ran = Arc::new(AtomicBool::new(false));
        let computation =
            DelayedScheduler::schedule_after(flagging_action(&ran), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(10)).await;
        computation.cancel();
        computation.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!ran.load(Ordering::SeqCst));
        assert!(
            tokio::time::timeout(Duration::from_secs(1), computation)
                .await
                .is_err()
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_failing_action_rejects() {
        let computation = DelayedScheduler::schedule_after(
            Box::new(|| Err(FutureError::msg("Error"))),
            Duration::from_millis(5),
        );
        assert_eq!(computation.await.unwrap_err().to_string(), "Error");
    }
}
