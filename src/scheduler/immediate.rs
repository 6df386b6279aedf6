use super::{Action, Scheduler};
use crate::computation::Computation;

/// Runs actions synchronously, at the moment they are scheduled.
///
/// The returned computation has already settled and carries an
/// [`EmptySubscription`](crate::subscription::EmptySubscription).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, action: Action) -> Computation<()> {
        Computation::settled(action())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FutureError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_runs_action_before_returning() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let computation = ImmediateScheduler.schedule(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }));

        assert!(ran.load(Ordering::SeqCst));
        assert!(computation.await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_action_rejects() {
        let computation =
            ImmediateScheduler.schedule(Box::new(|| Err(FutureError::msg("Error"))));
        computation.cancel();
        assert!(!computation.is_cancelled());
        assert_eq!(computation.await.unwrap_err().to_string(), "Error");
    }
}
