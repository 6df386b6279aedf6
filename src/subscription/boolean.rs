use super::{CancelFlag, Subscription};

/// A subscription that only records whether it was cancelled.
///
/// Cancellation gates delivery but cannot stop the underlying work, which
/// makes it the right fit for handles driven by someone else.
#[derive(Debug, Default)]
pub struct BooleanSubscription {
    flag: CancelFlag,
}

impl BooleanSubscription {
    /// Creates an uncancelled subscription.
    pub fn new() -> Self {
        Self {
            flag: CancelFlag::new(),
        }
    }

    pub(crate) const fn flag(&self) -> &CancelFlag {
        &self.flag
    }
}

impl Subscription for BooleanSubscription {
    fn cancel(&self) {
        self.flag.set();
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(10)]
    fn test_cancel_is_idempotent(#[case] times: usize) {
        let subscription = BooleanSubscription::new();
        assert!(!subscription.is_cancelled());
        for _ in 0..times {
            subscription.cancel();
        }
        assert!(subscription.is_cancelled());
    }
}
