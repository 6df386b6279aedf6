use super::Subscription;

/// A subscription that can never be cancelled.
///
/// Used for work that settles synchronously, where there is nothing left to
/// stop by the time a caller could cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn cancel(&self) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}
