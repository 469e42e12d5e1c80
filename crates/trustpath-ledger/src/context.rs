use std::future::Future;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use trustpath_core::Address;

use crate::error::LedgerError;

/// Per-request context: the acting user and a cancellation token.
///
/// Deadlines are the caller's business; cancel the token when one expires.
#[derive(Debug, Clone)]
pub struct Context {
    user: Address,
    cancel: CancellationToken,
}

impl Context {
    pub fn new(user: Address) -> Self {
        Self {
            user,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(user: Address, cancel: CancellationToken) -> Self {
        Self { user, cancel }
    }

    /// The authenticated user requests are made on behalf of.
    pub fn user(&self) -> &Address {
        &self.user
    }

    /// A context for a sub-operation. Cancelling it leaves `self` untouched;
    /// cancelling `self` cancels it.
    pub fn child(&self) -> Self {
        Self {
            user: self.user.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run `fut` unless the context is cancelled first, in which case it is
    /// dropped and [`LedgerError::Cancelled`] is returned.
    pub async fn until_cancelled<T, F>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LedgerError::Cancelled),
            res = fut => res,
        }
    }
}
