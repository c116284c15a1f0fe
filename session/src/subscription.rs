//! Teardown handle for push-driven session work.
//!
//! The owner keeps a [`Subscription`]; background work holds
//! [`SubscriptionToken`]s. Once the subscription is cancelled (explicitly or
//! by drop) every token reports inactive and `cancelled()` resolves, so no
//! state write happens after teardown.

#[cfg(test)]
#[path = "subscription_test.rs"]
mod subscription_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Owning handle; cancels on drop.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    cancel: watch::Sender<bool>,
}

/// Cloneable view of a [`Subscription`] held by background work.
#[derive(Clone, Debug)]
pub struct SubscriptionToken {
    active: Arc<AtomicBool>,
    cancel: watch::Receiver<bool>,
}

impl Subscription {
    #[must_use]
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { active: Arc::new(AtomicBool::new(true)), cancel }
    }

    #[must_use]
    pub fn token(&self) -> SubscriptionToken {
        SubscriptionToken { active: self.active.clone(), cancel: self.cancel.subscribe() }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop all work holding a token. Idempotent.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::Release);
        self.cancel.send_replace(true);
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl SubscriptionToken {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Resolves once the owning subscription is cancelled or dropped.
    pub async fn cancelled(&self) {
        let mut cancel = self.cancel.clone();
        while !*cancel.borrow_and_update() {
            if cancel.changed().await.is_err() {
                break;
            }
        }
    }
}
