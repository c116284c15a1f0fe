use super::*;

#[test]
fn new_subscription_is_active() {
    let subscription = Subscription::new();
    let token = subscription.token();
    assert!(subscription.is_active());
    assert!(token.is_active());
}

#[test]
fn unsubscribe_deactivates_every_token() {
    let subscription = Subscription::new();
    let first = subscription.token();
    let second = first.clone();
    subscription.unsubscribe();
    assert!(!subscription.is_active());
    assert!(!first.is_active());
    assert!(!second.is_active());
}

#[test]
fn unsubscribe_is_idempotent() {
    let subscription = Subscription::new();
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert!(!subscription.is_active());
}

#[test]
fn drop_deactivates_tokens() {
    let subscription = Subscription::new();
    let token = subscription.token();
    drop(subscription);
    assert!(!token.is_active());
}

#[tokio::test]
async fn cancelled_resolves_after_unsubscribe() {
    let subscription = Subscription::new();
    let token = subscription.token();
    let waiter = tokio::spawn(async move { token.cancelled().await });
    subscription.unsubscribe();
    tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
        .await
        .expect("cancelled should resolve")
        .expect("task should not panic");
}

#[tokio::test]
async fn cancelled_resolves_immediately_when_already_cancelled() {
    let subscription = Subscription::new();
    let token = subscription.token();
    subscription.unsubscribe();
    tokio::time::timeout(std::time::Duration::from_secs(1), token.cancelled())
        .await
        .expect("cancelled should resolve");
}

#[tokio::test]
async fn cancelled_resolves_when_subscription_dropped() {
    let subscription = Subscription::new();
    let token = subscription.token();
    drop(subscription);
    tokio::time::timeout(std::time::Duration::from_secs(1), token.cancelled())
        .await
        .expect("cancelled should resolve");
}
