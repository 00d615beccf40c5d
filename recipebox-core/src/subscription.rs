//! Live subscriptions with an explicit cancel handle.
//!
//! A [`Subscription`] is the consumer end of a standing request for updates.
//! It is a [`Stream`] that yields values until the producer goes away or the
//! consumer calls [`Subscription::cancel`]. Cancelling is idempotent, happens
//! implicitly on drop, and discards anything still queued: no value is
//! delivered after `cancel` returns.
//!
//! Producers hold a [`Publisher`] and can await [`Publisher::closed`] to tear
//! down their listener once every consumer is gone.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;

/// Creates a connected publisher/subscription pair.
pub fn channel<T: Send + 'static>() -> (Publisher<T>, Subscription<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let stream = stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|value| (value, receiver))
    })
    .boxed();

    (
        Publisher { sender },
        Subscription {
            stream: Some(stream),
        },
    )
}

/// Consumer end of a live subscription.
pub struct Subscription<T> {
    stream: Option<BoxStream<'static, T>>,
}

impl<T: Send + 'static> Subscription<T> {
    /// Wraps an arbitrary stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self {
            stream: Some(stream.boxed()),
        }
    }

    /// A subscription that never yields.
    pub fn closed() -> Self {
        Self { stream: None }
    }

    /// Transforms every value. Cancelling the result cancels the source.
    pub fn map<U, F>(self, f: F) -> Subscription<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Subscription {
            stream: self.stream.map(|s| s.map(f).boxed()),
        }
    }
}

impl<T> Subscription<T> {
    /// Stops the subscription. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Subscription cancelled");
        }
    }

    /// Returns false once cancelled.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        match this.stream.as_mut() {
            Some(stream) => match stream.poll_next_unpin(cx) {
                Poll::Ready(None) => {
                    this.stream = None;
                    Poll::Ready(None)
                }
                other => other,
            },
            None => Poll::Ready(None),
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Producer end of a live subscription.
#[derive(Debug)]
pub struct Publisher<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Publisher<T> {
    /// Delivers a value. Returns false if the subscription is gone.
    pub fn publish(&self, value: T) -> bool {
        self.sender.send(value).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the subscription has been cancelled or dropped.
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (publisher, mut subscription) = channel();
        assert!(publisher.publish(1));
        assert!(publisher.publish(2));

        assert_eq!(subscription.next().await, Some(1));
        assert_eq!(subscription.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_drops_queued_values() {
        let (publisher, mut subscription) = channel();
        publisher.publish("queued");

        subscription.cancel();
        subscription.cancel();

        assert!(!subscription.is_active());
        assert_eq!(subscription.next().await, None);
        assert!(publisher.is_closed());
        assert!(!publisher.publish("late"));
    }

    #[tokio::test]
    async fn test_drop_closes_publisher() {
        let (publisher, subscription) = channel::<u8>();
        drop(subscription);
        publisher.closed().await;
        assert!(publisher.is_closed());
    }

    #[tokio::test]
    async fn test_map_cancels_source() {
        let (publisher, subscription) = channel();
        let mut doubled = subscription.map(|n: i32| n * 2);

        publisher.publish(21);
        assert_eq!(doubled.next().await, Some(42));

        doubled.cancel();
        assert!(publisher.is_closed());
    }

    #[tokio::test]
    async fn test_ends_when_publisher_dropped() {
        let (publisher, mut subscription) = channel::<u8>();
        drop(publisher);
        assert_eq!(subscription.next().await, None);
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn test_closed_subscription_yields_nothing() {
        let mut subscription = Subscription::<u8>::closed();
        assert_eq!(subscription.next().await, None);
    }
}
