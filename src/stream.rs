//! Cancellable async iteration over a task queue.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use tokio_util::sync::CancellationToken;

use crate::queue::{Dequeue, TaskQueue};

/// Pull-based async sequence over a [`TaskQueue`].
///
/// Each step asks the consumer for its next job. `None` means the consumer
/// reported `Consumed` and ends this consumption cycle; the stream is not
/// permanently exhausted -- a later `feed` makes further items available and
/// the stream may be polled again.
///
/// Cancellation is integrated: [`JobStream::cancel`], or cancelling the
/// token the stream was built with, forces the consumption flag to
/// `Consumed` promptly, without queueing behind pending executor work. A job
/// popped by an in-flight step is still delivered to that step; cancellation
/// only affects subsequent steps and never removes jobs already queued.
pub struct JobStream<T> {
    queue: TaskQueue<T>,
    token: CancellationToken,
    in_flight: Option<BoxFuture<'static, Option<T>>>,
}

impl<T: Send + 'static> JobStream<T> {
    pub fn new(queue: TaskQueue<T>) -> Self {
        Self::with_token(queue, CancellationToken::new())
    }

    /// Build over an externally owned token, e.g. one shared with the
    /// host's shutdown plumbing.
    pub fn with_token(queue: TaskQueue<T>, token: CancellationToken) -> Self {
        Self {
            queue,
            token,
            in_flight: None,
        }
    }

    /// Signal cancellation. Idempotent. Writes the consumption flag
    /// immediately rather than waiting for the next step to notice.
    pub fn cancel(&self) {
        self.token.cancel();
        self.queue.cancel_pending();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Produce the next item, racing the dequeue against cancellation.
    pub async fn produce_next(&mut self) -> Option<T> {
        produce_next(self.queue.clone(), self.token.clone()).await
    }
}

/// One iteration step. See [`JobStream`] for the cancellation contract.
async fn produce_next<T: Send + 'static>(
    queue: TaskQueue<T>,
    token: CancellationToken,
) -> Option<T> {
    if token.is_cancelled() {
        // Settle the flag for any external observer and end the cycle
        // without touching the executor.
        queue.cancel_pending();
        return None;
    }

    let step = queue.next();
    tokio::pin!(step);
    let mut cancelled = false;
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled(), if !cancelled => {
                // Push-based: the flag write must not wait behind the
                // executor backlog. The in-flight step still completes and
                // its job, if any, is delivered below.
                queue.cancel_pending();
                cancelled = true;
            }
            outcome = &mut step => {
                return match outcome {
                    Dequeue::Ready(job) => {
                        tracing::trace!(id = %job.id(), priority = %job.priority(), "produced job");
                        Some(job.into_item())
                    }
                    Dequeue::Consumed => None,
                };
            }
        }
    }
}

impl<T: Send + 'static> Stream for JobStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.in_flight.as_mut() {
                Some(step) => {
                    let item = futures::ready!(step.as_mut().poll(cx));
                    this.in_flight = None;
                    return Poll::Ready(item);
                }
                None => {
                    this.in_flight =
                        Some(produce_next(this.queue.clone(), this.token.clone()).boxed());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_stream_yields_none_and_settles_the_flag() {
        tokio_test::block_on(async {
            let queue = TaskQueue::new();
            queue.feed("queued").await;
            assert!(queue.is_waiting());

            let mut stream = queue.stream();
            stream.cancel();
            assert!(!queue.is_waiting());
            assert_eq!(stream.produce_next().await, None);

            // The job survives for the next reader.
            let mut fresh = queue.stream();
            assert_eq!(fresh.produce_next().await, Some("queued"));
        });
    }

    #[test]
    fn stream_ends_cycle_then_resumes_after_feed() {
        tokio_test::block_on(async {
            let queue = TaskQueue::new();
            queue.feed("a").await;

            let mut stream = queue.stream();
            assert_eq!(stream.produce_next().await, Some("a"));
            assert_eq!(stream.produce_next().await, None);

            queue.feed("b").await;
            assert_eq!(stream.produce_next().await, Some("b"));
        });
    }
}
