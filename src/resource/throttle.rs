//! Bounded-concurrency batch helpers
//!
//! Independent requests over a list of items (checking or deleting N child
//! layers) run through a fixed window of in-flight futures. Results come back
//! in input order.

use crate::error::Result;
use futures::future;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run `f` over every item, at most `limit` at a time.
///
/// On the first failure no further items are started; the futures already
/// in flight are drained and the first error is returned.
pub async fn try_all<I, T, F, Fut>(items: I, limit: usize, f: F) -> Result<Vec<T>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let failed = AtomicBool::new(false);
    let mut results = stream::iter(items)
        .take_while(|_| future::ready(!failed.load(Ordering::Relaxed)))
        .map(f)
        .buffered(limit.max(1));

    let mut values = Vec::new();
    let mut first_error = None;

    while let Some(result) = results.next().await {
        match result {
            Ok(value) => values.push(value),
            Err(e) => {
                failed.store(true, Ordering::Relaxed);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

/// Run `f` over every item, at most `limit` at a time, keeping every outcome
pub async fn settle_all<I, T, F, Fut>(items: I, limit: usize, f: F) -> Vec<Result<T>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await
}
