//! Pipeline combinators
//!
//! Two ordering regimes are used across Brokkr:
//! - [`map_series`]: run steps one after another, stop on the first failure,
//!   keep outputs in input order. Used for script compilation and the
//!   database lifecycle.
//! - [`each_independent`]: run every item concurrently, never short-circuit,
//!   hand back every outcome. Used where items share no data (one database
//!   per item).

use futures::future::join_all;
use std::future::Future;

/// Apply `f` to each item in order, awaiting each before starting the next.
///
/// Returns the outputs in input order, or the first error. Items after a
/// failing one are never started.
pub async fn map_series<I, T, E, F, Fut>(items: I, mut f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let iter = items.into_iter();
    let mut outputs = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        outputs.push(f(item).await?);
    }
    Ok(outputs)
}

/// Run `f` for every item concurrently and collect every outcome.
///
/// A failing item does not prevent the others from running. Outcomes are
/// returned in input order.
pub async fn each_independent<I, T, E, F, Fut>(items: I, f: F) -> Vec<Result<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    join_all(items.into_iter().map(f)).await
}
