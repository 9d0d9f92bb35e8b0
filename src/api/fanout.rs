//
//  asc-cli
//  api/fanout.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Bounded concurrent fan-out.
//!
//! Runs one task per input with at most `concurrency` in flight. Results come
//! back in input order. The first failure aborts every remaining task and is
//! returned as-is.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::AscError;

/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Maps `items` through `work` concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use asc_cli::api::{fan_out, AscClient, RequestDescriptor, DEFAULT_CONCURRENCY};
///
/// # async fn demo(client: AscClient) -> Result<(), asc_cli::AscError> {
/// let ids = vec!["loc-1".to_string(), "loc-2".to_string()];
/// let sets = fan_out(ids, DEFAULT_CONCURRENCY, |id| {
///     let client = client.clone();
///     async move {
///         let path = format!("/v1/appStoreVersionLocalizations/{id}/appScreenshotSets");
///         client.send(&RequestDescriptor::get(path)).await
///     }
/// })
/// .await?;
/// # let _ = sets;
/// # Ok(())
/// # }
/// ```
pub async fn fan_out<I, T, F, Fut>(items: Vec<I>, concurrency: usize, work: F) -> Result<Vec<T>, AscError>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, AscError>> + Send + 'static,
{
    let total = items.len();
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let task = work(item);
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| AscError::Internal(format!("worker pool closed: {e}")))?;
            task.await.map(|value| (index, value))
        });
    }

    let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok((index, value))) => results[index] = Some(value),
            Ok(Err(err)) => {
                tasks.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                tasks.abort_all();
                return Err(AscError::Internal(format!("worker task failed: {join_err}")));
            }
        }
    }

    results
        .into_iter()
        .map(|slot| slot.ok_or_else(|| AscError::Internal("worker produced no result".to_string())))
        .collect()
}
