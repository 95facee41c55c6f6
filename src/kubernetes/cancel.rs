// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Racing API calls against the reconcile cancellation token

use crate::error::{GitLabError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Await an API call unless `ctx` is cancelled first.
///
/// A cancelled call is dropped; whatever the server already committed stays.
pub async fn with_cancellation<T, F>(ctx: &CancellationToken, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, kube::Error>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(GitLabError::Cancelled),
        res = call => res.map_err(GitLabError::from),
    }
}
