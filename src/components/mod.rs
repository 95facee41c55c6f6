// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-resource reconcilers for the claims a GitLab instance depends on.

pub mod aggregator;
pub mod base;
pub mod bucket;
pub mod finder;
pub mod kubernetes;
pub mod postgres;
pub mod redis;
pub mod secret_data;
pub mod values;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{AggregatedStatus, ComponentReconciler};
pub use finder::{ClassFinder, ResourceClassFinder};
pub use values::HelmValues;

use crate::error::Result;
use crate::types::status::ResourceClaimStatus;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One managed dependency of a GitLab instance
#[async_trait]
pub trait ResourceReconciler: Send + Sync {
    /// Advance the claim one step: find its class, create it if absent, record its status
    async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()>;

    fn claim_kind(&self) -> &str;

    /// Status read during the last `reconcile`, if the claim exists
    fn status(&self) -> Option<&ResourceClaimStatus>;

    /// Contribute chart values for this dependency; requires a ready claim
    async fn helm_values(
        &self,
        ctx: &CancellationToken,
        values: &mut HelmValues,
        secret_prefix: &str,
    ) -> Result<()>;
}
