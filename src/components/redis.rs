// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::components::base::BaseResourceReconciler;
use crate::components::finder::ResourceClassFinder;
use crate::components::{HelmValues, ResourceReconciler};
use crate::constants::{claim_kind, engine};
use crate::error::Result;
use crate::types::claims::{RedisCluster, RedisClusterSpec};
use crate::types::gitlab::GitLab;
use crate::types::status::ResourceClaimStatus;
use async_trait::async_trait;
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub struct RedisReconciler {
    base: BaseResourceReconciler,
    finder: Arc<dyn ResourceClassFinder>,
}

impl RedisReconciler {
    pub fn new(gitlab: Arc<GitLab>, client: Client, finder: Arc<dyn ResourceClassFinder>) -> Self {
        Self {
            base: BaseResourceReconciler::new(gitlab, client, claim_kind::REDIS, claim_kind::REDIS),
            finder,
        }
    }
}

#[async_trait]
impl ResourceReconciler for RedisReconciler {
    #[instrument(skip(self, ctx), fields(key = %self.base.object_key()))]
    async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()> {
        self.base.status = None;

        let class_ref = self
            .base
            .find_class::<RedisCluster>(ctx, self.finder.as_ref())
            .await?;

        let redis = RedisCluster {
            metadata: self.base.new_object_meta(),
            spec: RedisClusterSpec {
                class_ref: Some(class_ref),
                engine_version: engine::REDIS_VERSION.to_string(),
            },
            status: None,
        };
        self.base.ensure_claim(ctx, redis).await
    }

    fn claim_kind(&self) -> &str {
        self.base.claim_kind()
    }

    fn status(&self) -> Option<&ResourceClaimStatus> {
        self.base.status()
    }

    async fn helm_values(
        &self,
        ctx: &CancellationToken,
        values: &mut HelmValues,
        _secret_prefix: &str,
    ) -> Result<()> {
        let secret = self.base.ready_connection_secret(ctx).await?;

        values.set("redis.enabled", false);
        values.set("global.redis.host", BaseResourceReconciler::endpoint(&secret));
        values.set("global.redis.password.enabled", false);
        Ok(())
    }
}
