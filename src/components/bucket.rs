// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object-storage buckets and their synthesized connection data.

use crate::components::base::BaseResourceReconciler;
use crate::components::finder::ResourceClassFinder;
use crate::components::secret_data::SecretUpdater;
use crate::components::{HelmValues, ResourceReconciler};
use crate::constants::{claim_kind, secret_keys};
use crate::error::{GitLabError, Result};
use crate::kubernetes::with_cancellation;
use crate::types::claims::{Bucket, BucketSpec};
use crate::types::gitlab::{BucketConfig, GitLab};
use crate::types::status::ResourceClaimStatus;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::PostParams, Api, Client, ResourceExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Chart bucket whose credentials go to the backup task runner as an `s3cmd` config
const BACKUPS_BUCKET: &str = "backups";

pub struct BucketReconciler {
    base: BaseResourceReconciler,
    finder: Arc<dyn ResourceClassFinder>,
    bucket: BucketConfig,
    updater: SecretUpdater,
}

impl BucketReconciler {
    pub fn new(
        gitlab: Arc<GitLab>,
        client: Client,
        finder: Arc<dyn ResourceClassFinder>,
        bucket: BucketConfig,
    ) -> Self {
        let updater = SecretUpdater::for_provider(bucket.provider);
        Self::with_updater(gitlab, client, finder, bucket, updater)
    }

    pub fn with_updater(
        gitlab: Arc<GitLab>,
        client: Client,
        finder: Arc<dyn ResourceClassFinder>,
        bucket: BucketConfig,
        updater: SecretUpdater,
    ) -> Self {
        let kind = format!("{}{}", claim_kind::BUCKET_PREFIX, bucket.name);
        Self {
            base: BaseResourceReconciler::new(gitlab, client, kind.clone(), kind),
            finder,
            bucket,
            updater,
        }
    }

    /// Cloud-side bucket name, unique per declaration
    fn bucket_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.base.gitlab.namespace_or_default(),
            self.base.gitlab.name_any(),
            self.bucket.name
        )
    }

    /// Rewrite the derived keys of the claim's connection secret when they changed
    async fn update_connection_secret(&self, ctx: &CancellationToken) -> Result<()> {
        let mut secret = self.base.connection_secret(ctx).await?;
        let current = secret.data.clone();

        self.updater.update(&mut secret)?;

        if secret.data == current {
            debug!("Connection secret {} is up to date", secret.name_any());
            return Ok(());
        }

        let key = self.base.connection_secret_key();
        let secrets: Api<Secret> = Api::namespaced(self.base.client.clone(), &key.namespace);
        with_cancellation(ctx, secrets.replace(&key.name, &PostParams::default(), &secret))
            .await
            .map_err(|source| GitLabError::FailedToUpdateSecret {
                kind: self.claim_kind().to_string(),
                key: key.to_string(),
                source: Box::new(source),
            })?;

        info!("Updated connection data in secret {}", key);
        Ok(())
    }
}

#[async_trait]
impl ResourceReconciler for BucketReconciler {
    #[instrument(skip(self, ctx), fields(key = %self.base.object_key()))]
    async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()> {
        self.base.status = None;

        let class_ref = self
            .base
            .find_class::<Bucket>(ctx, self.finder.as_ref())
            .await?;

        let bucket = Bucket {
            metadata: self.base.new_object_meta(),
            spec: BucketSpec {
                class_ref: Some(class_ref),
                name: Some(self.bucket_name()),
            },
            status: None,
        };
        self.base.ensure_claim(ctx, bucket).await?;

        let published = self
            .base
            .status()
            .and_then(|s| s.connection_secret_name())
            .is_some();
        if !published {
            debug!("Bucket claim has not published a connection secret yet");
            return Ok(());
        }

        self.update_connection_secret(ctx).await
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
        secret_prefix: &str,
    ) -> Result<()> {
        // Only checks the secret is there; the chart reads it by name
        self.base.ready_connection_secret(ctx).await?;

        let name = &self.bucket.name;
        let secret_name = format!("{}{}", secret_prefix, self.base.claim_connection_secret_name());

        values.set(&format!("global.appConfig.{}.bucket", name), self.bucket_name());
        if name == BACKUPS_BUCKET {
            values.set("gitlab.task-runner.backups.objectStorage.config.secret", secret_name);
            values.set("gitlab.task-runner.backups.objectStorage.config.key", secret_keys::CONFIG);
        } else {
            values.set(&format!("global.appConfig.{}.connection.secret", name), secret_name);
            values.set(&format!("global.appConfig.{}.connection.key", name), secret_keys::CONNECTION);
        }
        Ok(())
    }
}
