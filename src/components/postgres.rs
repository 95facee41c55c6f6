// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::components::base::BaseResourceReconciler;
use crate::components::finder::ResourceClassFinder;
use crate::components::secret_data::secret_value;
use crate::components::{HelmValues, ResourceReconciler};
use crate::constants::{claim_kind, engine, secret_keys};
use crate::error::Result;
use crate::types::claims::{PostgreSQLInstance, PostgreSQLInstanceSpec};
use crate::types::gitlab::GitLab;
use crate::types::status::ResourceClaimStatus;
use async_trait::async_trait;
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub struct PostgresReconciler {
    base: BaseResourceReconciler,
    finder: Arc<dyn ResourceClassFinder>,
}

impl PostgresReconciler {
    pub fn new(gitlab: Arc<GitLab>, client: Client, finder: Arc<dyn ResourceClassFinder>) -> Self {
        Self {
            base: BaseResourceReconciler::new(gitlab, client, claim_kind::POSTGRES, claim_kind::POSTGRES),
            finder,
        }
    }
}

#[async_trait]
impl ResourceReconciler for PostgresReconciler {
    #[instrument(skip(self, ctx), fields(key = %self.base.object_key()))]
    async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()> {
        self.base.status = None;

        let class_ref = self
            .base
            .find_class::<PostgreSQLInstance>(ctx, self.finder.as_ref())
            .await?;

        let postgres = PostgreSQLInstance {
            metadata: self.base.new_object_meta(),
            spec: PostgreSQLInstanceSpec {
                class_ref: Some(class_ref),
                engine_version: engine::POSTGRES_VERSION.to_string(),
            },
            status: None,
        };
        self.base.ensure_claim(ctx, postgres).await
    }

    fn claim_kind(&self) -> &str {
        self.base.claim_kind()
    }

    fn status(&self) -> Option<&ResourceClaimStatus> {
        self.base.status()
    }

    /// Points the chart at the external database; the password stays in the claim's secret
    async fn helm_values(
        &self,
        ctx: &CancellationToken,
        values: &mut HelmValues,
        secret_prefix: &str,
    ) -> Result<()> {
        let secret = self.base.ready_connection_secret(ctx).await?;
        let username = secret
            .data
            .as_ref()
            .map(|data| secret_value(data, secret_keys::USERNAME))
            .unwrap_or_default();

        values.set("postgresql.install", false);
        values.set("global.psql.host", BaseResourceReconciler::endpoint(&secret));
        values.set("global.psql.username", username);
        values.set(
            "global.psql.password.secret",
            format!("{}{}", secret_prefix, self.base.claim_connection_secret_name()),
        );
        values.set("global.psql.password.key", secret_keys::PASSWORD);
        Ok(())
    }
}
