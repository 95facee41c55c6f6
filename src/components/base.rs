// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! State and helpers shared by every per-resource reconciler.

use crate::components::finder::ResourceClassFinder;
use crate::components::secret_data::secret_value;
use crate::constants::secret_keys;
use crate::error::{GitLabError, Result};
use crate::kubernetes::with_cancellation;
use crate::types::claims::Claim;
use crate::types::gitlab::GitLab;
use crate::types::status::ResourceClaimStatus;
use crate::types::{ObjectKey, ObjectRef};
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client, Resource, ResourceExt,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

pub struct BaseResourceReconciler {
    pub(crate) gitlab: Arc<GitLab>,
    pub(crate) client: Client,
    /// Status of the claim as last read in this tick
    pub(crate) status: Option<ResourceClaimStatus>,
    claim_kind: String,
    name_suffix: String,
}

impl BaseResourceReconciler {
    pub fn new(
        gitlab: Arc<GitLab>,
        client: Client,
        claim_kind: impl Into<String>,
        name_suffix: impl Into<String>,
    ) -> Self {
        Self {
            gitlab,
            client,
            status: None,
            claim_kind: claim_kind.into(),
            name_suffix: name_suffix.into(),
        }
    }

    pub fn claim_kind(&self) -> &str {
        &self.claim_kind
    }

    pub fn status(&self) -> Option<&ResourceClaimStatus> {
        self.status.as_ref()
    }

    pub fn provider_ref(&self) -> &ObjectRef {
        self.gitlab.provider_ref()
    }

    fn claim_name(&self) -> String {
        format!("{}-{}", self.gitlab.name_any(), self.name_suffix)
    }

    /// Metadata for the claim: derived name, declaration namespace, controller owner reference
    pub fn new_object_meta(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.claim_name()),
            namespace: Some(self.gitlab.namespace_or_default()),
            owner_references: self.gitlab.controller_owner_ref(&()).map(|o| vec![o]),
            ..Default::default()
        }
    }

    pub fn object_key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.gitlab.namespace_or_default(),
            name: self.claim_name(),
        }
    }

    /// Name of the secret the claim publishes its connection details in
    pub fn claim_connection_secret_name(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.connection_secret_name())
            .map(str::to_string)
            .unwrap_or_else(|| self.claim_name())
    }

    /// Look up the class for claims of type `K` with the declaration's provider
    pub async fn find_class<K: Claim>(
        &self,
        ctx: &CancellationToken,
        finder: &dyn ResourceClassFinder,
    ) -> Result<ObjectRef> {
        finder
            .find(ctx, self.provider_ref(), &K::kind_api_version())
            .await
            .map_err(|source| GitLabError::FailedToFindResourceClass {
                kind: self.claim_kind.clone(),
                provider: self.provider_ref().to_string(),
                source: Box::new(source),
            })
    }

    /// Read the claim and record its status, creating it when absent
    #[instrument(skip(self, ctx, claim), fields(kind = %self.claim_kind, key = %self.object_key()))]
    pub async fn ensure_claim<K: Claim>(&mut self, ctx: &CancellationToken, claim: K) -> Result<()> {
        let key = self.object_key();
        let claims: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        match with_cancellation(ctx, claims.get(&key.name)).await {
            Ok(existing) => {
                let status = existing.claim_status().cloned().unwrap_or_default();
                debug!("Claim {} is {:?}", key, status.state());
                self.status = Some(status);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("Creating {} claim {}", self.claim_kind, key);
                with_cancellation(ctx, claims.create(&PostParams::default(), &claim))
                    .await
                    .map_err(|source| GitLabError::FailedToCreate {
                        kind: self.claim_kind.clone(),
                        key: key.to_string(),
                        source: Box::new(source),
                    })?;
                Ok(())
            }
            Err(source) => Err(GitLabError::FailedToRetrieveInstance {
                kind: self.claim_kind.clone(),
                key: key.to_string(),
                source: Box::new(source),
            }),
        }
    }

    /// Key of the claim's connection secret
    pub fn connection_secret_key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.gitlab.namespace_or_default(),
            name: self.claim_connection_secret_name(),
        }
    }

    pub async fn connection_secret(&self, ctx: &CancellationToken) -> Result<Secret> {
        let key = self.connection_secret_key();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &key.namespace);

        with_cancellation(ctx, secrets.get(&key.name))
            .await
            .map_err(|source| GitLabError::FailedToRetrieveSecret {
                kind: self.claim_kind.clone(),
                key: key.to_string(),
                source: Box::new(source),
            })
    }

    /// Connection secret of a claim that reports ready
    pub async fn ready_connection_secret(&self, ctx: &CancellationToken) -> Result<Secret> {
        if !self.status.as_ref().is_some_and(|s| s.is_ready()) {
            return Err(GitLabError::ComponentNotReady(self.claim_kind.clone()));
        }
        self.connection_secret(ctx).await
    }

    /// Endpoint published in a connection secret, empty when absent
    pub fn endpoint(secret: &Secret) -> String {
        secret
            .data
            .as_ref()
            .map(|data| secret_value(data, secret_keys::ENDPOINT))
            .unwrap_or_default()
    }
}
