// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource class discovery for a provider and claim kind.

use crate::error::{GitLabError, Result};
use crate::kubernetes::with_cancellation;
use crate::types::resource_class::ResourceClass;
use crate::types::ObjectRef;
use async_trait::async_trait;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[async_trait]
pub trait ResourceClassFinder: Send + Sync {
    /// Reference to a class bound to `provider` that fulfils `resource_kind`.
    ///
    /// When several classes match, the first in list order is returned.
    async fn find(
        &self,
        ctx: &CancellationToken,
        provider: &ObjectRef,
        resource_kind: &str,
    ) -> Result<ObjectRef>;
}

/// Finds classes by listing `ResourceClass` objects through the API server
pub struct ClassFinder {
    client: Client,
}

impl ClassFinder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceClassFinder for ClassFinder {
    #[instrument(skip(self, ctx), fields(provider = %provider))]
    async fn find(
        &self,
        ctx: &CancellationToken,
        provider: &ObjectRef,
        resource_kind: &str,
    ) -> Result<ObjectRef> {
        let classes: Api<ResourceClass> = match &provider.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let class_list = with_cancellation(ctx, classes.list(&ListParams::default())).await?;

        let found = class_list
            .items
            .iter()
            .find(|class| class.matches(provider, resource_kind))
            .map(|class| ObjectRef {
                name: class.name_any(),
                namespace: class.namespace(),
            });

        match found {
            Some(class_ref) => {
                debug!("Found resource class {} for {}", class_ref, resource_kind);
                Ok(class_ref)
            }
            None => Err(GitLabError::ResourceClassNotFound {
                kind: resource_kind.to_string(),
                provider: provider.to_string(),
            }),
        }
    }
}
