// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource claims fulfilled by the resource-abstraction layer.

use crate::types::status::ResourceClaimStatus;
use crate::types::ObjectRef;
use k8s_openapi::NamespaceResourceScope;
use kube::{CustomResource, Resource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A namespaced claim object carrying a [`ResourceClaimStatus`]
pub trait Claim:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    fn claim_status(&self) -> Option<&ResourceClaimStatus>;

    /// `<Kind>.<group>/<version>`, the string resource classes are matched on
    fn kind_api_version() -> String {
        format!(
            "{}.{}/{}",
            Self::kind(&()),
            Self::group(&()),
            Self::version(&())
        )
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "compute.crossplane.io",
    version = "v1alpha1",
    kind = "KubernetesCluster",
    plural = "kubernetesclusters"
)]
#[kube(namespaced)]
#[kube(status = "ResourceClaimStatus")]
#[serde(rename_all = "camelCase")]
pub struct KubernetesClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<ObjectRef>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "cache.crossplane.io",
    version = "v1alpha1",
    kind = "RedisCluster",
    plural = "redisclusters"
)]
#[kube(namespaced)]
#[kube(status = "ResourceClaimStatus")]
#[serde(rename_all = "camelCase")]
pub struct RedisClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<ObjectRef>,
    pub engine_version: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "storage.crossplane.io",
    version = "v1alpha1",
    kind = "PostgreSQLInstance",
    plural = "postgresqlinstances"
)]
#[kube(namespaced)]
#[kube(status = "ResourceClaimStatus")]
#[serde(rename_all = "camelCase")]
pub struct PostgreSQLInstanceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<ObjectRef>,
    pub engine_version: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "storage.crossplane.io",
    version = "v1alpha1",
    kind = "Bucket",
    plural = "buckets"
)]
#[kube(namespaced)]
#[kube(status = "ResourceClaimStatus")]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<ObjectRef>,
    /// Name of the bucket in the cloud provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

macro_rules! impl_claim {
    ($($claim:ty),+) => {
        $(
            impl Claim for $claim {
                fn claim_status(&self) -> Option<&ResourceClaimStatus> {
                    self.status.as_ref()
                }
            }
        )+
    };
}

impl_claim!(KubernetesCluster, RedisCluster, PostgreSQLInstance, Bucket);
