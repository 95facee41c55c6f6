// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::status::{ClaimState, Condition, ResourceClaimStatus};
use crate::types::ObjectRef;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// A managed GitLab instance and the cloud resources it needs
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "controller.gitlab.com",
    version = "v1alpha1",
    kind = "GitLab",
    plural = "gitlabs"
)]
#[kube(namespaced)]
#[kube(status = "GitLabStatus")]
#[kube(printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#)]
#[serde(rename_all = "camelCase")]
pub struct GitLabSpec {
    /// Cloud provider the claims are provisioned with
    pub provider_ref: ObjectRef,
    /// Existing Kubernetes cluster to install into instead of claiming a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_ref: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<BucketConfig>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    /// Logical bucket name as the GitLab chart knows it, e.g. `lfs`
    pub name: String,
    #[serde(default)]
    pub provider: BucketProvider,
}

/// Format of the connection data synthesized for a bucket
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BucketProvider {
    /// AWS S3 and S3-compatible stores
    #[default]
    Aws,
}

/// Overall state of a GitLab's components
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pending,
    Creating,
    Ready,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    pub kind: String,
    pub state: ClaimState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResourceClaimStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitLabStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// ConfigMap holding the rendered helm values, set while ready.
    /// Serialized as `null` when unset so a merge patch clears it.
    #[serde(default)]
    pub values_config_map: Option<String>,
}

impl GitLab {
    pub fn provider_ref(&self) -> &ObjectRef {
        &self.spec.provider_ref
    }

    /// Namespace of the declaration; claims are created next to it
    pub fn namespace_or_default(&self) -> String {
        self.namespace().unwrap_or_else(|| "default".to_string())
    }

    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.phase == Some(Verdict::Ready))
    }
}
