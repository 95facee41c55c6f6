// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::ObjectRef;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider-bound template describing how claims of one kind are fulfilled
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "core.crossplane.io",
    version = "v1alpha1",
    kind = "ResourceClass",
    plural = "resourceclasses"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClassSpec {
    pub provider_ref: ObjectRef,
    /// `<Kind>.<group>/<version>` of the claims this class fulfils
    pub resource_kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl ResourceClass {
    /// Whether this class is bound to `provider` and fulfils `resource_kind`
    pub fn matches(&self, provider: &ObjectRef, resource_kind: &str) -> bool {
        let provider_ref = &self.spec.provider_ref;
        let same_namespace = match (&provider.namespace, &provider_ref.namespace) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };

        provider_ref.name == provider.name && same_namespace && self.spec.resource_kind == resource_kind
    }
}
