// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixtures shared by the component reconciler tests.

use crate::components::finder::ResourceClassFinder;
use crate::error::{GitLabError, Result};
use crate::types::gitlab::{BucketConfig, GitLab, GitLabSpec};
use crate::types::status::{LocalObjectRef, ResourceClaimStatus};
use crate::types::ObjectRef;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const TEST_NAME: &str = "test-gitlab";
pub const TEST_NAMESPACE: &str = "gitlab";

pub fn make_spec() -> GitLabSpec {
    GitLabSpec {
        provider_ref: ObjectRef::new("aws-provider", "crossplane-system"),
        domain: "example.com".to_string(),
        ..Default::default()
    }
}

pub fn make_gitlab(spec: GitLabSpec) -> Arc<GitLab> {
    Arc::new(GitLab {
        metadata: ObjectMeta {
            name: Some(TEST_NAME.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            uid: Some("test-uid".to_string()),
            generation: Some(1),
            ..Default::default()
        },
        spec,
        status: None,
    })
}

pub fn make_gitlab_with_buckets(names: &[&str]) -> Arc<GitLab> {
    let mut spec = make_spec();
    spec.buckets = names
        .iter()
        .map(|name| BucketConfig {
            name: name.to_string(),
            provider: Default::default(),
        })
        .collect();
    make_gitlab(spec)
}

pub fn creating_status() -> ResourceClaimStatus {
    let mut status = ResourceClaimStatus::default();
    status.set_creating();
    status
}

pub fn ready_status(secret_name: Option<&str>) -> ResourceClaimStatus {
    let mut status = ResourceClaimStatus::default();
    status.set_ready();
    status.connection_secret_ref = secret_name.map(|name| LocalObjectRef {
        name: name.to_string(),
    });
    status
}

pub fn make_connection_secret(name: &str, entries: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            resource_version: Some("7".to_string()),
            ..Default::default()
        },
        data: Some(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}

/// Finder returning a fixed class, or failing, and recording each lookup
pub struct MockFinder {
    class_ref: Option<ObjectRef>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockFinder {
    pub fn returning(name: &str) -> Self {
        Self {
            class_ref: Some(ObjectRef::new(name, "crossplane-system")),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            class_ref: None,
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn lookups(&self) -> Arc<Mutex<Vec<String>>> {
        self.lookups.clone()
    }
}

#[async_trait]
impl ResourceClassFinder for MockFinder {
    async fn find(
        &self,
        _ctx: &CancellationToken,
        provider: &ObjectRef,
        resource_kind: &str,
    ) -> Result<ObjectRef> {
        self.lookups.lock().unwrap().push(resource_kind.to_string());
        self.class_ref
            .clone()
            .ok_or_else(|| GitLabError::ResourceClassNotFound {
                kind: resource_kind.to_string(),
                provider: provider.to_string(),
            })
    }
}
