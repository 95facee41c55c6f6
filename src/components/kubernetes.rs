// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes cluster the GitLab instance is installed into.

use crate::components::base::BaseResourceReconciler;
use crate::components::finder::ResourceClassFinder;
use crate::components::{HelmValues, ResourceReconciler};
use crate::constants::claim_kind;
use crate::error::{GitLabError, Result};
use crate::kubernetes::with_cancellation;
use crate::types::claims::{KubernetesCluster, KubernetesClusterSpec};
use crate::types::gitlab::GitLab;
use crate::types::status::ResourceClaimStatus;
use crate::types::{ObjectKey, ObjectRef};
use async_trait::async_trait;
use kube::{Api, Client, Resource};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

pub struct KubernetesReconciler {
    base: BaseResourceReconciler,
    finder: Arc<dyn ResourceClassFinder>,
}

impl KubernetesReconciler {
    pub fn new(gitlab: Arc<GitLab>, client: Client, finder: Arc<dyn ResourceClassFinder>) -> Self {
        let name_suffix = KubernetesCluster::kind(&()).into_owned();
        Self {
            base: BaseResourceReconciler::new(gitlab, client, claim_kind::KUBERNETES, name_suffix),
            finder,
        }
    }

    /// Copy the status of the cluster the declaration binds to explicitly
    async fn reconcile_cluster_ref(&mut self, ctx: &CancellationToken, cluster_ref: &ObjectRef) -> Result<()> {
        let key = ObjectKey {
            namespace: cluster_ref
                .namespace
                .clone()
                .unwrap_or_else(|| self.base.gitlab.namespace_or_default()),
            name: cluster_ref.name.clone(),
        };
        let clusters: Api<KubernetesCluster> = Api::namespaced(self.base.client.clone(), &key.namespace);

        let cluster = with_cancellation(ctx, clusters.get(&key.name))
            .await
            .map_err(|source| GitLabError::FailedToRetrieveInstance {
                kind: self.claim_kind().to_string(),
                key: key.to_string(),
                source: Box::new(source),
            })?;

        debug!("Using referenced cluster {}", key);
        self.base.status = Some(cluster.status.unwrap_or_default());
        Ok(())
    }
}

#[async_trait]
impl ResourceReconciler for KubernetesReconciler {
    #[instrument(skip(self, ctx), fields(key = %self.base.object_key()))]
    async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()> {
        self.base.status = None;

        if let Some(cluster_ref) = self.base.gitlab.spec.cluster_ref.clone() {
            return self.reconcile_cluster_ref(ctx, &cluster_ref).await;
        }

        let class_ref = self
            .base
            .find_class::<KubernetesCluster>(ctx, self.finder.as_ref())
            .await?;

        let cluster = KubernetesCluster {
            metadata: self.base.new_object_meta(),
            spec: KubernetesClusterSpec {
                class_ref: Some(class_ref),
            },
            status: None,
        };
        self.base.ensure_claim(ctx, cluster).await
    }

    fn claim_kind(&self) -> &str {
        self.base.claim_kind()
    }

    fn status(&self) -> Option<&ResourceClaimStatus> {
        self.base.status()
    }

    /// The installer targets the cluster itself; there are no chart values to add
    async fn helm_values(
        &self,
        _ctx: &CancellationToken,
        _values: &mut HelmValues,
        _secret_prefix: &str,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::*;
    use crate::test_utils::{collection_path, object_path, status_json, MockService};
    use crate::types::status::ClaimState;

    fn make_reconciler(gitlab: Arc<GitLab>, mock: &MockService, finder: MockFinder) -> KubernetesReconciler {
        KubernetesReconciler::new(gitlab, mock.client(), Arc::new(finder))
    }

    fn gitlab_with_cluster_ref() -> Arc<GitLab> {
        let mut spec = make_spec();
        spec.cluster_ref = Some(ObjectRef::new("test-cluster", "clusters"));
        make_gitlab(spec)
    }

    #[tokio::test]
    async fn test_successful_with_cluster_ref() {
        let mut cluster = KubernetesCluster::new("test-cluster", KubernetesClusterSpec::default());
        cluster.metadata.namespace = Some("clusters".to_string());
        cluster.status = Some(creating_status());
        let mock = MockService::new().on_get(
            &object_path::<KubernetesCluster>("clusters", "test-cluster"),
            200,
            &to_json(&cluster),
        );
        let finder = MockFinder::returning("k8s-class");
        let lookups = finder.lookups();
        let mut r = make_reconciler(gitlab_with_cluster_ref(), &mock, finder);

        r.reconcile(&CancellationToken::new()).await.unwrap();

        assert_eq!(r.status().map(|s| s.state()), Some(ClaimState::Creating));
        assert!(lookups.lock().unwrap().is_empty());
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_failure_with_cluster_ref() {
        let mock = MockService::new().on_get(
            &object_path::<KubernetesCluster>("clusters", "test-cluster"),
            500,
            &status_json(500, "InternalError", "test-error"),
        );
        let mut r = make_reconciler(gitlab_with_cluster_ref(), &mock, MockFinder::returning("k8s-class"));

        let err = r.reconcile(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            &err,
            GitLabError::FailedToRetrieveInstance { kind, key, .. }
                if kind == "kubernetes" && key == "clusters/test-cluster"
        ));
        assert!(r.status().is_none());
    }

    #[tokio::test]
    async fn test_fail_to_find_resource_class() {
        let mock = MockService::new();
        let mut r = make_reconciler(make_gitlab(make_spec()), &mock, MockFinder::failing());

        let err = r.reconcile(&CancellationToken::new()).await.unwrap_err();

        assert!(err
            .to_string()
            .starts_with("failed to find resource class for kubernetes provider crossplane-system/aws-provider"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fail_to_create() {
        let mock = MockService::new().on_post(
            &collection_path::<KubernetesCluster>(TEST_NAMESPACE),
            409,
            &status_json(409, "AlreadyExists", "test-error"),
        );
        let mut r = make_reconciler(make_gitlab(make_spec()), &mock, MockFinder::returning("k8s-class"));

        let err = r.reconcile(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            &err,
            GitLabError::FailedToCreate { kind, key, .. }
                if kind == "kubernetes" && key == "gitlab/test-gitlab-KubernetesCluster"
        ));
    }

    #[tokio::test]
    async fn test_fail_to_retrieve_object_other() {
        let mock = MockService::new().on_get(
            &object_path::<KubernetesCluster>(TEST_NAMESPACE, "test-gitlab-KubernetesCluster"),
            500,
            &status_json(500, "InternalError", "test-error"),
        );
        let mut r = make_reconciler(make_gitlab(make_spec()), &mock, MockFinder::returning("k8s-class"));

        let err = r.reconcile(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, GitLabError::FailedToRetrieveInstance { .. }));
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_create_successful() {
        let mut created = KubernetesCluster::new("test-gitlab-KubernetesCluster", KubernetesClusterSpec::default());
        created.metadata.namespace = Some(TEST_NAMESPACE.to_string());
        let mock = MockService::new().on_post(
            &collection_path::<KubernetesCluster>(TEST_NAMESPACE),
            201,
            &to_json(&created),
        );
        let mut r = make_reconciler(make_gitlab(make_spec()), &mock, MockFinder::returning("k8s-class"));

        r.reconcile(&CancellationToken::new()).await.unwrap();

        let posts = mock.requests_with_method("POST");
        assert_eq!(posts.len(), 1);
        let body = posts[0].json();
        assert_eq!(body["metadata"]["name"], "test-gitlab-KubernetesCluster");
        assert_eq!(body["metadata"]["namespace"], TEST_NAMESPACE);
        assert_eq!(body["metadata"]["ownerReferences"][0]["kind"], "GitLab");
        assert_eq!(body["spec"]["classRef"]["name"], "k8s-class");
        assert!(r.status().is_none());
    }

    #[tokio::test]
    async fn test_successful() {
        let mut existing = KubernetesCluster::new("test-gitlab-KubernetesCluster", KubernetesClusterSpec::default());
        existing.metadata.namespace = Some(TEST_NAMESPACE.to_string());
        existing.status = Some(ready_status(None));
        let mock = MockService::new().on_get(
            &object_path::<KubernetesCluster>(TEST_NAMESPACE, "test-gitlab-KubernetesCluster"),
            200,
            &to_json(&existing),
        );
        let mut r = make_reconciler(make_gitlab(make_spec()), &mock, MockFinder::returning("k8s-class"));

        r.reconcile(&CancellationToken::new()).await.unwrap();

        assert_eq!(r.status(), existing.status.as_ref());
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_claim_kind() {
        let r = make_reconciler(make_gitlab(make_spec()), &MockService::new(), MockFinder::failing());
        assert_eq!(r.claim_kind(), claim_kind::KUBERNETES);
    }

    #[tokio::test]
    async fn test_helm_values_is_empty() {
        let r = make_reconciler(make_gitlab(make_spec()), &MockService::new(), MockFinder::failing());
        let mut values = HelmValues::default();

        r.helm_values(&CancellationToken::new(), &mut values, "").await.unwrap();

        assert!(values.is_empty());
    }
}
