// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fans a reconcile tick out over every component and folds the results.

use crate::components::bucket::BucketReconciler;
use crate::components::finder::{ClassFinder, ResourceClassFinder};
use crate::components::kubernetes::KubernetesReconciler;
use crate::components::postgres::PostgresReconciler;
use crate::components::redis::RedisReconciler;
use crate::components::{HelmValues, ResourceReconciler};
use crate::error::{ComponentErrors, Result};
use crate::types::gitlab::{ComponentStatus, GitLab, Verdict};
use crate::types::status::ClaimState;
use kube::{Client, ResourceExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Verdict plus per-component status, in reconcile order
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedStatus {
    pub verdict: Verdict,
    pub components: Vec<ComponentStatus>,
}

struct Failure {
    kind: String,
    not_provisioned: bool,
}

pub struct ComponentReconciler {
    gitlab: Arc<GitLab>,
    children: Vec<Box<dyn ResourceReconciler>>,
    failures: Vec<Failure>,
}

impl ComponentReconciler {
    pub fn new(gitlab: Arc<GitLab>, children: Vec<Box<dyn ResourceReconciler>>) -> Self {
        Self {
            gitlab,
            children,
            failures: Vec::new(),
        }
    }

    /// Cluster, Redis and PostgreSQL, then one reconciler per declared bucket
    pub fn for_gitlab(gitlab: Arc<GitLab>, client: Client) -> Self {
        let finder: Arc<dyn ResourceClassFinder> = Arc::new(ClassFinder::new(client.clone()));
        Self::with_finder(gitlab, client, finder)
    }

    pub fn with_finder(gitlab: Arc<GitLab>, client: Client, finder: Arc<dyn ResourceClassFinder>) -> Self {
        let mut children: Vec<Box<dyn ResourceReconciler>> = vec![
            Box::new(KubernetesReconciler::new(gitlab.clone(), client.clone(), finder.clone())),
            Box::new(RedisReconciler::new(gitlab.clone(), client.clone(), finder.clone())),
            Box::new(PostgresReconciler::new(gitlab.clone(), client.clone(), finder.clone())),
        ];
        for bucket in &gitlab.spec.buckets {
            children.push(Box::new(BucketReconciler::new(
                gitlab.clone(),
                client.clone(),
                finder.clone(),
                bucket.clone(),
            )));
        }
        Self::new(gitlab, children)
    }

    /// Reconcile every child in order; one failure does not stop the others
    #[instrument(skip(self, ctx), fields(gitlab = %self.gitlab.name_any()))]
    pub async fn reconcile(&mut self, ctx: &CancellationToken) -> Result<()> {
        self.failures.clear();
        let mut errors = ComponentErrors::default();

        for child in self.children.iter_mut() {
            let kind = child.claim_kind().to_string();
            match child.reconcile(ctx).await {
                Ok(()) => debug!("Reconciled {}", kind),
                Err(e) => {
                    warn!("Failed to reconcile {}: {}", kind, e);
                    self.failures.push(Failure {
                        kind: kind.clone(),
                        not_provisioned: e.is_not_provisioned(),
                    });
                    errors.push(kind, e);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    pub fn verdict(&self) -> Verdict {
        let statuses: Vec<_> = self.children.iter().map(|c| c.status()).collect();

        let errored = self.failures.iter().any(|f| !f.not_provisioned);
        let reports_failure = statuses.iter().flatten().any(|s| s.is_failed());
        if errored || reports_failure {
            return Verdict::Failed;
        }

        if statuses.iter().all(Option::is_none) {
            return Verdict::Pending;
        }

        let all_ready = statuses.iter().all(|s| matches!(s, Some(s) if s.is_ready()));
        if all_ready && self.failures.is_empty() {
            Verdict::Ready
        } else {
            Verdict::Creating
        }
    }

    pub fn is_ready(&self) -> bool {
        self.verdict() == Verdict::Ready
    }

    pub fn status(&self) -> AggregatedStatus {
        let components = self
            .children
            .iter()
            .map(|child| {
                let status = child.status().cloned();
                ComponentStatus {
                    kind: child.claim_kind().to_string(),
                    state: status.as_ref().map_or(ClaimState::Absent, |s| s.state()),
                    status,
                }
            })
            .collect();

        AggregatedStatus {
            verdict: self.verdict(),
            components,
        }
    }

    /// Kinds of the children that failed during the last tick
    pub fn failed_kinds(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.kind.as_str()).collect()
    }

    /// Merged chart values of the declaration and every component
    pub async fn helm_values(&self, ctx: &CancellationToken, secret_prefix: &str) -> Result<HelmValues> {
        let mut values = HelmValues::default();
        let spec = &self.gitlab.spec;

        if !spec.domain.is_empty() {
            values.set("global.hosts.domain", spec.domain.clone());
        }
        if let Some(host_suffix) = &spec.host_suffix {
            values.set("global.hosts.hostSuffix", host_suffix.clone());
        }
        if let Some(email) = &spec.email {
            values.set("certmanager-issuer.email", email.clone());
        }

        for child in &self.children {
            child.helm_values(ctx, &mut values, secret_prefix).await?;
        }
        Ok(values)
    }
}
