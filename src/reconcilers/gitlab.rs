// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GitLab reconciler - watches GitLab resources and drives their components.

use crate::components::{AggregatedStatus, ComponentReconciler, HelmValues};
use crate::config::Config;
use crate::constants::{conditions, helm, OPERATOR_NAME};
use crate::error::{GitLabError, Result};
use crate::kubernetes::{with_cancellation, CrdType};
use crate::types::claims::{Bucket, KubernetesCluster, PostgreSQLInstance, RedisCluster};
use crate::types::gitlab::{GitLab, GitLabStatus, Verdict};
use crate::types::resource_class::ResourceClass;
use crate::types::status::Condition;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::{ObjectMeta, Patch, PatchParams},
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub struct GitLabReconciler {
    client: Client,
    config: Config,
    shutdown: CancellationToken,
}

impl GitLabReconciler {
    pub fn new(client: Client, config: Config, shutdown: CancellationToken) -> Self {
        Self {
            client,
            config,
            shutdown,
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>,
    {
        match &self.config.watch_namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let gitlabs: Api<GitLab> = self.api();
        let clusters: Api<KubernetesCluster> = self.api();
        let redis: Api<RedisCluster> = self.api();
        let postgres: Api<PostgreSQLInstance> = self.api();
        let buckets: Api<Bucket> = self.api();
        let shutdown = self.shutdown.clone();
        let context = Arc::new(self);

        Controller::new(gitlabs, WatcherConfig::default())
            .owns(clusters, WatcherConfig::default())
            .owns(redis, WatcherConfig::default())
            .owns(postgres, WatcherConfig::default())
            .owns(buckets, WatcherConfig::default())
            .graceful_shutdown_on(shutdown.cancelled_owned())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled gitlab: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// CRDs that must be served before the controller starts: class lookup, the watched kind and every owned claim kind
pub fn required_crds() -> Vec<CrdType> {
    vec![
        CrdType::of::<ResourceClass>(),
        CrdType::of::<GitLab>(),
        CrdType::of::<KubernetesCluster>(),
        CrdType::of::<RedisCluster>(),
        CrdType::of::<PostgreSQLInstance>(),
        CrdType::of::<Bucket>(),
    ]
}

async fn reconcile(gitlab: Arc<GitLab>, ctx: Arc<GitLabReconciler>) -> Result<Action> {
    let name = gitlab.name_any();
    debug!("Reconciling gitlab: {}/{}", gitlab.namespace_or_default(), name);

    let token = ctx.shutdown.child_token();
    let mut components = ComponentReconciler::for_gitlab(gitlab.clone(), ctx.client.clone());

    let mut outcome = components.reconcile(&token).await;
    let aggregated = components.status();
    if outcome.is_err() {
        warn!("GitLab {} has failing components: {:?}", name, components.failed_kinds());
    }

    let mut values_config_map = None;
    if outcome.is_ok() && components.is_ready() {
        match components
            .helm_values(&token, &ctx.config.helm_secret_prefix)
            .await
        {
            Ok(values) => match publish_helm_values(&ctx.client, &gitlab, &values, &token).await {
                Ok(config_map) => values_config_map = Some(config_map),
                Err(e) => outcome = Err(e),
            },
            Err(e) => outcome = Err(e),
        }
    }

    let status = build_status(&gitlab, &aggregated, outcome.as_ref().err(), values_config_map);
    patch_status(&ctx.client, &gitlab, &status, &token).await?;

    outcome?;

    if components.is_ready() && !gitlab.is_ready() {
        info!("GitLab {} became ready", name);
    } else {
        debug!("GitLab {} is {:?}", name, aggregated.verdict);
    }
    Ok(match aggregated.verdict {
        Verdict::Ready => Action::requeue(ctx.config.ready_requeue_interval),
        _ => Action::requeue(ctx.config.requeue_interval),
    })
}

fn error_policy(_gitlab: Arc<GitLab>, error: &GitLabError, _ctx: Arc<GitLabReconciler>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}

/// Keep the transition time of a condition whose status did not change
fn carry_transition_time(previous: &[Condition], mut condition: Condition) -> Condition {
    if let Some(prev) = previous
        .iter()
        .find(|c| c.condition_type == condition.condition_type && c.status == condition.status)
    {
        condition.last_transition_time = prev.last_transition_time.clone();
    }
    condition
}

/// Status written back to the GitLab resource for this tick
pub fn build_status(
    gitlab: &GitLab,
    aggregated: &AggregatedStatus,
    error: Option<&GitLabError>,
    values_config_map: Option<String>,
) -> GitLabStatus {
    let previous = gitlab
        .status
        .as_ref()
        .map(|s| s.conditions.as_slice())
        .unwrap_or_default();

    let mut synced = match error {
        Some(e) => Condition::new(conditions::SYNCED, false).with_message(e.to_string()),
        None => Condition::new(conditions::SYNCED, true),
    };
    synced.reason = Some(if error.is_some() { "ReconcileError" } else { "ReconcileSuccess" }.to_string());

    let mut ready = Condition::new(conditions::READY, aggregated.verdict == Verdict::Ready);
    ready.reason = Some(format!("{:?}", aggregated.verdict));

    GitLabStatus {
        phase: Some(aggregated.verdict),
        components: aggregated.components.clone(),
        conditions: vec![
            carry_transition_time(previous, synced),
            carry_transition_time(previous, ready),
        ],
        observed_generation: gitlab.metadata.generation,
        values_config_map,
    }
}

/// Merge patch replacing the whole status; unset optional fields are sent as `null`
fn status_patch(status: &GitLabStatus) -> serde_json::Value {
    serde_json::json!({ "status": status })
}

#[instrument(skip(client, gitlab, status, ctx), fields(gitlab = %gitlab.name_any()))]
async fn patch_status(
    client: &Client,
    gitlab: &GitLab,
    status: &GitLabStatus,
    ctx: &CancellationToken,
) -> Result<()> {
    let gitlabs: Api<GitLab> = Api::namespaced(client.clone(), &gitlab.namespace_or_default());
    let patch = status_patch(status);

    with_cancellation(
        ctx,
        gitlabs.patch_status(&gitlab.name_any(), &PatchParams::default(), &Patch::Merge(&patch)),
    )
    .await?;
    Ok(())
}

/// Publish the rendered chart values for the installer, returning the ConfigMap name
#[instrument(skip(client, gitlab, values, ctx), fields(gitlab = %gitlab.name_any()))]
pub async fn publish_helm_values(
    client: &Client,
    gitlab: &GitLab,
    values: &HelmValues,
    ctx: &CancellationToken,
) -> Result<String> {
    let name = format!("{}-{}", gitlab.name_any(), helm::VALUES_CONFIG_MAP_SUFFIX);
    let namespace = gitlab.namespace_or_default();

    let config_map = ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace.clone()),
            owner_references: gitlab.controller_owner_ref(&()).map(|o| vec![o]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            helm::VALUES_KEY.to_string(),
            values.to_yaml()?,
        )])),
        ..Default::default()
    };

    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), &namespace);
    let pp = PatchParams::apply(OPERATOR_NAME).force();
    with_cancellation(ctx, config_maps.patch(&name, &pp, &Patch::Apply(&config_map))).await?;

    info!("Published helm values to {}/{}", namespace, name);
    Ok(name)
}
