// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Group, version and kind of a custom resource the operator depends on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrdType {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl CrdType {
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        CrdType {
            group: K::group(&()).to_string(),
            version: K::version(&()).to_string(),
            kind: K::kind(&()).to_string(),
        }
    }
}

/// Wait for every CRD in `crds` to be served by the API server, in order
pub async fn wait_for_crds(client: &Client, crds: &[CrdType]) -> Result<()> {
    for crd in crds {
        wait_for_crd_type(client, crd).await?;
    }
    Ok(())
}

/// Poll discovery for `crd` with exponential backoff starting at POLL_INTERVAL_SECS seconds.
async fn wait_for_crd_type(client: &Client, crd: &CrdType) -> Result<()> {
    let CrdType { group, version, kind } = crd;
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_crd_exists(client, group, version, kind).await {
            Ok(true) => {
                info!("{} CRD ({}/{}) is available", kind, group, version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}/{}) not yet available, waiting {} seconds...",
                    kind, group, version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    kind, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        interval = next_interval(interval);
    }
}

fn next_interval(interval: u64) -> u64 {
    (interval * 2).min(POLL_MAX_INTERVAL_SECS)
}

/// Check if a CRD exists by attempting to discover it.
async fn check_crd_exists(client: &Client, group: &str, version: &str, kind: &str) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[group])
        .run()
        .await?;

    for api_group in discovery.groups() {
        if api_group.name() == group {
            for (ar, _) in api_group.recommended_resources() {
                if ar.kind == kind && ar.version == version {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::gitlab::GitLab;

    #[test]
    fn test_crd_type_of() {
        assert_eq!(
            CrdType::of::<GitLab>(),
            CrdType {
                group: "controller.gitlab.com".to_string(),
                version: "v1alpha1".to_string(),
                kind: "GitLab".to_string(),
            }
        );
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(next_interval(POLL_INTERVAL_SECS), 20);
        assert_eq!(next_interval(40), POLL_MAX_INTERVAL_SECS);
        assert_eq!(next_interval(POLL_MAX_INTERVAL_SECS), POLL_MAX_INTERVAL_SECS);
    }
}
