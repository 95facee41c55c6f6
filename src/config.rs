// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace to watch for GitLab resources, all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Requeue interval while components are still converging
    pub requeue_interval: Duration,
    /// Resync interval once every component is ready
    pub ready_requeue_interval: Duration,
    /// Prefix applied to secret names referenced from helm values
    pub helm_secret_prefix: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let watch_namespace = env::var("WATCH_NAMESPACE").ok().filter(|ns| !ns.is_empty());
        let requeue_interval = secs_from_env("REQUEUE_INTERVAL_SECS", 30)?;
        let ready_requeue_interval = secs_from_env("READY_REQUEUE_INTERVAL_SECS", 300)?;
        let helm_secret_prefix = env::var("HELM_SECRET_PREFIX").unwrap_or_default();

        Ok(Config {
            watch_namespace,
            requeue_interval,
            ready_requeue_interval,
            helm_secret_prefix,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            requeue_interval: Duration::from_secs(30),
            ready_requeue_interval: Duration::from_secs(300),
            helm_secret_prefix: String::new(),
        }
    }
}

fn secs_from_env(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(value) => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", name, value))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
