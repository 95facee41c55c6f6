// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "gitlab-controller";

/// Claim kinds, used in error messages and component status
pub mod claim_kind {
    pub const KUBERNETES: &str = "kubernetes";
    pub const REDIS: &str = "redis";
    pub const POSTGRES: &str = "postgres";
    /// Prefix for bucket claim kinds, followed by the bucket's logical name
    pub const BUCKET_PREFIX: &str = "bucket-";
}

/// Fixed spec values for downstream claims
pub mod engine {
    pub const REDIS_VERSION: &str = "3.2";
    pub const POSTGRES_VERSION: &str = "9.6";
}

/// Well-known keys of a claim connection secret
pub mod secret_keys {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const ENDPOINT: &str = "endpoint";
    /// Written by this controller for bucket secrets
    pub const CONNECTION: &str = "connection";
    /// Written by this controller for bucket secrets
    pub const CONFIG: &str = "config";
}

/// Condition types reported by claims and by the GitLab status
pub mod conditions {
    pub const READY: &str = "Ready";
    pub const CREATING: &str = "Creating";
    pub const FAILED: &str = "Failed";
    pub const SYNCED: &str = "Synced";
    pub const TRUE: &str = "True";
    pub const FALSE: &str = "False";
}

/// Helm values publication
pub mod helm {
    pub const VALUES_CONFIG_MAP_SUFFIX: &str = "helm-values";
    pub const VALUES_KEY: &str = "values.yaml";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
