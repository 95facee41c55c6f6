// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provider-specific connection data derived from a bucket's credentials.
//!
//! A bucket claim publishes `username` and `password` in its connection secret.
//! GitLab's chart consumes them in two shapes: an environment block under
//! `connection` and an `s3cmd` configuration file under `config`.

use crate::constants::secret_keys;
use crate::error::{GitLabError, Result};
use crate::types::gitlab::BucketProvider;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

/// Value stored under `key`, empty when absent
pub fn secret_value(data: &BTreeMap<String, ByteString>, key: &str) -> String {
    data.get(key)
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
        .unwrap_or_default()
}

/// `connection` data for AWS and S3-compatible stores
pub fn aws_connection(access_key: &str, secret_key: &str) -> String {
    format!("AWS_ACCESS_KEY_ID={access_key}\nAWS_SECRET_ACCESS_KEY={secret_key}\n")
}

/// `config` data for AWS and S3-compatible stores, in `s3cmd` format
pub fn aws_s3cmd_config(access_key: &str, secret_key: &str) -> String {
    format!("[default]\naccess_key = {access_key}\nsecret_key = {secret_key}\n")
}

/// Writes one derived key into a connection secret
pub trait SecretDataCreator: Send + Sync {
    fn create(&self, secret: &mut Secret) -> Result<()>;
}

/// Render `username`/`password` into `output_key`, leaving every other key alone
fn render_into(
    secret: &mut Secret,
    output_key: &str,
    render: impl Fn(&str, &str) -> String,
) -> Result<()> {
    let data = match secret.data.as_mut() {
        Some(data) if !data.is_empty() => data,
        _ => return Err(GitLabError::EmptyConnectionSecret),
    };

    let username = secret_value(data, secret_keys::USERNAME);
    let password = secret_value(data, secret_keys::PASSWORD);
    data.insert(
        output_key.to_string(),
        ByteString(render(&username, &password).into_bytes()),
    );
    Ok(())
}

pub struct AwsConnectionCreator;

impl SecretDataCreator for AwsConnectionCreator {
    fn create(&self, secret: &mut Secret) -> Result<()> {
        render_into(secret, secret_keys::CONNECTION, aws_connection)
    }
}

pub struct AwsS3CmdConfigCreator;

impl SecretDataCreator for AwsS3CmdConfigCreator {
    fn create(&self, secret: &mut Secret) -> Result<()> {
        render_into(secret, secret_keys::CONFIG, aws_s3cmd_config)
    }
}

/// Runs the connection creator, then the config creator
pub struct SecretUpdater {
    connection: Box<dyn SecretDataCreator>,
    config: Box<dyn SecretDataCreator>,
}

impl SecretUpdater {
    pub fn new(connection: Box<dyn SecretDataCreator>, config: Box<dyn SecretDataCreator>) -> Self {
        Self { connection, config }
    }

    pub fn for_provider(provider: BucketProvider) -> Self {
        match provider {
            BucketProvider::Aws => Self::new(Box::new(AwsConnectionCreator), Box::new(AwsS3CmdConfigCreator)),
        }
    }

    /// Stops at the first failing creator
    pub fn update(&self, secret: &mut Secret) -> Result<()> {
        self.connection
            .create(secret)
            .map_err(|e| GitLabError::FailedToCreateConnectionData(Box::new(e)))?;
        self.config
            .create(secret)
            .map_err(|e| GitLabError::FailedToCreateConfigData(Box::new(e)))?;
        Ok(())
    }
}
