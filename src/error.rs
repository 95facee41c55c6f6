// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitLabError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("resource class not found for {kind} provider {provider}")]
    ResourceClassNotFound { kind: String, provider: String },

    #[error("failed to find resource class for {kind} provider {provider}: {source}")]
    FailedToFindResourceClass {
        kind: String,
        provider: String,
        #[source]
        source: Box<GitLabError>,
    },

    #[error("failed to create {kind} {key}: {source}")]
    FailedToCreate {
        kind: String,
        key: String,
        #[source]
        source: Box<GitLabError>,
    },

    #[error("failed to retrieve {kind} instance {key}: {source}")]
    FailedToRetrieveInstance {
        kind: String,
        key: String,
        #[source]
        source: Box<GitLabError>,
    },

    #[error("failed to create connection data: {0}")]
    FailedToCreateConnectionData(#[source] Box<GitLabError>),

    #[error("failed to create config data: {0}")]
    FailedToCreateConfigData(#[source] Box<GitLabError>),

    #[error("failed to retrieve {kind} connection secret {key}: {source}")]
    FailedToRetrieveSecret {
        kind: String,
        key: String,
        #[source]
        source: Box<GitLabError>,
    },

    #[error("failed to update {kind} connection secret {key}: {source}")]
    FailedToUpdateSecret {
        kind: String,
        key: String,
        #[source]
        source: Box<GitLabError>,
    },

    #[error("empty connection secret")]
    EmptyConnectionSecret,

    #[error("{0} is not ready")]
    ComponentNotReady(String),

    #[error("Failed to render helm values: {0}")]
    HelmValuesError(String),

    #[error(transparent)]
    Components(#[from] ComponentErrors),
}

impl GitLabError {
    /// True when the API server answered 404 for the requested object
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitLabError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }

    /// True when the error only means a connection secret has not been populated yet
    pub fn is_not_provisioned(&self) -> bool {
        match self {
            GitLabError::EmptyConnectionSecret => true,
            GitLabError::FailedToCreateConnectionData(source)
            | GitLabError::FailedToCreateConfigData(source) => source.is_not_provisioned(),
            _ => false,
        }
    }
}

/// Errors collected from every component in one reconcile tick, keyed by claim kind
#[derive(Debug, Default)]
pub struct ComponentErrors(pub Vec<(String, GitLabError)>);

impl ComponentErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, kind: impl Into<String>, error: GitLabError) {
        self.0.push((kind.into(), error));
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(kind, _)| kind.as_str())
    }
}

impl fmt::Display for ComponentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|(kind, err)| format!("{}: {}", kind, err))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ComponentErrors {}

pub type Result<T> = std::result::Result<T, GitLabError>;
