// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Claim status as published by the resource-abstraction layer.

use crate::constants::conditions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to an object in the same namespace as its referrer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct LocalObjectRef {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(condition_type: &str, active: bool) -> Self {
        Condition {
            condition_type: condition_type.to_string(),
            status: if active { conditions::TRUE } else { conditions::FALSE }.to_string(),
            last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
            reason: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == conditions::TRUE
    }
}

/// Lifecycle state of a claim, derived from its conditions
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimState {
    Absent,
    Creating,
    Ready,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClaimStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_secret_ref: Option<LocalObjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_phase: Option<String>,
}

impl ResourceClaimStatus {
    fn has_active(&self, condition_type: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.condition_type == condition_type && c.is_true())
    }

    pub fn is_ready(&self) -> bool {
        self.has_active(conditions::READY)
    }

    pub fn is_failed(&self) -> bool {
        self.has_active(conditions::FAILED)
    }

    /// Ready wins over Failed; anything else is still being created
    pub fn state(&self) -> ClaimState {
        if self.is_ready() {
            ClaimState::Ready
        } else if self.is_failed() {
            ClaimState::Failed
        } else {
            ClaimState::Creating
        }
    }

    /// Name of the connection secret once the claim has published one
    pub fn connection_secret_name(&self) -> Option<&str> {
        self.connection_secret_ref
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Make `condition_type` the only active lifecycle condition
    pub fn set_condition(&mut self, condition: Condition) {
        for c in self.conditions.iter_mut() {
            if c.condition_type != condition.condition_type && c.is_true() {
                c.status = conditions::FALSE.to_string();
            }
        }
        self.conditions
            .retain(|c| c.condition_type != condition.condition_type);
        self.conditions.push(condition);
    }

    pub fn set_creating(&mut self) {
        self.set_condition(Condition::new(conditions::CREATING, true));
    }

    pub fn set_ready(&mut self) {
        self.set_condition(Condition::new(conditions::READY, true));
    }

    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.set_condition(Condition::new(conditions::FAILED, true).with_message(message));
    }
}
