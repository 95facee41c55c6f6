// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and cancellable API calls.

pub mod cancel;
pub mod crd;

pub use cancel::with_cancellation;
pub use crd::{wait_for_crds, CrdType};
