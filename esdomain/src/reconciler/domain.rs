//! Domain reconciler - converges a search domain onto its desired spec.
//!
//! Each run is a standalone describe -> create/update/no-op -> describe
//! cycle. Nothing is cached between runs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

use super::Reconciler;
use crate::clients::{CloudResourceClient, DescribeOutcome};
use crate::diff::{self, Drift};
use crate::error::{Operation, ReconcileError};
use crate::observed::ObservedDomainState;
use crate::policy;
use crate::request::{CreateDomainRequest, UpdateDomainRequest};
use crate::spec::DesiredDomainSpec;

/// Whether mutations are issued or only planned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileMode {
    #[default]
    Apply,
    Check,
}

/// What a run did (or, in check mode, would do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Unchanged,
    WouldCreate,
    WouldUpdate,
    Failed,
}

/// Outcome of one reconcile run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub action: Action,
    /// Current provider state, read after any mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ObservedDomainState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drift: Vec<Drift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ReconcileResult {
    fn unchanged(observed: ObservedDomainState) -> Self {
        Self {
            changed: false,
            action: Action::Unchanged,
            response: Some(observed),
            drift: Vec::new(),
            error_message: None,
        }
    }

    fn failed(changed: bool, drift: Vec<Drift>, err: &ReconcileError) -> Self {
        Self {
            changed,
            action: Action::Failed,
            response: None,
            drift,
            error_message: Some(err.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Domain reconciler driving a [`CloudResourceClient`].
pub struct DomainReconciler {
    client: Arc<dyn CloudResourceClient>,
    mode: ReconcileMode,
}

impl DomainReconciler {
    pub fn new(client: Arc<dyn CloudResourceClient>) -> Self {
        Self {
            client,
            mode: ReconcileMode::Apply,
        }
    }

    pub fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Not-found path. The ARN is unknown, so the policy goes out unpatched.
    async fn create(&self, spec: &DesiredDomainSpec, policy: String) -> ReconcileResult {
        if self.mode == ReconcileMode::Check {
            info!(domain = %spec.name, "Domain does not exist, would create");
            return ReconcileResult {
                changed: true,
                action: Action::WouldCreate,
                response: None,
                drift: Vec::new(),
                error_message: None,
            };
        }

        info!(domain = %spec.name, "Creating domain");
        let request = CreateDomainRequest::new(spec, policy);
        if let Err(e) = self.client.create(&request).await {
            let err = ReconcileError::provider(Operation::Create, e);
            error!(domain = %spec.name, "Failed to create domain: {}", err);
            return ReconcileResult::failed(false, Vec::new(), &err);
        }

        self.read_back(&spec.name, Action::Created, Vec::new()).await
    }

    /// Found path: patch the policy with the ARN, diff, update on drift.
    async fn converge(
        &self,
        spec: &DesiredDomainSpec,
        observed: ObservedDomainState,
    ) -> ReconcileResult {
        let desired_policy = match observed.arn.as_deref() {
            Some(arn) => policy::patch_policy(&spec.access_policy, arn),
            None => spec.access_policy.clone(),
        };
        let serialized = match policy::serialize(&desired_policy) {
            Ok(s) => s,
            Err(e) => return ReconcileResult::failed(false, Vec::new(), &ReconcileError::from(e)),
        };

        let domain_diff = diff::diff(spec, &desired_policy, &observed);
        if domain_diff.is_empty() {
            info!(domain = %spec.name, "Domain is up to date");
            return ReconcileResult::unchanged(observed);
        }
        for d in &domain_diff.drift {
            debug!(
                domain = %spec.name,
                field = %d.field,
                desired = %d.desired,
                observed = %d.observed,
                "Drift detected"
            );
        }

        if self.mode == ReconcileMode::Check {
            info!(domain = %spec.name, fields = domain_diff.drift.len(), "Domain drifted, would update");
            return ReconcileResult {
                changed: true,
                action: Action::WouldUpdate,
                response: Some(observed),
                drift: domain_diff.drift,
                error_message: None,
            };
        }

        info!(domain = %spec.name, fields = domain_diff.drift.len(), "Updating domain");
        let request = UpdateDomainRequest::new(spec, serialized);
        if let Err(e) = self.client.update(&request).await {
            let err = ReconcileError::provider(Operation::Update, e);
            error!(domain = %spec.name, "Failed to update domain: {}", err);
            return ReconcileResult::failed(false, domain_diff.drift, &err);
        }

        self.read_back(&spec.name, Action::Updated, domain_diff.drift)
            .await
    }

    /// Final describe after a mutation, so both paths report provider state.
    async fn read_back(&self, name: &str, action: Action, drift: Vec<Drift>) -> ReconcileResult {
        let err = match self.client.describe(name).await {
            Ok(DescribeOutcome::Found(state)) => {
                return ReconcileResult {
                    changed: true,
                    action,
                    response: Some(state),
                    drift,
                    error_message: None,
                };
            }
            Ok(DescribeOutcome::NotFound) => ReconcileError::Vanished(name.to_string()),
            Err(e) => ReconcileError::provider(Operation::Describe, e),
        };
        error!(domain = %name, "Failed to read back domain: {}", err);
        ReconcileResult::failed(true, drift, &err)
    }
}

#[async_trait]
impl Reconciler for DomainReconciler {
    type Spec = DesiredDomainSpec;
    type Status = ReconcileResult;

    async fn reconcile(&self, spec: &Self::Spec) -> Self::Status {
        info!(domain = %spec.name, "Reconciling domain");

        // Malformed policies are rejected before any provider call.
        let serialized = match policy::serialize(&spec.access_policy) {
            Ok(s) => s,
            Err(e) => {
                error!(domain = %spec.name, "{}", e);
                return ReconcileResult::failed(false, Vec::new(), &ReconcileError::from(e));
            }
        };

        match self.client.describe(&spec.name).await {
            Ok(DescribeOutcome::Found(observed)) => self.converge(spec, observed).await,
            Ok(DescribeOutcome::NotFound) => self.create(spec, serialized).await,
            Err(e) => {
                let err = ReconcileError::provider(Operation::Describe, e);
                error!(domain = %spec.name, "Failed to describe domain: {}", err);
                ReconcileResult::failed(false, Vec::new(), &err)
            }
        }
    }
}
