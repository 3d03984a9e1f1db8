//! Reconcilers for provider resources.
//!
//! A reconciler compares desired state (spec from the caller) with actual
//! state (read from the provider) and takes at most one action to converge.

pub mod domain;

use async_trait::async_trait;

pub use domain::{Action, DomainReconciler, ReconcileMode, ReconcileResult};

/// Trait for resource reconcilers.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The desired state supplied by the caller.
    type Spec: Sync;
    /// The outcome reported back, including failures.
    type Status;

    /// Reconcile the resource - compare desired vs actual state and take action.
    async fn reconcile(&self, spec: &Self::Spec) -> Self::Status;
}
