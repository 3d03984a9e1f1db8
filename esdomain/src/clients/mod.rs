//! Clients for the domain management API.
//!
//! The reconciler only talks to the provider through [`CloudResourceClient`]:
//! - `aws`: the Elasticsearch Service API via the AWS SDK

#[cfg(feature = "aws")]
pub mod aws;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::observed::ObservedDomainState;
use crate::request::{CreateDomainRequest, UpdateDomainRequest};

#[cfg(feature = "aws")]
pub use aws::{AwsConnection, AwsDomainClient};

/// Result of looking up a domain by name.
#[derive(Debug, Clone, PartialEq)]
pub enum DescribeOutcome {
    Found(ObservedDomainState),
    NotFound,
}

/// Capability the reconciler needs from the provider.
///
/// Retries, timeouts and request signing belong to implementations.
#[async_trait]
pub trait CloudResourceClient: Send + Sync {
    /// Read the current state of a domain.
    async fn describe(&self, name: &str) -> Result<DescribeOutcome, ProviderError>;

    /// Create a new domain.
    async fn create(&self, request: &CreateDomainRequest) -> Result<(), ProviderError>;

    /// Update the mutable configuration of an existing domain.
    async fn update(&self, request: &UpdateDomainRequest) -> Result<(), ProviderError>;
}
