//! Domain state as reported by the provider.

use serde::{Deserialize, Serialize};

use crate::spec::{ClusterConfig, EncryptionConfig, NetworkConfig, StorageConfig};

/// Live configuration of a domain, read fresh on every run.
///
/// Conditional groups follow the same rule as the desired spec: a group is
/// `Some` only when the provider reports its flag as enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedDomainState {
    pub name: String,
    pub domain_id: Option<String>,
    /// Assigned by the provider once the domain is provisioned.
    pub arn: Option<String>,
    pub engine_version: Option<String>,
    pub cluster: ClusterConfig,
    pub storage: StorageConfig,
    pub network: Option<NetworkConfig>,
    pub encryption: Option<EncryptionConfig>,
    pub snapshot_start_hour: Option<i32>,
    /// Policy exactly as the provider returns it (a JSON string).
    pub access_policies: Option<String>,
    pub endpoint: Option<String>,
    pub processing: bool,
    pub created: bool,
    pub deleted: bool,
}

impl ObservedDomainState {
    /// VPC placement, if the domain has any.
    pub fn vpc(&self) -> Option<&NetworkConfig> {
        self.network.as_ref().filter(|n| !n.is_empty())
    }
}
