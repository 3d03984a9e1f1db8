//! Create and update requests, named the way the provider API names them.
//!
//! The payload structs double as the comparison baseline in [`crate::diff`]:
//! keys that are skipped here (disabled groups) are absent on both sides.

use serde::{Deserialize, Serialize};

use crate::spec::{ClusterConfig, DesiredDomainSpec, NetworkConfig, StorageConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneAwarenessPayload {
    pub availability_zone_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterConfigPayload {
    pub instance_type: String,
    pub instance_count: i32,
    pub dedicated_master_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_master_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_master_count: Option<i32>,
    pub zone_awareness_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_awareness_config: Option<ZoneAwarenessPayload>,
}

impl From<&ClusterConfig> for ClusterConfigPayload {
    fn from(c: &ClusterConfig) -> Self {
        let master = c.dedicated_master.as_ref();
        Self {
            instance_type: c.instance_type.clone(),
            instance_count: c.instance_count,
            dedicated_master_enabled: c.dedicated_master_enabled(),
            dedicated_master_type: master.and_then(|m| m.instance_type.clone()),
            dedicated_master_count: master.and_then(|m| m.instance_count),
            zone_awareness_enabled: c.zone_awareness_enabled(),
            zone_awareness_config: c
                .zone_awareness
                .as_ref()
                .and_then(|z| z.availability_zone_count)
                .map(|count| ZoneAwarenessPayload {
                    availability_zone_count: count,
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbsOptionsPayload {
    #[serde(rename = "EBSEnabled")]
    pub ebs_enabled: bool,
    #[serde(rename = "VolumeType", default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(rename = "VolumeSize", default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,
}

impl From<&StorageConfig> for EbsOptionsPayload {
    fn from(s: &StorageConfig) -> Self {
        let ebs = s.ebs.as_ref();
        Self {
            ebs_enabled: s.ebs_enabled(),
            volume_type: ebs.and_then(|e| e.volume_type.clone()),
            volume_size: ebs.and_then(|e| e.volume_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotOptionsPayload {
    pub automated_snapshot_start_hour: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcOptionsPayload {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

impl VpcOptionsPayload {
    /// Only non-empty placements are sent.
    pub fn from_network(network: Option<&NetworkConfig>) -> Option<Self> {
        network.filter(|n| !n.is_empty()).map(|n| Self {
            subnet_ids: n.subnet_ids.clone(),
            security_group_ids: n.security_group_ids.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptionAtRestPayload {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// Full creation request. Encryption at rest can only be set here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDomainRequest {
    pub domain_name: String,
    pub elasticsearch_version: String,
    pub elasticsearch_cluster_config: ClusterConfigPayload,
    #[serde(rename = "EBSOptions")]
    pub ebs_options: EbsOptionsPayload,
    pub snapshot_options: SnapshotOptionsPayload,
    pub access_policies: String,
    #[serde(rename = "VPCOptions", default, skip_serializing_if = "Option::is_none")]
    pub vpc_options: Option<VpcOptionsPayload>,
    pub encryption_at_rest_options: EncryptionAtRestPayload,
}

impl CreateDomainRequest {
    /// `access_policies` is the serialized policy document.
    pub fn new(spec: &DesiredDomainSpec, access_policies: String) -> Self {
        Self {
            domain_name: spec.name.clone(),
            elasticsearch_version: spec.engine_version.clone(),
            elasticsearch_cluster_config: ClusterConfigPayload::from(&spec.cluster),
            ebs_options: EbsOptionsPayload::from(&spec.storage),
            snapshot_options: SnapshotOptionsPayload {
                automated_snapshot_start_hour: spec.snapshot_start_hour,
            },
            access_policies,
            vpc_options: VpcOptionsPayload::from_network(spec.network.as_ref()),
            encryption_at_rest_options: EncryptionAtRestPayload {
                enabled: spec.encryption.is_some(),
                kms_key_id: spec.encryption.as_ref().and_then(|e| e.kms_key_id.clone()),
            },
        }
    }
}

/// Configuration update. Engine version and encryption are not mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateDomainRequest {
    pub domain_name: String,
    pub elasticsearch_cluster_config: ClusterConfigPayload,
    #[serde(rename = "EBSOptions")]
    pub ebs_options: EbsOptionsPayload,
    pub snapshot_options: SnapshotOptionsPayload,
    pub access_policies: String,
    #[serde(rename = "VPCOptions", default, skip_serializing_if = "Option::is_none")]
    pub vpc_options: Option<VpcOptionsPayload>,
}

impl UpdateDomainRequest {
    pub fn new(spec: &DesiredDomainSpec, access_policies: String) -> Self {
        Self {
            domain_name: spec.name.clone(),
            elasticsearch_cluster_config: ClusterConfigPayload::from(&spec.cluster),
            ebs_options: EbsOptionsPayload::from(&spec.storage),
            snapshot_options: SnapshotOptionsPayload {
                automated_snapshot_start_hour: spec.snapshot_start_hour,
            },
            access_policies,
            vpc_options: VpcOptionsPayload::from_network(spec.network.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DedicatedMaster, EbsVolume, EncryptionConfig, ZoneAwareness};
    use serde_json::json;

    fn spec() -> DesiredDomainSpec {
        DesiredDomainSpec {
            name: "logs".to_string(),
            engine_version: "2.3".to_string(),
            cluster: ClusterConfig {
                instance_type: "t2.small.elasticsearch".to_string(),
                instance_count: 1,
                dedicated_master: None,
                zone_awareness: None,
            },
            storage: StorageConfig {
                ebs: Some(EbsVolume {
                    volume_type: Some("gp2".to_string()),
                    volume_size: Some(10),
                }),
            },
            network: None,
            encryption: None,
            snapshot_start_hour: 3,
            access_policy: json!({"Statement": [{"Effect": "Allow"}]}),
        }
    }

    #[test]
    fn test_create_request_wire_names() {
        let req = CreateDomainRequest::new(&spec(), "{}".to_string());
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(
            wire,
            json!({
                "DomainName": "logs",
                "ElasticsearchVersion": "2.3",
                "ElasticsearchClusterConfig": {
                    "InstanceType": "t2.small.elasticsearch",
                    "InstanceCount": 1,
                    "DedicatedMasterEnabled": false,
                    "ZoneAwarenessEnabled": false
                },
                "EBSOptions": {"EBSEnabled": true, "VolumeType": "gp2", "VolumeSize": 10},
                "SnapshotOptions": {"AutomatedSnapshotStartHour": 3},
                "AccessPolicies": "{}",
                "EncryptionAtRestOptions": {"Enabled": false}
            })
        );
    }

    #[test]
    fn test_enabled_groups_are_emitted() {
        let mut s = spec();
        s.cluster.dedicated_master = Some(DedicatedMaster {
            instance_type: Some("t2.micro.elasticsearch".to_string()),
            instance_count: Some(3),
        });
        s.cluster.zone_awareness = Some(ZoneAwareness {
            availability_zone_count: Some(2),
        });
        s.encryption = Some(EncryptionConfig {
            kms_key_id: Some("key-1".to_string()),
        });
        s.network = Some(NetworkConfig {
            subnet_ids: vec!["subnet-1".to_string()],
            security_group_ids: vec![],
        });
        let wire = serde_json::to_value(CreateDomainRequest::new(&s, "{}".to_string())).unwrap();
        let cluster = &wire["ElasticsearchClusterConfig"];
        assert_eq!(cluster["DedicatedMasterType"], "t2.micro.elasticsearch");
        assert_eq!(cluster["DedicatedMasterCount"], 3);
        assert_eq!(cluster["ZoneAwarenessConfig"]["AvailabilityZoneCount"], 2);
        assert_eq!(
            wire["EncryptionAtRestOptions"],
            json!({"Enabled": true, "KmsKeyId": "key-1"})
        );
        assert_eq!(
            wire["VPCOptions"],
            json!({"SubnetIds": ["subnet-1"], "SecurityGroupIds": []})
        );
    }

    #[test]
    fn test_update_request_has_no_encryption_or_version() {
        let mut s = spec();
        s.encryption = Some(EncryptionConfig { kms_key_id: None });
        let wire = serde_json::to_value(UpdateDomainRequest::new(&s, "{}".to_string())).unwrap();
        let obj = wire.as_object().unwrap();
        assert!(!obj.contains_key("EncryptionAtRestOptions"));
        assert!(!obj.contains_key("ElasticsearchVersion"));
        assert!(!obj.contains_key("VPCOptions"));
    }

    #[test]
    fn test_disabled_ebs_omits_volume_keys() {
        let mut s = spec();
        s.storage.ebs = None;
        let wire = serde_json::to_value(EbsOptionsPayload::from(&s.storage)).unwrap();
        assert_eq!(wire, json!({"EBSEnabled": false}));
    }
}
