//! Desired domain state and the normalizer that builds it from raw params.
//!
//! Conditional groups (dedicated master, zone awareness, EBS volume,
//! encryption at rest) are modelled as `Option` sub-structures: the group is
//! `Some` exactly when its governing flag is true, so values supplied for a
//! disabled group never reach a request or a comparison.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::params::RawParams;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Engine version used when the caller does not pick one.
pub const DEFAULT_ELASTICSEARCH_VERSION: &str = "2.3";

/// Availability zone count used when zone awareness is on and no count is given.
pub const DEFAULT_AVAILABILITY_ZONE_COUNT: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedicatedMaster {
    pub instance_type: Option<String>,
    pub instance_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAwareness {
    pub availability_zone_count: Option<i32>,
}

/// Node layout of the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub instance_type: String,
    pub instance_count: i32,
    pub dedicated_master: Option<DedicatedMaster>,
    pub zone_awareness: Option<ZoneAwareness>,
}

impl ClusterConfig {
    pub fn dedicated_master_enabled(&self) -> bool {
        self.dedicated_master.is_some()
    }

    pub fn zone_awareness_enabled(&self) -> bool {
        self.zone_awareness.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbsVolume {
    pub volume_type: Option<String>,
    pub volume_size: Option<i32>,
}

/// Storage backing the data nodes; `ebs` is `None` for instance storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub ebs: Option<EbsVolume>,
}

impl StorageConfig {
    pub fn ebs_enabled(&self) -> bool {
        self.ebs.is_some()
    }
}

/// VPC placement. Order of ids is significant for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

impl NetworkConfig {
    pub fn is_empty(&self) -> bool {
        self.subnet_ids.is_empty() && self.security_group_ids.is_empty()
    }
}

/// Encryption at rest; present only when enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    pub kms_key_id: Option<String>,
}

/// Canonical desired state of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredDomainSpec {
    pub name: String,
    pub engine_version: String,
    pub cluster: ClusterConfig,
    pub storage: StorageConfig,
    /// `None` when neither subnets nor security groups were given.
    pub network: Option<NetworkConfig>,
    pub encryption: Option<EncryptionConfig>,
    pub snapshot_start_hour: i32,
    /// Access policy as structured JSON, not yet serialized.
    pub access_policy: Value,
}

impl DesiredDomainSpec {
    pub fn from_params(raw: &RawParams) -> Result<Self> {
        normalize(raw)
    }
}

/// Validate and default raw params into a [`DesiredDomainSpec`].
///
/// Fields governed by a boolean flag are read (and type checked) but only
/// kept when the flag is true. Missing conditional fields are not an error.
pub fn normalize(raw: &RawParams) -> Result<DesiredDomainSpec> {
    let name = required(raw.string("name")?, "name")?;
    let engine_version = raw
        .string("elasticsearch_version")?
        .unwrap_or_else(|| DEFAULT_ELASTICSEARCH_VERSION.to_string());

    let instance_type = required(raw.string("instance_type")?, "instance_type")?;
    let instance_count = required(non_negative(raw, "instance_count")?, "instance_count")?;
    let dedicated_master_enabled = required(raw.bool("dedicated_master")?, "dedicated_master")?;
    let zone_awareness_enabled = required(raw.bool("zone_awareness")?, "zone_awareness")?;
    let ebs_enabled = required(raw.bool("ebs")?, "ebs")?;
    let volume_type = required(raw.string("volume_type")?, "volume_type")?;
    let volume_size = required(non_negative(raw, "volume_size")?, "volume_size")?;
    let snapshot_start_hour = required(ranged(raw, "snapshot_hour", 0, 23)?, "snapshot_hour")?;
    let access_policy = required(policy_document(raw)?, "access_policies")?;

    let master_type = raw.string("dedicated_master_instance_type")?;
    let master_count = non_negative(raw, "dedicated_master_instance_count")?;
    let zone_count = ranged(raw, "availability_zone_count", 1, i64::from(i32::MAX))?;
    let encryption_enabled = raw.bool("encryption_at_rest_enabled")?.unwrap_or(false);
    let kms_key_id = raw.string("kms_key_id")?;

    let cluster = ClusterConfig {
        instance_type,
        instance_count,
        dedicated_master: dedicated_master_enabled.then(|| DedicatedMaster {
            instance_type: master_type,
            instance_count: master_count,
        }),
        zone_awareness: zone_awareness_enabled.then(|| ZoneAwareness {
            availability_zone_count: Some(zone_count.unwrap_or(DEFAULT_AVAILABILITY_ZONE_COUNT)),
        }),
    };

    let storage = StorageConfig {
        ebs: ebs_enabled.then(|| EbsVolume {
            volume_type: Some(volume_type),
            volume_size: Some(volume_size),
        }),
    };

    let network = NetworkConfig {
        subnet_ids: raw.list("vpc_subnets")?,
        security_group_ids: raw.list("vpc_security_groups")?,
    };

    Ok(DesiredDomainSpec {
        name,
        engine_version,
        cluster,
        storage,
        network: (!network.is_empty()).then_some(network),
        encryption: encryption_enabled.then(|| EncryptionConfig { kms_key_id }),
        snapshot_start_hour,
        access_policy,
    })
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(ValidationError::Missing(field))
}

fn non_negative(raw: &RawParams, field: &'static str) -> Result<Option<i32>> {
    ranged(raw, field, 0, i64::from(i32::MAX))
}

fn ranged(raw: &RawParams, field: &'static str, min: i64, max: i64) -> Result<Option<i32>> {
    match raw.int(field)? {
        None => Ok(None),
        Some(value) if value < min || value > max => Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        }),
        // Bounds above keep the value inside i32.
        Some(value) => Ok(i32::try_from(value).ok()),
    }
}

/// The policy may be given as a JSON object or as a string holding one.
fn policy_document(raw: &RawParams) -> Result<Option<Value>> {
    match raw.get("access_policies") {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(Value::Object(map.clone()))),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(doc @ Value::Object(_)) => Ok(Some(doc)),
            Ok(other) => Err(ValidationError::InvalidPolicy(other.to_string())),
            Err(e) => Err(ValidationError::InvalidPolicy(e.to_string())),
        },
        Some(other) => Err(ValidationError::InvalidPolicy(other.to_string())),
    }
}
