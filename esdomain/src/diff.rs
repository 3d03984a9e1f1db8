//! Field-level comparison of desired and observed domain state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::observed::ObservedDomainState;
use crate::request::{ClusterConfigPayload, EbsOptionsPayload};
use crate::spec::DesiredDomainSpec;

/// One field whose observed value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub field: String,
    pub desired: Value,
    pub observed: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDiff {
    pub drift: Vec<Drift>,
}

impl DomainDiff {
    pub fn is_empty(&self) -> bool {
        self.drift.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.drift.iter().map(|d| d.field.as_str()).collect()
    }

    fn push(&mut self, field: impl Into<String>, desired: Value, observed: Value) {
        self.drift.push(Drift {
            field: field.into(),
            desired,
            observed,
        });
    }

    /// Compare two wire-shaped objects key by key. A key present on only
    /// one side is drift.
    fn compare_section(&mut self, section: &str, desired: Value, observed: Value) {
        let desired = into_object(desired);
        let observed = into_object(observed);
        let extra = observed.keys().filter(|k| !desired.contains_key(*k));
        let keys: Vec<String> = desired.keys().chain(extra).cloned().collect();
        for key in keys {
            let d = desired.get(&key).cloned().unwrap_or(Value::Null);
            let o = observed.get(&key).cloned().unwrap_or(Value::Null);
            if d != o {
                self.push(format!("{section}.{key}"), d, o);
            }
        }
    }
}

/// Compute the drift between `desired` and `observed`.
///
/// `policy` is the desired access policy after ARN patching. Encryption and
/// engine version are never compared: neither can change after creation.
/// Network placement is only compared when the domain already has one.
pub fn diff(desired: &DesiredDomainSpec, policy: &Value, observed: &ObservedDomainState) -> DomainDiff {
    let mut out = DomainDiff::default();

    out.compare_section(
        "ElasticsearchClusterConfig",
        to_value(&ClusterConfigPayload::from(&desired.cluster)),
        to_value(&ClusterConfigPayload::from(&observed.cluster)),
    );

    out.compare_section(
        "EBSOptions",
        to_value(&EbsOptionsPayload::from(&desired.storage)),
        to_value(&EbsOptionsPayload::from(&observed.storage)),
    );

    if let Some(current) = observed.vpc() {
        let wanted = desired.network.clone().unwrap_or_default();
        if wanted.subnet_ids != current.subnet_ids {
            out.push(
                "VPCOptions.SubnetIds",
                to_value(&wanted.subnet_ids),
                to_value(&current.subnet_ids),
            );
        }
        if wanted.security_group_ids != current.security_group_ids {
            out.push(
                "VPCOptions.SecurityGroupIds",
                to_value(&wanted.security_group_ids),
                to_value(&current.security_group_ids),
            );
        }
    }

    if observed.snapshot_start_hour != Some(desired.snapshot_start_hour) {
        out.push(
            "SnapshotOptions.AutomatedSnapshotStartHour",
            Value::from(desired.snapshot_start_hour),
            to_value(&observed.snapshot_start_hour),
        );
    }

    if !crate::policy::policies_equal(policy, observed.access_policies.as_deref()) {
        let current = observed
            .access_policies
            .as_deref()
            .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
            .unwrap_or(Value::Null);
        out.push("AccessPolicies", policy.clone(), current);
    }

    out
}

fn to_value<T: Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or_default()
}

fn into_object(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
