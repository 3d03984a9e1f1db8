//! Shared test utilities for esdomain integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use esdomain::policy;
use esdomain::request::{ClusterConfigPayload, CreateDomainRequest, EbsOptionsPayload, UpdateDomainRequest};
use esdomain::spec::{
    ClusterConfig, DedicatedMaster, EbsVolume, EncryptionConfig, NetworkConfig, StorageConfig,
    ZoneAwareness,
};
use esdomain::{
    CloudResourceClient, DescribeOutcome, DesiredDomainSpec, ObservedDomainState, ProviderError,
    RawParams,
};

pub const ACCOUNT_ARN_PREFIX: &str = "arn:aws:es:eu-west-1:123456789012:domain";

/// A call recorded by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Describe(String),
    Create(CreateDomainRequest),
    Update(UpdateDomainRequest),
}

/// In-memory provider. Applies create/update to its stored domain and,
/// like the real service, fills in `Resource` for policy statements that
/// omit it.
#[derive(Default)]
pub struct FakeProvider {
    domain: Mutex<Option<ObservedDomainState>>,
    calls: Mutex<Vec<Call>>,
    describe_error: Mutex<Option<ProviderError>>,
    create_error: Mutex<Option<ProviderError>>,
    update_error: Mutex<Option<ProviderError>>,
}

impl FakeProvider {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Provider already holding a domain created from `spec`.
    pub fn with_domain(spec: &DesiredDomainSpec) -> Arc<Self> {
        let fake = Self::default();
        let policy = policy::serialize(&spec.access_policy).unwrap();
        fake.apply_create(&CreateDomainRequest::new(spec, policy));
        Arc::new(fake)
    }

    pub fn arn(name: &str) -> String {
        format!("{ACCOUNT_ARN_PREFIX}/{name}")
    }

    pub fn fail_describe(&self, err: ProviderError) {
        *self.describe_error.lock().unwrap() = Some(err);
    }

    pub fn fail_create(&self, err: ProviderError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub fn fail_update(&self, err: ProviderError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn creates(&self) -> Vec<CreateDomainRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<UpdateDomainRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn domain(&self) -> Option<ObservedDomainState> {
        self.domain.lock().unwrap().clone()
    }

    /// Mutate the stored domain directly, as an out-of-band change would.
    pub fn edit(&self, f: impl FnOnce(&mut ObservedDomainState)) {
        if let Some(domain) = self.domain.lock().unwrap().as_mut() {
            f(domain);
        }
    }

    fn apply_create(&self, req: &CreateDomainRequest) {
        let arn = Self::arn(&req.domain_name);
        let encryption = &req.encryption_at_rest_options;
        let state = ObservedDomainState {
            name: req.domain_name.clone(),
            domain_id: Some(format!("123456789012/{}", req.domain_name)),
            access_policies: Some(provider_policy(&req.access_policies, &arn)),
            arn: Some(arn),
            engine_version: Some(req.elasticsearch_version.clone()),
            cluster: cluster_from(&req.elasticsearch_cluster_config),
            storage: storage_from(&req.ebs_options),
            network: req.vpc_options.as_ref().map(|v| NetworkConfig {
                subnet_ids: v.subnet_ids.clone(),
                security_group_ids: v.security_group_ids.clone(),
            }),
            encryption: encryption.enabled.then(|| EncryptionConfig {
                kms_key_id: encryption.kms_key_id.clone(),
            }),
            snapshot_start_hour: Some(req.snapshot_options.automated_snapshot_start_hour),
            endpoint: Some(format!("search-{}.eu-west-1.es.amazonaws.com", req.domain_name)),
            processing: false,
            created: true,
            deleted: false,
        };
        *self.domain.lock().unwrap() = Some(state);
    }

    fn apply_update(&self, req: &UpdateDomainRequest) {
        let mut guard = self.domain.lock().unwrap();
        if let Some(domain) = guard.as_mut() {
            let arn = domain.arn.clone().unwrap_or_default();
            domain.cluster = cluster_from(&req.elasticsearch_cluster_config);
            domain.storage = storage_from(&req.ebs_options);
            domain.snapshot_start_hour = Some(req.snapshot_options.automated_snapshot_start_hour);
            domain.access_policies = Some(provider_policy(&req.access_policies, &arn));
            if let Some(v) = &req.vpc_options {
                domain.network = Some(NetworkConfig {
                    subnet_ids: v.subnet_ids.clone(),
                    security_group_ids: v.security_group_ids.clone(),
                });
            }
        }
    }
}

#[async_trait]
impl CloudResourceClient for FakeProvider {
    async fn describe(&self, name: &str) -> Result<DescribeOutcome, ProviderError> {
        self.calls.lock().unwrap().push(Call::Describe(name.to_string()));
        if let Some(err) = self.describe_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(match self.domain() {
            Some(domain) if domain.name == name => DescribeOutcome::Found(domain),
            _ => DescribeOutcome::NotFound,
        })
    }

    async fn create(&self, request: &CreateDomainRequest) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(Call::Create(request.clone()));
        if let Some(err) = self.create_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.apply_create(request);
        Ok(())
    }

    async fn update(&self, request: &UpdateDomainRequest) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(Call::Update(request.clone()));
        if let Some(err) = self.update_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.apply_update(request);
        Ok(())
    }
}

/// The service stores policies with default resources filled in.
fn provider_policy(raw: &str, arn: &str) -> String {
    let doc: Value = serde_json::from_str(raw).unwrap();
    policy::patch_policy(&doc, arn).to_string()
}

fn cluster_from(p: &ClusterConfigPayload) -> ClusterConfig {
    ClusterConfig {
        instance_type: p.instance_type.clone(),
        instance_count: p.instance_count,
        dedicated_master: p.dedicated_master_enabled.then(|| DedicatedMaster {
            instance_type: p.dedicated_master_type.clone(),
            instance_count: p.dedicated_master_count,
        }),
        zone_awareness: p.zone_awareness_enabled.then(|| ZoneAwareness {
            availability_zone_count: p
                .zone_awareness_config
                .as_ref()
                .map(|z| z.availability_zone_count),
        }),
    }
}

fn storage_from(p: &EbsOptionsPayload) -> StorageConfig {
    StorageConfig {
        ebs: p.ebs_enabled.then(|| EbsVolume {
            volume_type: p.volume_type.clone(),
            volume_size: p.volume_size,
        }),
    }
}

/// Raw params of the `logs` example domain.
pub fn logs_params() -> Value {
    json!({
        "name": "logs",
        "instance_type": "t2.small.elasticsearch",
        "instance_count": 1,
        "dedicated_master": false,
        "zone_awareness": false,
        "ebs": true,
        "volume_type": "gp2",
        "volume_size": 10,
        "snapshot_hour": 3,
        "access_policies": {"Statement": [{"Effect": "Allow"}]}
    })
}

pub fn spec_from(value: Value) -> DesiredDomainSpec {
    esdomain::normalize(&RawParams::from_value(value).unwrap()).unwrap()
}

pub fn logs_spec() -> DesiredDomainSpec {
    spec_from(logs_params())
}
