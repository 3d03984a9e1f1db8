//! Client for the AWS Elasticsearch Service API.

use std::fmt::Display;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_elasticsearch::config::Credentials;
use aws_sdk_elasticsearch::error::ProvideErrorMetadata;
use aws_sdk_elasticsearch::operation::describe_elasticsearch_domain::DescribeElasticsearchDomainError;
use aws_sdk_elasticsearch::types::{
    EbsOptions, ElasticsearchClusterConfig, ElasticsearchDomainStatus, EncryptionAtRestOptions,
    EsPartitionInstanceType, SnapshotOptions, VolumeType, VpcOptions, ZoneAwarenessConfig,
};
use aws_sdk_elasticsearch::Client;
use tracing::debug;

use super::{CloudResourceClient, DescribeOutcome};
use crate::error::{ConnectionError, ProviderError};
use crate::observed::ObservedDomainState;
use crate::request::{
    ClusterConfigPayload, CreateDomainRequest, EbsOptionsPayload, EncryptionAtRestPayload,
    SnapshotOptionsPayload, UpdateDomainRequest, VpcOptionsPayload,
};
use crate::spec::{
    ClusterConfig, DedicatedMaster, EbsVolume, EncryptionConfig, NetworkConfig, StorageConfig,
    ZoneAwareness,
};

/// Connection settings. Unset fields fall back to the default AWS
/// configuration chain (environment, profile, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct AwsConnection {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Client for interacting with the Elasticsearch Service API.
#[derive(Clone)]
pub struct AwsDomainClient {
    client: Client,
}

impl AwsConnection {
    /// Static credentials, when both halves are given. One half alone is an
    /// error rather than a silent fall back to the default chain.
    pub fn static_credentials(&self) -> Result<Option<Credentials>, ConnectionError> {
        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Some(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "esdomain",
            ))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConnectionError::IncompleteCredentials {
                given: "access key",
                missing: "secret key",
            }),
            (None, Some(_)) => Err(ConnectionError::IncompleteCredentials {
                given: "secret key",
                missing: "access key",
            }),
        }
    }
}

impl AwsDomainClient {
    pub async fn connect(conn: &AwsConnection) -> Result<Self, ConnectionError> {
        let credentials = conn.static_credentials()?;
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &conn.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &conn.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        if let Some(credentials) = credentials {
            loader = loader.credentials_provider(credentials);
        }
        let shared = loader.load().await;
        Ok(Self {
            client: Client::new(&shared),
        })
    }
}

#[async_trait]
impl CloudResourceClient for AwsDomainClient {
    async fn describe(&self, name: &str) -> Result<DescribeOutcome, ProviderError> {
        debug!("Describing domain {}", name);
        match self
            .client
            .describe_elasticsearch_domain()
            .domain_name(name)
            .send()
            .await
        {
            Ok(output) => {
                // Required members are plain references in newer SDK releases.
                let status: Option<&ElasticsearchDomainStatus> =
                    Option::from(output.domain_status());
                Ok(match status {
                    Some(status) => DescribeOutcome::Found(observed_from_status(name, status)),
                    None => DescribeOutcome::NotFound,
                })
            }
            Err(err) => describe_failure(err.into_service_error()),
        }
    }

    async fn create(&self, request: &CreateDomainRequest) -> Result<(), ProviderError> {
        debug!("Creating domain {}", request.domain_name);
        self.client
            .create_elasticsearch_domain()
            .domain_name(&request.domain_name)
            .elasticsearch_version(&request.elasticsearch_version)
            .elasticsearch_cluster_config(cluster_config(&request.elasticsearch_cluster_config))
            .ebs_options(ebs_options(&request.ebs_options))
            .snapshot_options(snapshot_options(&request.snapshot_options))
            .access_policies(&request.access_policies)
            .set_vpc_options(request.vpc_options.as_ref().map(vpc_options))
            .encryption_at_rest_options(encryption_options(&request.encryption_at_rest_options))
            .send()
            .await
            .map_err(|err| provider_error(&err.into_service_error()))?;
        Ok(())
    }

    async fn update(&self, request: &UpdateDomainRequest) -> Result<(), ProviderError> {
        debug!("Updating domain {}", request.domain_name);
        self.client
            .update_elasticsearch_domain_config()
            .domain_name(&request.domain_name)
            .elasticsearch_cluster_config(cluster_config(&request.elasticsearch_cluster_config))
            .ebs_options(ebs_options(&request.ebs_options))
            .snapshot_options(snapshot_options(&request.snapshot_options))
            .access_policies(&request.access_policies)
            .set_vpc_options(request.vpc_options.as_ref().map(vpc_options))
            .send()
            .await
            .map_err(|err| provider_error(&err.into_service_error()))?;
        Ok(())
    }
}

/// A missing domain is an outcome, not an error.
fn describe_failure(
    err: DescribeElasticsearchDomainError,
) -> Result<DescribeOutcome, ProviderError> {
    if err.is_resource_not_found_exception() {
        Ok(DescribeOutcome::NotFound)
    } else {
        Err(provider_error(&err))
    }
}

fn provider_error<E: ProvideErrorMetadata + Display>(err: &E) -> ProviderError {
    ProviderError::new(
        err.code().unwrap_or("Unknown"),
        err.message()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string()),
    )
}

fn cluster_config(c: &ClusterConfigPayload) -> ElasticsearchClusterConfig {
    ElasticsearchClusterConfig::builder()
        .instance_type(EsPartitionInstanceType::from(c.instance_type.as_str()))
        .instance_count(c.instance_count)
        .dedicated_master_enabled(c.dedicated_master_enabled)
        .set_dedicated_master_type(
            c.dedicated_master_type
                .as_deref()
                .map(EsPartitionInstanceType::from),
        )
        .set_dedicated_master_count(c.dedicated_master_count)
        .zone_awareness_enabled(c.zone_awareness_enabled)
        .set_zone_awareness_config(c.zone_awareness_config.as_ref().map(|z| {
            ZoneAwarenessConfig::builder()
                .availability_zone_count(z.availability_zone_count)
                .build()
        }))
        .build()
}

fn ebs_options(e: &EbsOptionsPayload) -> EbsOptions {
    EbsOptions::builder()
        .ebs_enabled(e.ebs_enabled)
        .set_volume_type(e.volume_type.as_deref().map(VolumeType::from))
        .set_volume_size(e.volume_size)
        .build()
}

fn snapshot_options(s: &SnapshotOptionsPayload) -> SnapshotOptions {
    SnapshotOptions::builder()
        .automated_snapshot_start_hour(s.automated_snapshot_start_hour)
        .build()
}

fn vpc_options(v: &VpcOptionsPayload) -> VpcOptions {
    VpcOptions::builder()
        .set_subnet_ids(Some(v.subnet_ids.clone()))
        .set_security_group_ids(Some(v.security_group_ids.clone()))
        .build()
}

fn encryption_options(e: &EncryptionAtRestPayload) -> EncryptionAtRestOptions {
    EncryptionAtRestOptions::builder()
        .enabled(e.enabled)
        .set_kms_key_id(e.kms_key_id.clone())
        .build()
}

/// Map the SDK domain status onto [`ObservedDomainState`]. Conditional
/// groups are only populated when their flag is reported as enabled.
fn observed_from_status(name: &str, status: &ElasticsearchDomainStatus) -> ObservedDomainState {
    let cluster_config: Option<&ElasticsearchClusterConfig> =
        Option::from(status.elasticsearch_cluster_config());
    let cluster = cluster_config
        .map(|c| ClusterConfig {
            instance_type: c
                .instance_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            instance_count: c.instance_count().unwrap_or_default(),
            dedicated_master: c
                .dedicated_master_enabled()
                .unwrap_or(false)
                .then(|| DedicatedMaster {
                    instance_type: c.dedicated_master_type().map(|t| t.as_str().to_string()),
                    instance_count: c.dedicated_master_count(),
                }),
            zone_awareness: c.zone_awareness_enabled().unwrap_or(false).then(|| ZoneAwareness {
                availability_zone_count: c
                    .zone_awareness_config()
                    .and_then(|z| z.availability_zone_count()),
            }),
        })
        .unwrap_or(ClusterConfig {
            instance_type: String::new(),
            instance_count: 0,
            dedicated_master: None,
            zone_awareness: None,
        });

    let storage = StorageConfig {
        ebs: status
            .ebs_options()
            .filter(|e| e.ebs_enabled().unwrap_or(false))
            .map(|e| EbsVolume {
                volume_type: e.volume_type().map(|t| t.as_str().to_string()),
                volume_size: e.volume_size(),
            }),
    };

    let network = status.vpc_options().map(|v| NetworkConfig {
        subnet_ids: v.subnet_ids().to_vec(),
        security_group_ids: v.security_group_ids().to_vec(),
    });

    let encryption = status
        .encryption_at_rest_options()
        .filter(|e| e.enabled().unwrap_or(false))
        .map(|e| EncryptionConfig {
            kms_key_id: e.kms_key_id().map(str::to_string),
        });

    let domain_id: Option<&str> = Option::from(status.domain_id());
    let arn: Option<&str> = Option::from(status.arn());

    ObservedDomainState {
        name: name.to_string(),
        domain_id: domain_id.map(str::to_string),
        arn: arn.map(str::to_string),
        engine_version: status.elasticsearch_version().map(str::to_string),
        cluster,
        storage,
        network,
        encryption,
        snapshot_start_hour: status
            .snapshot_options()
            .and_then(|s| s.automated_snapshot_start_hour()),
        access_policies: status.access_policies().map(str::to_string),
        endpoint: status.endpoint().map(str::to_string),
        processing: status.processing().unwrap_or(false),
        created: status.created().unwrap_or(false),
        deleted: status.deleted().unwrap_or(false),
    }
}
