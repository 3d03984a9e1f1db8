//! esdomain: converge an Elasticsearch Service domain onto a desired spec.
//!
//! Parameters come from an optional JSON params file, overridden by flags.
//! The result is printed to stdout as a single JSON document; logs go to
//! stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use esdomain::clients::{AwsConnection, AwsDomainClient};
use esdomain::{normalize, DomainReconciler, RawParams, ReconcileMode, Reconciler};

/// esdomain - Elasticsearch domain reconciler
#[derive(Parser, Debug)]
#[command(name = "esdomain", version, about)]
struct Args {
    /// JSON file with domain parameters (flags override its values)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Domain name
    #[arg(long)]
    name: Option<String>,

    /// Data node instance type (e.g. m3.medium.elasticsearch)
    #[arg(long)]
    instance_type: Option<String>,

    /// Number of data nodes
    #[arg(long)]
    instance_count: Option<i64>,

    /// Enable dedicated master nodes
    #[arg(long)]
    dedicated_master: Option<bool>,

    /// Instance type for dedicated master nodes
    #[arg(long)]
    dedicated_master_instance_type: Option<String>,

    /// Number of dedicated master nodes
    #[arg(long)]
    dedicated_master_instance_count: Option<i64>,

    /// Enable zone awareness
    #[arg(long)]
    zone_awareness: Option<bool>,

    /// Availability zones to spread nodes across when zone awareness is on
    #[arg(long)]
    availability_zone_count: Option<i64>,

    /// Enable EBS-backed storage
    #[arg(long)]
    ebs: Option<bool>,

    /// EBS volume type (standard, gp2, io1)
    #[arg(long)]
    volume_type: Option<String>,

    /// EBS volume size in GiB
    #[arg(long)]
    volume_size: Option<i64>,

    /// Hour (0-23, UTC) of the daily automated snapshot
    #[arg(long)]
    snapshot_hour: Option<i64>,

    /// Access policy as a JSON document
    #[arg(long)]
    access_policies: Option<String>,

    /// Elasticsearch version for new domains
    #[arg(long)]
    elasticsearch_version: Option<String>,

    /// Comma-separated VPC subnet ids
    #[arg(long)]
    vpc_subnets: Option<String>,

    /// Comma-separated VPC security group ids
    #[arg(long)]
    vpc_security_groups: Option<String>,

    /// Enable encryption at rest (only applied on creation)
    #[arg(long)]
    encryption_at_rest: Option<bool>,

    /// KMS key for encryption at rest
    #[arg(long)]
    kms_key_id: Option<String>,

    /// AWS region
    #[arg(long, alias = "aws-region", alias = "ec2-region")]
    region: Option<String>,

    /// Override the service endpoint URL
    #[arg(long)]
    endpoint_url: Option<String>,

    /// AWS access key id
    #[arg(long, alias = "ec2-access-key")]
    aws_access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, alias = "ec2-secret-key")]
    aws_secret_key: Option<String>,

    /// Report what would change without creating or updating anything
    #[arg(long)]
    check: bool,
}

impl Args {
    fn raw_params(&self) -> Result<RawParams> {
        let mut raw = match &self.params {
            Some(path) => RawParams::from_file(path)?,
            None => RawParams::new(),
        };
        raw.set_opt("name", self.name.clone());
        raw.set_opt("instance_type", self.instance_type.clone());
        raw.set_opt("instance_count", self.instance_count);
        raw.set_opt("dedicated_master", self.dedicated_master);
        raw.set_opt(
            "dedicated_master_instance_type",
            self.dedicated_master_instance_type.clone(),
        );
        raw.set_opt(
            "dedicated_master_instance_count",
            self.dedicated_master_instance_count,
        );
        raw.set_opt("zone_awareness", self.zone_awareness);
        raw.set_opt("availability_zone_count", self.availability_zone_count);
        raw.set_opt("ebs", self.ebs);
        raw.set_opt("volume_type", self.volume_type.clone());
        raw.set_opt("volume_size", self.volume_size);
        raw.set_opt("snapshot_hour", self.snapshot_hour);
        raw.set_opt("access_policies", self.access_policies.clone());
        raw.set_opt("elasticsearch_version", self.elasticsearch_version.clone());
        raw.set_opt("vpc_subnets", self.vpc_subnets.clone());
        raw.set_opt("vpc_security_groups", self.vpc_security_groups.clone());
        raw.set_opt("encryption_at_rest_enabled", self.encryption_at_rest);
        raw.set_opt("kms_key_id", self.kms_key_id.clone());
        Ok(raw)
    }

    fn connection(&self) -> AwsConnection {
        AwsConnection {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            access_key: self.aws_access_key.clone(),
            secret_key: self.aws_secret_key.clone(),
        }
    }
}

fn emit(doc: &Value) {
    match serde_json::to_string_pretty(doc) {
        Ok(s) => println!("{}", s),
        Err(e) => error!("Failed to encode result: {}", e),
    }
}

fn fail(msg: impl std::fmt::Display) -> ExitCode {
    emit(&json!({ "failed": true, "changed": false, "msg": msg.to_string() }));
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the result document
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "esdomain=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = match args.raw_params() {
        Ok(raw) => raw,
        Err(e) => return fail(format!("{:#}", e)),
    };
    let spec = match normalize(&raw) {
        Ok(spec) => spec,
        Err(e) => return fail(e),
    };

    let mode = if args.check {
        ReconcileMode::Check
    } else {
        ReconcileMode::Apply
    };
    info!(domain = %spec.name, ?mode, "Starting esdomain");

    let client = match AwsDomainClient::connect(&args.connection()).await {
        Ok(client) => client,
        Err(e) => return fail(e),
    };
    let reconciler = DomainReconciler::new(Arc::new(client)).with_mode(mode);
    let result = reconciler.reconcile(&spec).await;

    if let Some(msg) = &result.error_message {
        emit(&json!({
            "failed": true,
            "changed": result.changed,
            "msg": msg,
            "drift": result.drift,
        }));
        return ExitCode::FAILURE;
    }

    match serde_json::to_value(&result) {
        Ok(doc) => {
            emit(&doc);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
