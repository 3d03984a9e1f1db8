//! esdomain: declarative provisioning of a managed Elasticsearch domain.
//!
//! A run normalizes caller parameters into a [`DesiredDomainSpec`], reads
//! the live domain through a [`CloudResourceClient`], and issues at most one
//! create or update to converge it.

pub mod clients;
pub mod diff;
pub mod error;
pub mod observed;
pub mod params;
pub mod policy;
pub mod reconciler;
pub mod request;
pub mod spec;

pub use clients::{CloudResourceClient, DescribeOutcome};
pub use error::{
    ConnectionError, ParamsFileError, PolicyError, ProviderError, ReconcileError,
    ValidationError,
};
pub use observed::ObservedDomainState;
pub use params::RawParams;
pub use reconciler::{Action, DomainReconciler, ReconcileMode, ReconcileResult, Reconciler};
pub use spec::{normalize, DesiredDomainSpec};
