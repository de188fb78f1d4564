//! The seam between provisioning logic and whatever talks to the cloud provider.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The kinds of resource a deployment is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// IAM role assumed by the function and the gateway.
    ExecutionRole,
    /// The Lambda function.
    Function,
    /// An HTTP API (API Gateway v2), with its integration and stage.
    GatewayApi,
    /// A REST API (API Gateway v1). Only ever torn down.
    RestApi,
    /// One route on an HTTP API.
    Route,
}

impl ResourceKind {
    /// The provider service that owns this kind, as used in teardown reports.
    pub fn service(self) -> &'static str {
        match self {
            ResourceKind::ExecutionRole => "iam",
            ResourceKind::Function => "lambda",
            ResourceKind::GatewayApi | ResourceKind::Route => "apigatewayv2",
            ResourceKind::RestApi => "apigateway",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier the control plane hands back: an ARN, API id or route id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId(id.to_owned())
    }
}

/// Everything needed to create one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// What is being created.
    pub kind: ResourceKind,
    /// Name unique within `kind`; the handle `find` looks resources up by.
    pub name: String,
    /// Tags attached at creation time.
    pub tags: BTreeMap<String, String>,
    /// Kind-specific settings, in the provider's own field names.
    pub properties: Value,
}

/// Failures reported by a [`ControlPlane`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// The resource does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind looked for.
        kind: ResourceKind,
        /// Name or id looked for.
        id: String,
    },
    /// A resource with this name already exists.
    #[error("{kind} {name} already exists")]
    AlreadyExists {
        /// Kind being created.
        kind: ResourceKind,
        /// The clashing name.
        name: String,
    },
    /// Any other provider failure.
    #[error("control plane error: {0}")]
    Service(String),
}

/// Create, look up and delete provider resources.
///
/// Implementations do the I/O. Naming, tagging and idempotency live in
/// [`Provisioner`](crate::Provisioner).
pub trait ControlPlane {
    /// Creates the resource and returns its identifier.
    fn create(&mut self, spec: &ResourceSpec) -> Result<ResourceId, ControlPlaneError>;

    /// Looks a resource up by name.
    fn find(&self, kind: ResourceKind, name: &str)
        -> Result<Option<ResourceId>, ControlPlaneError>;

    /// Changes settings of an existing resource. `changes` uses the field names of
    /// [`ResourceSpec::properties`].
    fn update(
        &mut self,
        kind: ResourceKind,
        id: &ResourceId,
        changes: &Value,
    ) -> Result<(), ControlPlaneError>;

    /// Deletes a resource, along with anything it owns. A role's attached policies are
    /// detached first.
    fn destroy(&mut self, kind: ResourceKind, id: &ResourceId) -> Result<(), ControlPlaneError>;
}

impl<P: ControlPlane + ?Sized> ControlPlane for &mut P {
    fn create(&mut self, spec: &ResourceSpec) -> Result<ResourceId, ControlPlaneError> {
        (**self).create(spec)
    }

    fn find(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<ResourceId>, ControlPlaneError> {
        (**self).find(kind, name)
    }

    fn update(
        &mut self,
        kind: ResourceKind,
        id: &ResourceId,
        changes: &Value,
    ) -> Result<(), ControlPlaneError> {
        (**self).update(kind, id, changes)
    }

    fn destroy(&mut self, kind: ResourceKind, id: &ResourceId) -> Result<(), ControlPlaneError> {
        (**self).destroy(kind, id)
    }
}
