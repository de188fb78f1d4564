#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! Provisioning for functions fronted by the adapter: the execution role, the function,
//! an HTTP API proxying to it and its routes.
//!
//! Provider I/O sits behind [`ControlPlane`]. This crate decides names, tags and
//! creation settings, and makes `destroy` and [`teardown`] safe to repeat.

use serde::{Deserialize, Serialize};

pub use crate::plane::{ControlPlane, ControlPlaneError, ResourceId, ResourceKind, ResourceSpec};
pub use crate::provisioner::Provisioner;
pub use crate::resources::{
    ExecutionRole, Function, GatewayApi, ManagedResource, Route, PROVISIONING_TAG_KEY,
};
pub use crate::teardown::{teardown, TeardownTarget};

mod plane;
mod provisioner;
pub mod resources;
pub mod teardown;

/// Per-application settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Application name; every resource name derives from it.
    pub name: String,
    /// Description of the HTTP API.
    #[serde(default)]
    pub gateway_description: String,
    /// Name of the auto-deployed stage.
    #[serde(default = "default_stage_name")]
    pub gateway_stage_name: String,
    /// Lambda runtime identifier.
    #[serde(default = "default_runtime")]
    pub lambda_runtime: String,
    /// Description of the function.
    #[serde(default)]
    pub lambda_description: String,
}

fn default_stage_name() -> String {
    String::from("$default")
}

fn default_runtime() -> String {
    String::from("provided.al2023")
}

impl AppConfig {
    /// Settings for `name` with every other field defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        AppConfig {
            name: name.into(),
            gateway_description: String::new(),
            gateway_stage_name: default_stage_name(),
            lambda_runtime: default_runtime(),
            lambda_description: String::new(),
        }
    }
}

/// Where and for whom resources are provisioned. Passed to every operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningContext {
    /// AWS region, e.g. `us-east-1`.
    pub region: String,
    /// Twelve-digit account id.
    pub account: String,
    /// Value of the `provisioning` tag on everything created.
    pub provisioning_tag: String,
    /// The application.
    pub app: AppConfig,
}

/// The `SourceArn` that lets an HTTP API invoke the function.
///
/// ```
/// use lambda_provisioning::{execute_api_source_arn, AppConfig, ProvisioningContext};
///
/// let ctx = ProvisioningContext {
///     region: "us-east-1".into(),
///     account: "123456789012".into(),
///     provisioning_tag: "demo".into(),
///     app: AppConfig::new("shop"),
/// };
/// assert_eq!(
///     execute_api_source_arn(&ctx, "a1b2", "GET", Some("/items")),
///     "arn:aws:execute-api:us-east-1:123456789012:a1b2/*/GET/items"
/// );
/// ```
pub fn execute_api_source_arn(
    ctx: &ProvisioningContext,
    api_id: &str,
    method: &str,
    path_constraint: Option<&str>,
) -> String {
    format!(
        "arn:aws:execute-api:{}:{}:{}/*/{}{}",
        ctx.region,
        ctx.account,
        api_id,
        method,
        path_constraint.unwrap_or_default()
    )
}
