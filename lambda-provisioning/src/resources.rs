//! The resources a deployment is made of, and how each is named and specified.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::plane::{ResourceId, ResourceKind, ResourceSpec};
use crate::{execute_api_source_arn, ProvisioningContext};

/// Tag key every created resource carries.
pub const PROVISIONING_TAG_KEY: &str = "provisioning";

const MANAGED_POLICIES: &[&str] = &[
    "AmazonAPIGatewayInvokeFullAccess",
    "AmazonSNSFullAccess",
    "AWSLambdaFullAccess",
    "service-role/AWSLambdaBasicExecutionRole",
    "service-role/AWSLambdaSQSQueueExecutionRole",
    "service-role/AWSLambdaVPCAccessExecutionRole",
    "service-role/AmazonAPIGatewayPushToCloudWatchLogs",
];

/// A resource whose name and creation spec follow from the deployment context.
pub trait ManagedResource {
    /// What kind of resource this is.
    fn kind(&self) -> ResourceKind;

    /// The name the resource is created and found under.
    fn name(&self, ctx: &ProvisioningContext) -> String;

    /// Kind-specific creation settings.
    fn properties(&self, ctx: &ProvisioningContext) -> Value;

    /// The full creation request, tagged for teardown.
    fn spec(&self, ctx: &ProvisioningContext) -> ResourceSpec {
        let mut tags = BTreeMap::new();
        tags.insert(
            String::from(PROVISIONING_TAG_KEY),
            ctx.provisioning_tag.clone(),
        );
        ResourceSpec {
            kind: self.kind(),
            name: self.name(ctx),
            tags,
            properties: self.properties(ctx),
        }
    }
}

/// The IAM role both Lambda and API Gateway assume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionRole;

impl ExecutionRole {
    /// Lets both Lambda and API Gateway assume the role.
    pub fn assume_role_policy() -> Value {
        json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"Service": "lambda.amazonaws.com"},
                    "Action": "sts:AssumeRole"
                },
                {
                    "Effect": "Allow",
                    "Principal": {"Service": "apigateway.amazonaws.com"},
                    "Action": "sts:AssumeRole"
                }
            ]
        })
    }
}

impl ManagedResource for ExecutionRole {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ExecutionRole
    }

    fn name(&self, ctx: &ProvisioningContext) -> String {
        format!("lambdaExecutionRole_{}", ctx.app.name)
    }

    fn properties(&self, _: &ProvisioningContext) -> Value {
        let policies: Vec<String> = MANAGED_POLICIES
            .iter()
            .map(|policy| format!("arn:aws:iam::aws:policy/{}", policy))
            .collect();
        json!({
            "Path": "/",
            "AssumeRolePolicyDocument": ExecutionRole::assume_role_policy(),
            "Description": "Lambda and API Gateway permissions role",
            "MaxSessionDuration": 3600,
            "ManagedPolicyArns": policies,
        })
    }
}

/// The Lambda function running the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// ARN of the [`ExecutionRole`].
    pub role_arn: String,
    /// Location of the deployment package.
    pub code: String,
    /// Seconds.
    pub timeout: u32,
    /// Megabytes.
    pub memory_size: u32,
}

impl Function {
    /// A function with the default 3 second timeout and 128 MB of memory.
    pub fn new(role_arn: impl Into<String>, code: impl Into<String>) -> Self {
        Function {
            role_arn: role_arn.into(),
            code: code.into(),
            timeout: 3,
            memory_size: 128,
        }
    }

    /// The settings sent when only the deployment package changes. A new version is
    /// published, as on creation.
    pub fn code_update(&self) -> Value {
        json!({"Code": self.code, "Publish": true})
    }
}

impl ManagedResource for Function {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Function
    }

    fn name(&self, ctx: &ProvisioningContext) -> String {
        format!("lambda_{}", ctx.app.name)
    }

    fn properties(&self, ctx: &ProvisioningContext) -> Value {
        json!({
            "Runtime": ctx.app.lambda_runtime,
            "Role": self.role_arn,
            "Handler": "bootstrap",
            "Description": ctx.app.lambda_description,
            "Timeout": self.timeout,
            "MemorySize": self.memory_size,
            "Publish": true,
            "Code": self.code,
        })
    }
}

/// An HTTP API proxying every request to the function, with one auto-deployed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayApi {
    /// ARN of the [`Function`] requests are proxied to.
    pub function_arn: String,
}

impl GatewayApi {
    /// Proxies to `function_arn`.
    pub fn new(function_arn: impl Into<String>) -> Self {
        GatewayApi {
            function_arn: function_arn.into(),
        }
    }

    /// The integration URI API Gateway invokes the function through.
    pub fn integration_uri(&self, ctx: &ProvisioningContext) -> String {
        format!(
            "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
            ctx.region, self.function_arn
        )
    }
}

impl ManagedResource for GatewayApi {
    fn kind(&self) -> ResourceKind {
        ResourceKind::GatewayApi
    }

    fn name(&self, ctx: &ProvisioningContext) -> String {
        ctx.app.name.clone()
    }

    fn properties(&self, ctx: &ProvisioningContext) -> Value {
        json!({
            "ProtocolType": "HTTP",
            "Description": ctx.app.gateway_description,
            "Integration": {
                "IntegrationMethod": "POST",
                "IntegrationType": "AWS_PROXY",
                "IntegrationUri": self.integration_uri(ctx),
                "PayloadFormatVersion": "2.0",
            },
            "Stage": {
                "StageName": ctx.app.gateway_stage_name,
                "AutoDeploy": true,
            },
        })
    }
}

/// One route on a [`GatewayApi`]. A route without a method and path is the
/// `$default` catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The API the route belongs to.
    pub api_id: ResourceId,
    /// Method and path, the path without its leading slash.
    pub endpoint: Option<(String, String)>,
}

impl Route {
    /// A `{method} /{path}` route. `path` has no leading slash.
    pub fn new(api_id: ResourceId, method: impl Into<String>, path: impl Into<String>) -> Self {
        Route {
            api_id,
            endpoint: Some((method.into(), path.into())),
        }
    }

    /// The `$default` route.
    pub fn catch_all(api_id: ResourceId) -> Self {
        Route {
            api_id,
            endpoint: None,
        }
    }

    /// The API Gateway route key.
    pub fn route_key(&self) -> String {
        match &self.endpoint {
            Some((method, path)) => format!("{} /{}", method, path),
            None => String::from("$default"),
        }
    }
}

impl ManagedResource for Route {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Route
    }

    // Route keys are only unique within one API.
    fn name(&self, _: &ProvisioningContext) -> String {
        format!("{}/{}", self.api_id, self.route_key())
    }

    fn properties(&self, ctx: &ProvisioningContext) -> Value {
        json!({
            "ApiId": self.api_id,
            "RouteKey": self.route_key(),
            "AuthorizationType": "NONE",
            "Permission": {
                "Action": "lambda:InvokeFunction",
                "Principal": "apigateway.amazonaws.com",
                "SourceArn": execute_api_source_arn(ctx, &self.api_id.0, "$default", None),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;

    fn ctx() -> ProvisioningContext {
        ProvisioningContext {
            region: String::from("us-west-2"),
            account: String::from("123456789012"),
            provisioning_tag: String::from("demo-tag"),
            app: AppConfig::new("shop"),
        }
    }

    #[test]
    fn names_derive_from_the_app_name() {
        let ctx = ctx();
        assert_eq!(ExecutionRole.name(&ctx), "lambdaExecutionRole_shop");
        assert_eq!(Function::new("role", "pkg.zip").name(&ctx), "lambda_shop");
        assert_eq!(GatewayApi::new("fn").name(&ctx), "shop");
    }

    #[test]
    fn every_spec_is_tagged() {
        let spec = ExecutionRole.spec(&ctx());
        assert_eq!(spec.kind, ResourceKind::ExecutionRole);
        assert_eq!(spec.tags.get("provisioning").map(String::as_str), Some("demo-tag"));
        assert_eq!(
            spec.properties["AssumeRolePolicyDocument"]["Statement"][1]["Principal"]["Service"],
            "apigateway.amazonaws.com"
        );
        assert_eq!(
            spec.properties["ManagedPolicyArns"][3],
            "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
        );
    }

    #[test]
    fn route_keys() {
        let api = ResourceId::from("a1b2c3");
        assert_eq!(Route::new(api.clone(), "GET", "items/{id}").route_key(), "GET /items/{id}");
        let default = Route::catch_all(api);
        assert_eq!(default.route_key(), "$default");
        assert_eq!(default.name(&ctx()), "a1b2c3/$default");
    }

    #[test]
    fn gateway_integrates_with_the_function() {
        let ctx = ctx();
        let arn = "arn:aws:lambda:us-west-2:123456789012:function:lambda_shop";
        let spec = GatewayApi::new(arn).spec(&ctx);
        assert_eq!(
            spec.properties["Integration"]["IntegrationUri"],
            format!(
                "arn:aws:apigateway:us-west-2:lambda:path/2015-03-31/functions/{}/invocations",
                arn
            )
        );
        assert_eq!(spec.properties["Stage"]["StageName"], "$default");
    }

    #[test]
    fn function_uses_the_app_runtime() {
        let mut ctx = ctx();
        ctx.app.lambda_description = String::from("storefront");
        let spec = Function::new("arn:role", "target/lambda/shop.zip").spec(&ctx);
        assert_eq!(spec.properties["Runtime"], "provided.al2023");
        assert_eq!(spec.properties["Description"], "storefront");
        assert_eq!(spec.properties["Timeout"], 3);
    }
}
