//! Removing everything carrying a provisioning tag, given the tagged ARNs.

use regex::Regex;
use tracing::debug;

use crate::plane::{ControlPlane, ControlPlaneError, ResourceId, ResourceKind};

/// A tagged resource that [`teardown`] knows how to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownTarget {
    /// An API Gateway REST API, by id.
    RestApi(String),
    /// A Lambda function, by name.
    Function(String),
    /// An IAM role, by name.
    Role(String),
}

impl TeardownTarget {
    /// Classifies an ARN in `region`. ARNs from other regions or services give `None`.
    /// IAM is global, so role ARNs match in every region; a role path is not part of
    /// the name.
    pub fn from_arn(region: &str, arn: &str) -> Option<Self> {
        let role = Regex::new(r"^arn:aws:iam::\d*:role/(?:.*/)?([^/]+)$").ok()?;
        if let Some(caps) = role.captures(arn) {
            return Some(TeardownTarget::Role(caps[1].to_owned()));
        }
        let region = regex::escape(region);
        let rest_api =
            Regex::new(&format!(r"^arn:aws:apigateway:{}::/restapis/(.*)$", region)).ok()?;
        if let Some(caps) = rest_api.captures(arn) {
            return Some(TeardownTarget::RestApi(caps[1].to_owned()));
        }
        let function =
            Regex::new(&format!(r"^arn:aws:lambda:{}:\d*:function:(.*)$", region)).ok()?;
        function
            .captures(arn)
            .map(|caps| TeardownTarget::Function(caps[1].to_owned()))
    }

    /// The control-plane kind to destroy.
    pub fn kind(&self) -> ResourceKind {
        match self {
            TeardownTarget::RestApi(_) => ResourceKind::RestApi,
            TeardownTarget::Function(_) => ResourceKind::Function,
            TeardownTarget::Role(_) => ResourceKind::ExecutionRole,
        }
    }

    /// The id or name to destroy.
    pub fn id(&self) -> ResourceId {
        match self {
            TeardownTarget::RestApi(id)
            | TeardownTarget::Function(id)
            | TeardownTarget::Role(id) => ResourceId(id.clone()),
        }
    }

    /// The `"{service} -> {id}"` report line.
    pub fn wipeout(&self) -> String {
        format!("{} -> {}", self.kind().service(), self.id())
    }
}

/// Destroys every ARN in `arns` that [`TeardownTarget::from_arn`] recognizes. Targets that
/// are already gone count as removed. Returns one report line per recognized ARN.
pub fn teardown<P, I, S>(
    plane: &mut P,
    region: &str,
    arns: I,
) -> Result<Vec<String>, ControlPlaneError>
where
    P: ControlPlane + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut wipeouts = Vec::new();
    for arn in arns {
        let arn = arn.as_ref();
        let target = match TeardownTarget::from_arn(region, arn) {
            Some(target) => target,
            None => {
                debug!(arn, "skipping unrecognized ARN");
                continue;
            }
        };
        match plane.destroy(target.kind(), &target.id()) {
            Ok(()) | Err(ControlPlaneError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        wipeouts.push(target.wipeout());
    }
    Ok(wipeouts)
}
