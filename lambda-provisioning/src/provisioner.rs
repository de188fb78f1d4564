use tracing::{debug, info};

use crate::plane::{ControlPlane, ControlPlaneError, ResourceId, ResourceKind};
use crate::resources::{Function, ManagedResource};
use crate::ProvisioningContext;

/// Creates, finds and destroys [`ManagedResource`]s on a [`ControlPlane`].
#[derive(Debug)]
pub struct Provisioner<P> {
    plane: P,
    ctx: ProvisioningContext,
}

impl<P: ControlPlane> Provisioner<P> {
    /// Provisions into `plane` for the deployment described by `ctx`.
    pub fn new(plane: P, ctx: ProvisioningContext) -> Self {
        Provisioner { plane, ctx }
    }

    /// The deployment context.
    pub fn context(&self) -> &ProvisioningContext {
        &self.ctx
    }

    /// The underlying control plane.
    pub fn plane(&self) -> &P {
        &self.plane
    }

    /// Gives the control plane back.
    pub fn into_plane(self) -> P {
        self.plane
    }

    /// Creates `resource`. Fails with [`ControlPlaneError::AlreadyExists`] if a resource
    /// of the same kind and name is already there.
    pub fn create<R: ManagedResource>(
        &mut self,
        resource: &R,
    ) -> Result<ResourceId, ControlPlaneError> {
        let spec = resource.spec(&self.ctx);
        if self.plane.find(spec.kind, &spec.name)?.is_some() {
            return Err(ControlPlaneError::AlreadyExists {
                kind: spec.kind,
                name: spec.name,
            });
        }
        let id = self.plane.create(&spec)?;
        info!(kind = %spec.kind, name = %spec.name, %id, "created");
        Ok(id)
    }

    /// Looks `resource` up by its derived name.
    pub fn find<R: ManagedResource>(
        &self,
        resource: &R,
    ) -> Result<Option<ResourceId>, ControlPlaneError> {
        self.plane
            .find(resource.kind(), &resource.name(&self.ctx))
    }

    /// Replaces the deployment package of an existing function and publishes a new
    /// version. Fails with [`ControlPlaneError::NotFound`] if the function is missing.
    pub fn update_code(&mut self, function: &Function) -> Result<ResourceId, ControlPlaneError> {
        let name = function.name(&self.ctx);
        let id = self
            .plane
            .find(ResourceKind::Function, &name)?
            .ok_or_else(|| ControlPlaneError::NotFound {
                kind: ResourceKind::Function,
                id: name.clone(),
            })?;
        self.plane
            .update(ResourceKind::Function, &id, &function.code_update())?;
        info!(%name, %id, code = %function.code, "updated function code");
        Ok(id)
    }

    /// Destroys `resource` if it exists. Returns whether anything was removed; a
    /// resource that is already gone is not an error.
    pub fn destroy<R: ManagedResource>(&mut self, resource: &R) -> Result<bool, ControlPlaneError> {
        let kind = resource.kind();
        let name = resource.name(&self.ctx);
        let id = match self.plane.find(kind, &name) {
            Ok(Some(id)) => id,
            Ok(None) | Err(ControlPlaneError::NotFound { .. }) => {
                debug!(%kind, %name, "nothing to destroy");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        match self.plane.destroy(kind, &id) {
            Ok(()) => {
                info!(%kind, %name, %id, "destroyed");
                Ok(true)
            }
            Err(ControlPlaneError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
