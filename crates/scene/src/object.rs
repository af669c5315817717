//! Renderable scene objects.

use std::sync::Arc;

use mocha_rhi::mesh::Mesh;

use crate::light::PointLight;
use crate::transform::Transform;

/// Stable object identifier, issued by the [`SceneStore`].
///
/// [`SceneStore`]: crate::SceneStore
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A scene object: a transform plus optional capabilities.
///
/// Geometry is shared, reference-counted GPU data; an object without a
/// mesh is skipped by the geometry pass, and an object without a light is
/// skipped by the light pass. Both may be present on the same object.
pub struct SceneObject {
    id: ObjectId,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
    pub point_light: Option<PointLight>,
}

impl SceneObject {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self {
            id,
            transform: Transform::default(),
            mesh: None,
            point_light: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn has_light(&self) -> bool {
        self.point_light.is_some()
    }
}
