//! Id-keyed object storage.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::light::PointLight;
use crate::object::{ObjectId, SceneObject};

/// Owns every scene object and the id counter.
///
/// Iteration order is ascending by id (BTreeMap), so draw order is
/// deterministic across frames.
#[derive(Default)]
pub struct SceneStore {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u32,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object and returns a mutable handle to it.
    pub fn spawn(&mut self) -> &mut SceneObject {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, SceneObject::new(id));
        self.objects
            .get_mut(&id)
            .unwrap_or_else(|| unreachable!("object inserted above"))
    }

    /// Creates an object carrying a point light.
    pub fn spawn_point_light(
        &mut self,
        color: Vec3,
        intensity: f32,
        radius: f32,
    ) -> &mut SceneObject {
        let object = self.spawn();
        object.point_light = Some(PointLight {
            color,
            intensity,
            radius,
        });
        object
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut store = SceneStore::new();
        let a = store.spawn().id();
        let b = store.spawn().id();
        let c = store.spawn().id();
        assert!(a < b && b < c);
        assert_eq!(a.raw(), 0);
        assert_eq!(c.raw(), 2);
    }

    #[test]
    fn lookup_by_id() {
        let mut store = SceneStore::new();
        let id = store.spawn().id();
        assert!(store.get(id).is_some());
        assert_eq!(store.get(id).map(|o| o.id()), Some(id));
    }

    #[test]
    fn spawned_objects_have_no_capabilities() {
        let mut store = SceneStore::new();
        let object = store.spawn();
        assert!(!object.has_mesh());
        assert!(!object.has_light());
    }

    #[test]
    fn point_light_spawn_sets_attributes() {
        let mut store = SceneStore::new();
        let object = store.spawn_point_light(Vec3::new(1.0, 0.1, 0.1), 0.2, 0.1);
        assert!(object.has_light());
        let light = object.point_light.as_ref().map(|l| l.intensity);
        assert_eq!(light, Some(0.2));
    }

    #[test]
    fn iteration_is_id_ordered() {
        let mut store = SceneStore::new();
        for _ in 0..5 {
            store.spawn();
        }
        let ids: Vec<u32> = store.iter().map(|o| o.id().raw()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
