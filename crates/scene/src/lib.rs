//! Scene data for the Mocha engine.
//!
//! Renderable objects keyed by id, with optional shared geometry and
//! optional point-light attributes, plus the transform and camera math the
//! render passes consume. The store is plain data: all GPU work happens in
//! `mocha_renderer`.

mod camera;
mod light;
mod object;
mod store;
mod transform;

pub use camera::{Camera, Projection};
pub use light::PointLight;
pub use object::{ObjectId, SceneObject};
pub use store::SceneStore;
pub use transform::Transform;
