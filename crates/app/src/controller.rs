//! Keyboard camera controller.

use glam::{EulerRot, Quat, Vec3};

use mocha_platform::{InputState, KeyCode};
use mocha_scene::Camera;

/// Maximum pitch in radians, just shy of straight up/down.
const PITCH_LIMIT: f32 = 1.5;

/// WASD + QE movement with arrow-key look, scaled by frame time.
///
/// Movement is planar: forward/back and strafing ignore pitch, Q/E move
/// along world up (-Y, this engine's world is Y-down).
pub struct KeyboardController {
    pub move_speed: f32,
    pub look_speed: f32,
    yaw: f32,
    pitch: f32,
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 1.5,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one frame of input to `camera`.
    pub fn update(&mut self, input: &InputState, dt: f32, camera: &mut Camera) {
        let mut look = glam::Vec2::ZERO;
        if input.is_key_pressed(KeyCode::ArrowLeft) {
            look.x -= 1.0;
        }
        if input.is_key_pressed(KeyCode::ArrowRight) {
            look.x += 1.0;
        }
        if input.is_key_pressed(KeyCode::ArrowUp) {
            look.y += 1.0;
        }
        if input.is_key_pressed(KeyCode::ArrowDown) {
            look.y -= 1.0;
        }

        if look != glam::Vec2::ZERO {
            self.yaw += look.x * self.look_speed * dt;
            self.pitch = (self.pitch + look.y * self.look_speed * dt)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        camera.rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);

        let mut forward = camera.forward();
        forward.y = 0.0;
        let forward = forward.normalize_or_zero();
        let right = camera.right();

        let mut movement = Vec3::ZERO;
        if input.is_key_pressed(KeyCode::KeyW) {
            movement += forward;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            movement -= forward;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            movement += right;
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            movement -= right;
        }
        if input.is_key_pressed(KeyCode::KeyE) {
            movement += Vec3::NEG_Y;
        }
        if input.is_key_pressed(KeyCode::KeyQ) {
            movement += Vec3::Y;
        }

        if movement != Vec3::ZERO {
            camera.position += movement.normalize() * self.move_speed * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_input_leaves_camera_alone() {
        let mut controller = KeyboardController::new();
        let mut camera = Camera::new();
        let before = camera.position;
        controller.update(&InputState::new(), 0.016, &mut camera);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut controller = KeyboardController::new();
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyW);

        controller.update(&input, 1.0, &mut camera);

        // Default orientation looks down -Z at move_speed per second.
        assert!((camera.position.z + controller.move_speed).abs() < 1e-5);
        assert!(camera.position.x.abs() < 1e-5);
    }

    #[test]
    fn e_moves_up_in_y_down_world() {
        let mut controller = KeyboardController::new();
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyE);

        controller.update(&input, 1.0, &mut camera);
        assert!(camera.position.y < 0.0);
    }

    #[test]
    fn pitch_clamps_at_the_limit() {
        let mut controller = KeyboardController::new();
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::ArrowUp);

        // Far more look time than the limit allows.
        for _ in 0..100 {
            controller.update(&input, 0.1, &mut camera);
        }

        let forward = camera.forward();
        // Never looks past straight up.
        assert!(forward.length() > 0.0);
        assert!(controller.pitch <= PITCH_LIMIT + 1e-6);
    }

    #[test]
    fn movement_stays_planar_while_pitched() {
        let mut controller = KeyboardController::new();
        let mut camera = Camera::new();

        let mut look = InputState::new();
        look.on_key_pressed(KeyCode::ArrowUp);
        controller.update(&look, 0.5, &mut camera);

        let y_before = camera.position.y;
        let mut walk = InputState::new();
        walk.on_key_pressed(KeyCode::KeyW);
        controller.update(&walk, 1.0, &mut camera);

        assert!((camera.position.y - y_before).abs() < 1e-5);
    }
}
