//! Mocha engine demo application.
//!
//! Spins up a window, the frame renderer, and the two built-in render
//! passes, then drives a small scene: two cubes and a floor under six
//! orbiting point lights, with a keyboard-controlled camera.

mod controller;
mod primitives;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Quat, Vec3};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use mocha_core::FrameTimer;
use mocha_platform::{InputState, Window};
use mocha_renderer::{
    FrameContext, FrameDescriptors, FrameRenderer, GeometryPass, GlobalUbo, PassSequence,
    PointLightPass,
};
use mocha_rhi::device::Device;
use mocha_rhi::mesh::Mesh;
use mocha_scene::{Camera, SceneStore};

use controller::KeyboardController;

const WINDOW_TITLE: &str = "Mocha Engine";
const SHADER_DIR: &str = "shaders/compiled";

/// Angular speed of the orbiting demo lights, radians per second.
const LIGHT_ORBIT_SPEED: f32 = 0.5;

/// Everything that lives for the lifetime of the window.
///
/// Field order is drop order: scene meshes, passes, and descriptors hold
/// `Arc<Device>` and must go before the renderer, which tears down the
/// device and instance; the winit window goes last.
struct Engine {
    scene: SceneStore,
    camera: Camera,
    controller: KeyboardController,
    passes: PassSequence,
    descriptors: FrameDescriptors,
    renderer: FrameRenderer,
    window: Window,
}

impl Engine {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let window = Window::new(event_loop, 800, 600, WINDOW_TITLE)?;
        let renderer = FrameRenderer::new(&window).context("renderer bring-up failed")?;
        let descriptors = FrameDescriptors::new(renderer.device())?;

        let shader_dir = Path::new(SHADER_DIR);
        let mut passes = PassSequence::new();
        passes.push(Box::new(GeometryPass::new(
            renderer.device(),
            renderer.render_pass(),
            descriptors.layout(),
            shader_dir,
        )?));
        passes.push(Box::new(PointLightPass::new(
            renderer.device(),
            renderer.render_pass(),
            descriptors.layout(),
            shader_dir,
        )?));

        let scene = build_scene(renderer.device())?;

        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, -2.5);

        info!(
            "Scene ready: {} objects, {} passes",
            scene.len(),
            passes.len()
        );

        Ok(Self {
            scene,
            camera,
            controller: KeyboardController::new(),
            passes,
            descriptors,
            renderer,
            window,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.window.resize(width, height);
    }

    fn render_frame(&mut self, input: &InputState, dt: f32) -> Result<()> {
        // The frame loop is the sole consumer of the window's resize
        // latch; resize events between frames coalesce into one forward.
        if self.window.take_resized() {
            self.renderer
                .resize(self.window.width(), self.window.height());
        }

        self.controller.update(input, dt, &mut self.camera);
        self.camera.set_aspect(self.renderer.aspect_ratio());

        // Scene animation happens before the frame context is built; the
        // scene is read-only from there on.
        let orbit = Quat::from_axis_angle(Vec3::NEG_Y, LIGHT_ORBIT_SPEED * dt);
        for object in self.scene.iter_mut() {
            if object.has_light() {
                object.transform.position = orbit * object.transform.position;
            }
        }

        let Some(cmd) = self.renderer.begin_frame()? else {
            // Stale swapchain or zero-area drawable; skip this frame.
            return Ok(());
        };

        let slot = self.renderer.current_slot();
        let ctx = FrameContext {
            slot,
            frame_time: dt,
            command_buffer: cmd,
            camera: &self.camera,
            global_set: self.descriptors.set(slot),
            scene: &self.scene,
        };

        let mut ubo = GlobalUbo {
            projection: self.camera.projection_matrix(),
            view: self.camera.view_matrix(),
            inverse_view: self.camera.inverse_view_matrix(),
            ..Default::default()
        };
        self.passes.update_all(&ctx, &mut ubo);
        self.descriptors.write(slot, &ubo)?;

        self.renderer.begin_render_pass(cmd);
        self.passes.record_all(&ctx);
        self.renderer.end_render_pass(cmd);
        self.renderer.end_frame()?;

        Ok(())
    }
}

/// Two cubes and a floor, plus six colored lights on a circle.
fn build_scene(device: Arc<Device>) -> Result<SceneStore> {
    let mut scene = SceneStore::new();

    let (vertices, indices) = primitives::cube(Vec3::splat(0.9));
    let cube_mesh = Arc::new(Mesh::new(device.clone(), &vertices, Some(&indices))?);

    let (vertices, indices) = primitives::plane(Vec3::splat(0.66));
    let floor_mesh = Arc::new(Mesh::new(device, &vertices, Some(&indices))?);

    let left_cube = scene.spawn();
    left_cube.transform.position = Vec3::new(-0.5, 0.3, 0.0);
    left_cube.transform.scale = Vec3::splat(0.4);
    left_cube.mesh = Some(cube_mesh.clone());

    let right_cube = scene.spawn();
    right_cube.transform.position = Vec3::new(0.5, 0.3, 0.0);
    right_cube.transform.scale = Vec3::splat(0.4);
    right_cube.mesh = Some(cube_mesh);

    let floor = scene.spawn();
    floor.transform.position = Vec3::new(0.0, 0.5, 0.0);
    floor.transform.scale = Vec3::new(3.0, 1.0, 3.0);
    floor.mesh = Some(floor_mesh);

    let light_colors = [
        Vec3::new(1.0, 0.1, 0.1),
        Vec3::new(0.1, 0.1, 1.0),
        Vec3::new(0.1, 1.0, 0.1),
        Vec3::new(1.0, 1.0, 0.1),
        Vec3::new(0.1, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ];
    for (i, color) in light_colors.into_iter().enumerate() {
        let angle = i as f32 * std::f32::consts::TAU / light_colors.len() as f32;
        let rotation = Quat::from_axis_angle(Vec3::NEG_Y, angle);
        let light = scene.spawn_point_light(color, 0.2, 0.1);
        light.transform.position = rotation * Vec3::new(-1.0, -1.0, -1.0);
    }

    Ok(scene)
}

struct App {
    engine: Option<Engine>,
    input: InputState,
    timer: FrameTimer,
}

impl App {
    fn new() -> Self {
        Self {
            engine: None,
            input: InputState::new(),
            timer: FrameTimer::new(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_none() {
            match Engine::new(event_loop) {
                Ok(engine) => {
                    info!("Initialization complete, entering main loop");
                    self.engine = Some(engine);
                }
                Err(e) => {
                    error!("Failed to initialize: {e:?}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut engine) = self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.timer.delta_secs();
                if let Some(ref mut engine) = self.engine
                    && let Err(e) = engine.render_frame(&self.input, dt)
                {
                    error!("Render error: {e:?}");
                    event_loop.exit();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::PhysicalKey;
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state.is_pressed() {
                        self.input.on_key_pressed(key);
                    } else {
                        self.input.on_key_released(key);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.begin_frame();
        if let Some(ref engine) = self.engine {
            engine.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    mocha_core::init_logging();
    info!("Starting {WINDOW_TITLE}");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
