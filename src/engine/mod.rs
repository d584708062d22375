//! The pipe rendering engine.
//!
//! Owns the GPU context, camera, depth target, pipe renderer, and the
//! [`PipeController`]. One [`PipeRenderEngine::render`] call runs a full
//! frame: advance the animation clock, run the controller's update cycle,
//! upload the packed vertices, and record the render pass. A skipped
//! controller frame leaves the GPU buffers at the previous frame's data.

use glam::{Quat, Vec3};
use web_time::Instant;

use crate::camera::{Camera, CameraUniform};
use crate::controller::PipeController;
use crate::error::PipeError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::DepthTexture;
use crate::options::Options;
use crate::renderer::pipe::PipeRenderer;
use crate::util::frame_timing::FrameTiming;

/// Target FPS limit
const TARGET_FPS: u32 = 300;

/// Orbit rate around the pipe axis, in degrees per second.
const ORBIT_DEGREES_PER_SEC: f32 = 20.0;

/// Background clear color.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

/// The core rendering engine for the animated pipe.
pub struct PipeRenderEngine {
    context: RenderContext,
    controller: PipeController,
    renderer: PipeRenderer,
    camera: Camera,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth: DepthTexture,
    timing: FrameTiming,
    started: Instant,
    options: Options,
    orbit_offset: Vec3,
}

impl PipeRenderEngine {
    /// Create the engine for the given window surface target.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::InvalidConfiguration`] for rejected options and
    /// [`PipeError::Gpu`] if GPU initialization fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, PipeError> {
        let controller = PipeController::new(&options)?;
        let context = RenderContext::new(window, size).await?;

        let bounds = controller.bounds();
        let aspect = size.0 as f32 / size.1.max(1) as f32;
        let camera = Camera::framing(bounds.center, bounds.radius, aspect);
        let orbit_offset = camera.eye - camera.target;

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update(&camera);

        let camera_buffer =
            context.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Camera Buffer"),
                size: size_of::<CameraUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        context.queue.write_buffer(
            &camera_buffer,
            0,
            bytemuck::bytes_of(&camera_uniform),
        );

        let camera_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            },
        );
        let camera_bind_group =
            context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera Bind Group"),
                layout: &camera_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                }],
            });

        let renderer = PipeRenderer::new(
            &context,
            &camera_layout,
            controller.vertices(),
            controller.indices(),
        );
        let depth = DepthTexture::new(&context.device, size.0, size.1);

        log::info!(
            "engine up: {} nodes, length {}, base radius {}",
            controller.node_count(),
            options.pipe.length,
            options.pipe.base_radius
        );

        Ok(Self {
            context,
            controller,
            renderer,
            camera,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            depth,
            timing: FrameTiming::new(TARGET_FPS),
            started: Instant::now(),
            options,
            orbit_offset,
        })
    }

    /// Handle a window resize: reconfigure the surface, recreate the depth
    /// target, and update the camera aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.depth = DepthTexture::new(&self.context.device, width, height);
        self.camera.aspect = width as f32 / height as f32;
    }

    /// Smoothed frames-per-second estimate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Run one frame: update, upload, draw, present.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] when the swapchain needs attention;
    /// the caller should resize on `Lost`/`Outdated` and shut down on
    /// `OutOfMemory`.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.timing.should_render() {
            return Ok(());
        }

        let clock = self.started.elapsed().as_secs_f32();
        if self.controller.update(clock) {
            self.renderer.update(
                &self.context.device,
                &self.context.queue,
                self.controller.vertices(),
                self.controller.indices(),
            );
        }

        self.update_camera(clock);

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.context.create_encoder();
        {
            let mut render_pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Pipe Render Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            depth_slice: None,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            self.renderer.draw(
                &mut render_pass,
                &self.camera_bind_group,
                &self.options.debug,
            );
        }

        self.context.submit(encoder);
        frame.present();
        self.timing.end_frame();
        Ok(())
    }

    /// Orbit the camera around the pipe axis and re-upload the uniform.
    /// Stands in for the original's constant model spin.
    fn update_camera(&mut self, clock: f32) {
        let bounds = self.controller.bounds();
        let angle = (ORBIT_DEGREES_PER_SEC * clock).to_radians();
        let spin = Quat::from_axis_angle(Vec3::Z, angle);

        self.camera.target = bounds.center;
        self.camera.eye = bounds.center + spin * self.orbit_offset;
        self.camera_uniform.update(&self.camera);
        self.context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }
}
