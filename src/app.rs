// src/app.rs

use std::sync::Arc;
use std::time::Duration;

use winit::{dpi::PhysicalSize, event::WindowEvent, window::Window};

use crate::editor_state::EditorState;
use crate::ui::build_ui;

/// Window surface plus the device that draws into it.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
}

impl Gpu {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .expect("window surface is required to draw the map");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("no GPU adapter can present to the window");
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("map editor device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .expect("GPU device request failed");

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("surface configured as {format:?} at {}x{}", size.width, size.height);

        Self { surface, device, queue, surface_config }
    }

    fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
    }
}

pub struct MapEditorApp {
    gpu: Gpu,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    editor: EditorState,
    repaint_requested: bool,
}

impl MapEditorApp {
    pub async fn new(window: Arc<Window>) -> Self {
        let gpu = Gpu::new(window.clone()).await;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.surface_config.format, None, 1);

        let editor = EditorState::open(map_polygon_editor::EditorConfig::load());
        egui_ctx.set_visuals(if editor.preferences.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        Self {
            gpu,
            egui_ctx,
            egui_state,
            egui_renderer,
            editor,
            repaint_requested: true,
        }
    }

    pub fn get_size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.reconfigure(new_size);
    }

    /// egui asked for another frame straight away (animations, pending input).
    pub fn wants_repaint(&self) -> bool {
        self.repaint_requested
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;

        let raw_input = self.egui_state.take_egui_input(window);
        let editor = &mut self.editor;
        let output = self.egui_ctx.run(raw_input, |ctx| build_ui(ctx, editor));
        self.repaint_requested = output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| viewport.repaint_delay == Duration::ZERO);
        self.egui_state.handle_platform_output(window, output.platform_output);

        let Gpu { device, queue, surface_config, .. } = &self.gpu;
        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [surface_config.width, surface_config.height],
            pixels_per_point: output.pixels_per_point,
        };
        for (id, delta) in &output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("map editor frame"),
        });
        let commands =
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &primitives, &screen);

        let target = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.editor.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer.render(&mut pass, &primitives, &screen);
        }
        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }

    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        window: &Window,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Last chance to write anything the store could not persist earlier.
    pub fn shutdown(&mut self) {
        self.editor.flush_on_exit();
    }
}
