use crate::clock::FrameClock;
use crate::input_map;
use airdrag_accum::FrameReport;
use airdrag_assets::Mesh;
use airdrag_camera::{Camera, CameraSettings};
use airdrag_input::{InputEvent, InputRouter, Toggle};
use airdrag_render_wgpu::{DragRenderer, FrameView, ViewSettings, required_features};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window, WindowId};

/// Startup options taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct ViewerOptions {
    pub width: u32,
    pub height: u32,
    /// Exit after this many ticks.
    pub max_frames: Option<u64>,
}

/// Window, device and renderer. Created on the first `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: DragRenderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        options: &ViewerOptions,
        mesh: &Mesh,
        settings: ViewSettings,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(format!("airfoil {}", mesh.name))
            .with_inner_size(PhysicalSize::new(options.width, options.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let features = required_features(&adapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("airdrag_device"),
                required_features: features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = DragRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            mesh,
            settings,
        )?;

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            wireframe = renderer.supports_wireframe(),
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

pub struct ViewerApp {
    mesh: Mesh,
    options: ViewerOptions,
    view_settings: ViewSettings,
    camera: Camera,
    router: InputRouter,
    clock: FrameClock,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(mesh: Mesh, options: ViewerOptions) -> Self {
        Self {
            mesh,
            options,
            view_settings: ViewSettings::default(),
            camera: Camera::new(),
            router: InputRouter::new(CameraSettings::default(), options.width, options.height),
            clock: FrameClock::new(std::time::Instant::now()),
            gpu: None,
            fatal: None,
        }
    }

    /// The error that stopped the loop, if any.
    pub fn into_result(self) -> Result<()> {
        match self.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }

    fn route(&mut self, event: InputEvent) {
        if let Some(toggle) = self.router.handle(event, &mut self.camera) {
            self.apply_toggle(toggle);
        }
    }

    fn apply_toggle(&mut self, toggle: Toggle) {
        match toggle {
            Toggle::Wireframe(on) => {
                let supported = self
                    .gpu
                    .as_ref()
                    .is_some_and(|gpu| gpu.renderer.supports_wireframe());
                if on && !supported {
                    tracing::warn!("wireframe requested but the adapter cannot draw lines");
                } else {
                    tracing::debug!(wireframe = on, "polygon mode toggled");
                }
            }
            Toggle::Capture(on) => {
                let Some(gpu) = &self.gpu else { return };
                let grab = if on {
                    gpu.window
                        .set_cursor_grab(CursorGrabMode::Locked)
                        .or_else(|_| gpu.window.set_cursor_grab(CursorGrabMode::Confined))
                } else {
                    gpu.window.set_cursor_grab(CursorGrabMode::None)
                };
                if let Err(e) = grab {
                    tracing::warn!("cursor grab not available: {e}");
                }
                gpu.window.set_cursor_visible(!on);
                tracing::debug!(captured = on, "mouse capture toggled");
            }
        }
    }

    fn frame_limit_reached(&self) -> bool {
        self.options
            .max_frames
            .is_some_and(|max| self.clock.frames() >= max)
    }

    /// One loop tick: clock first, then camera integration.
    fn advance(&mut self) {
        let dt = self.clock.tick();
        self.camera.update();
        tracing::trace!(
            tick = self.clock.frames(),
            dt_us = dt.as_micros() as u64,
            "tick"
        );
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.gpu.is_none() {
            return Ok(());
        }
        // The camera advances every tick, including ticks whose frame is
        // dropped below.
        self.advance();
        let Some(gpu) = &mut self.gpu else {
            return Ok(());
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface acquire timed out; skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("failed to acquire surface texture"),
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let frame = FrameView {
            view: self.camera.view_matrix(),
            projection: gpu.renderer.settings().projection(gpu.aspect()),
            flow: self.camera.forward(),
        };
        let report = gpu.renderer.render_frame(
            &gpu.device,
            &gpu.queue,
            &target,
            &frame,
            self.router.wireframe(),
        )?;
        output.present();

        emit(&report)?;

        if self.frame_limit_reached() {
            tracing::info!(
                frames = self.clock.frames(),
                elapsed = ?self.clock.elapsed(),
                "frame limit reached"
            );
            event_loop.exit();
        }
        Ok(())
    }
}

pub fn emit(report: &FrameReport) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "{report}")?;
    out.flush()?;
    Ok(())
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.fatal.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.options, &self.mesh, self.view_settings) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.gpu = Some(gpu);
                self.route(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.fatal.is_some() {
            return;
        }

        if let Some(input) = input_map::window_event(&event) {
            self.route(input);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(input) = input_map::device_event(&event) {
            self.route(input);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrag_input::Key;
    use glam::Vec3;

    fn app(max_frames: Option<u64>) -> ViewerApp {
        let mesh = Mesh {
            name: "empty".into(),
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        };
        ViewerApp::new(
            mesh,
            ViewerOptions {
                width: 800,
                height: 600,
                max_frames,
            },
        )
    }

    #[test]
    fn key_edges_reach_the_camera_without_a_window() {
        let mut app = app(None);
        app.route(InputEvent::press(Key::W));
        app.camera.update();
        assert!(app.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.2), 1e-6));
        app.route(InputEvent::release(Key::W));
        assert_eq!(app.camera.velocity, Vec3::ZERO);
    }

    #[test]
    fn toggles_without_a_window_only_flip_state() {
        let mut app = app(None);
        app.route(InputEvent::press(Key::P));
        app.route(InputEvent::press(Key::Space));
        assert!(app.router.wireframe());
        assert!(app.router.captured());
    }

    #[test]
    fn frame_limit_counts_ticks() {
        assert!(!app(None).frame_limit_reached());
        let mut app = app(Some(2));
        assert!(!app.frame_limit_reached());
        app.advance();
        assert!(!app.frame_limit_reached());
        app.advance();
        assert!(app.frame_limit_reached());
    }

    #[test]
    fn every_tick_integrates_the_camera() {
        let mut app = app(None);
        app.route(InputEvent::press(Key::W));
        for _ in 0..3 {
            app.advance();
        }
        assert_eq!(app.clock.frames(), 3);
        assert!(app.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.6), 1e-5));
    }

    #[test]
    fn clean_exit_returns_ok() {
        assert!(app(None).into_result().is_ok());
    }
}
