use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::error::{QuadviewError, Result};
use crate::gfx::{
    gizmos::{Manipulator, TransformGizmo},
    rendering::SceneRenderer,
    scene::{Model, Transform},
    RenderEngine,
};
use crate::timing::FramePacer;
use crate::viewport::{Compositor, PointerState, ViewportLayout, ViewportRegistry};

/// Four-viewport application: one window, one shared transform, one gizmo
pub struct QuadviewApp {
    config: AppConfig,
}

/// GPU state created once the window exists. Field order is drop order.
struct GpuState {
    registry: ViewportRegistry,
    layout_size: (u32, u32),
    model: Model,
    scene_renderer: SceneRenderer,
    compositor: Compositor,
    engine: RenderEngine,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    transform: Transform,
    gizmo: TransformGizmo,
    pointer: PointerState,
    pacer: FramePacer,
    active: Option<usize>,
    error: Option<QuadviewError>,
}

impl QuadviewApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Runs the event loop until the window closes.
    ///
    /// Returns the startup error if the window, GPU, assets or viewport
    /// targets could not be created.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = AppState::new(self.config);
        event_loop.run_app(&mut state)?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl GpuState {
    fn create(config: &AppConfig, window: Arc<Window>) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let mut engine = pollster::block_on(RenderEngine::new(window, width, height))?;

        let model = Model::load(
            engine.device(),
            engine.queue(),
            &config.model_file(),
            &config.texture_file(),
        )?;

        let sample_count = engine.resolve_sample_count(config.msaa_samples);
        let scene_renderer = SceneRenderer::new(&mut engine, &model, sample_count)?;
        let compositor = Compositor::new(&mut engine)?;

        let specs = ViewportLayout::specs(config, (width, height))?;
        let registry = ViewportRegistry::new(
            engine.device(),
            specs,
            &scene_renderer,
            &compositor,
            RenderEngine::TARGET_FORMAT,
            config.target_scale,
        )?;

        let stats = engine.pipeline_manager.get_stats();
        log::debug!(
            "{} pipelines built from {} shaders ({} pending)",
            stats.total_pipelines,
            stats.loaded_shaders,
            stats.pending_pipelines
        );

        Ok(Self {
            registry,
            layout_size: (width, height),
            model,
            scene_renderer,
            compositor,
            engine,
        })
    }

    /// Lays the viewports out again for a new window size and reallocates
    /// their targets. Zero-sized or unchanged sizes are ignored.
    fn rebuild_viewports(&mut self, config: &AppConfig, size: (u32, u32)) -> Result<()> {
        if size.0 == 0 || size.1 == 0 || size == self.layout_size {
            return Ok(());
        }

        self.registry.release();
        let specs = ViewportLayout::specs(config, size)?;
        self.registry = ViewportRegistry::new(
            self.engine.device(),
            specs,
            &self.scene_renderer,
            &self.compositor,
            RenderEngine::TARGET_FORMAT,
            config.target_scale,
        )?;
        log::info!(
            "viewports rebuilt for {}x{} (was {}x{})",
            size.0,
            size.1,
            self.layout_size.0,
            self.layout_size.1
        );
        self.layout_size = size;
        Ok(())
    }

    /// Releases targets, then the model, then the device and surface
    fn shutdown(self) {
        let GpuState {
            mut registry,
            layout_size: _,
            model,
            scene_renderer,
            compositor,
            engine,
        } = self;

        registry.release();
        drop(registry);
        model.unload();
        drop(scene_renderer);
        drop(compositor);
        drop(engine);
        log::info!("GPU resources released");
    }
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        let gizmo = TransformGizmo::new(config.gizmo_size);
        let pacer = FramePacer::new(config.target_fps, Instant::now());
        Self {
            config,
            window: None,
            gpu: None,
            transform: Transform::IDENTITY,
            gizmo,
            pointer: PointerState::new(),
            pacer,
            active: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: QuadviewError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.config.window_size;
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        log::info!("window '{}' created ({}x{})", self.config.title, size.width, size.height);

        let gpu = GpuState::create(&self.config, window.clone())?;
        self.gpu = Some(gpu);
        self.pacer = FramePacer::new(self.config.target_fps, Instant::now());
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Renders every viewport into its target and composites it into the
    /// window. Returns `false` when the frame was skipped.
    fn render_frame(&mut self) -> Result<bool> {
        let AppState {
            config,
            gpu,
            transform,
            gizmo,
            pointer,
            active,
            ..
        } = self;
        let Some(gpu) = gpu.as_mut() else {
            return Ok(false);
        };
        let Some(mut frame) = gpu.engine.begin_frame()? else {
            return Ok(false);
        };

        let selected = gpu.registry.select_active(pointer.window_position());
        if selected != *active {
            log::debug!("active viewport {:?} -> {:?}", active, selected);
            *active = selected;
        }

        gpu.compositor
            .clear(&mut frame.encoder, &frame.view, config.background.to_wgpu());

        let surface_size = gpu.engine.surface_size();
        for (index, viewport) in gpu.registry.iter_mut().enumerate() {
            viewport.update_scene(gpu.engine.queue(), transform);

            let is_active = selected == Some(index);
            if is_active {
                let view = viewport.gizmo_view();
                let handles = {
                    let remapped = pointer.remap(&viewport.rect, viewport.target_size());
                    gizmo.draw(config.gizmo_mode, transform, &remapped, &view)
                };
                gpu.scene_renderer
                    .upload_gizmo(gpu.engine.device(), gpu.engine.queue(), &handles);
            }

            gpu.scene_renderer.render_viewport(
                &mut frame.encoder,
                &viewport.scene_pass_inputs(),
                &gpu.model,
                is_active,
            );
            gpu.compositor.composite(
                &mut frame.encoder,
                &frame.view,
                surface_size,
                &viewport.rect,
                viewport.blit_bind_group(),
            );
        }

        gpu.engine.end_frame(frame);
        pointer.end_frame();
        log::trace!("frame {} presented", self.pacer.frame_index());
        Ok(true)
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => self.pointer.cursor_left(),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.pointer.set_primary_button(state == ElementState::Pressed),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let Some(gpu) = self.gpu.as_mut() else {
                    return;
                };
                gpu.engine.resize(width, height);
                if let Err(e) = gpu.rebuild_viewports(&self.config, (width, height)) {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // The matching Resized event carries the new physical size.
                log::info!("scale factor changed to {}", scale_factor);
            }
            WindowEvent::RedrawRequested => {
                match self.render_frame() {
                    Ok(_) => self.pacer.frame_presented(Instant::now()),
                    Err(e) => self.fail(event_loop, e),
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        if self.pacer.is_due(Instant::now()) {
            window.request_redraw();
        }
        match self.pacer.deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Poll),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = self.gpu.take() {
            gpu.shutdown();
        }
        self.window = None;
        log::info!("shut down after {} frames", self.pacer.frame_index());
    }
}
