//! Overlay application wiring
//!
//! Owns the winit event loop on the main thread. Each frame runs the
//! frame driver (quit check + click-through), advances the mascot and
//! redraws. The tray runs on its own thread and only talks to this loop
//! through the shared `OverlayContext`.

use anyhow::{anyhow, Context as _, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use windows::Win32::Foundation::HWND;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, StartCause, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::windows::WindowBuilderExtWindows;
use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::{Window, WindowBuilder, WindowLevel};

use crate::click_through::ClickThroughController;
use crate::config::{self, AppConfig};
use crate::focus::{HitObject, HitScene, HitTestProbe, LayerMask};
use crate::frame::{frame_interval, FrameDriver, FrameOutcome};
use crate::overlay::{OverlayContext, PresentationMode};
use crate::platform::win32::{self, prepare_overlay, Win32Cursor, Win32TrayBackend, Win32Window};
use crate::presentation::Presenter;
use crate::sprite::{Sprite, DEFAULT_HIT_THRESHOLD};
use crate::tray::{ContextMenuPresenter, TrayDispatcher, TrayIconService, TraySettings};
use crate::wander::Wanderer;
use crate::window::Rect;

/// Layer the mascot sprite is drawn on
const MASCOT_LAYER: u8 = 0;
/// Edge of the stand-in square drawn when the sprite asset is missing
const PLACEHOLDER_SIZE: u32 = 96;

/// Run the overlay until "Exit" is chosen from the tray
pub fn run(config: AppConfig) -> Result<()> {
    let (width, height) = config.overlay_size(win32::primary_screen_size());
    let presentation = if config.fullscreen {
        PresentationMode::Fullscreen
    } else {
        PresentationMode::Windowed
    };
    tracing::info!(width, height, ?presentation, "Starting overlay");

    let ctx = Arc::new(OverlayContext::new(presentation));

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let window = Rc::new(
        WindowBuilder::new()
            .with_title("Desktop Mascot")
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_skip_taskbar(true)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_position(PhysicalPosition::new(0, 0))
            .build(&event_loop)
            .context("Failed to create overlay window")?,
    );

    let hwnd = window_hwnd(&window)?;
    let native = Win32Window::new(hwnd);
    if let Err(e) = prepare_overlay(&native, Rect::from_origin_size(0, 0, width, height)) {
        tracing::warn!("Overlay transparency unavailable: {:#}", e);
    }
    ctx.attach_window(Arc::new(native))?;

    let sprite = load_sprite(&config);
    let mask = Arc::new(sprite.mask(DEFAULT_HIT_THRESHOLD));

    let scene = Arc::new(HitScene::new());
    let probe = HitTestProbe::new(
        Win32Cursor::new(hwnd),
        scene.clone(),
        LayerMask(config.click_layer_mask),
    );
    let controller = ClickThroughController::new(ctx.clone(), Box::new(probe), width, height);
    let mut frames = FrameDriver::new(ctx.clone(), controller);

    let mut wanderer = Wanderer::new(
        config.wander.clone(),
        Rect::from_origin_size(0, 0, width, height),
        (sprite.width(), sprite.height()),
        StdRng::from_entropy(),
    );
    let mut pose = wanderer.pose();

    let mut tray = Some(start_tray(&config, ctx.clone()));
    let mut presenter = Presenter::new(window.clone(), width, height)?;

    let interval = frame_interval(config.target_frame_rate);
    let mut last_frame = Instant::now();

    event_loop
        .run(move |event, elwt| match event {
            Event::NewEvents(StartCause::Init) | Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                let now = Instant::now();
                elwt.set_control_flow(ControlFlow::WaitUntil(now + interval));

                if frames.run_frame() == FrameOutcome::ExitRequested {
                    if let Some(mut service) = tray.take() {
                        service.shutdown();
                    }
                    elwt.exit();
                    return;
                }

                pose = wanderer.update(now - last_frame);
                last_frame = now;
                scene.set_objects(vec![HitObject {
                    bounds: Rect::from_origin_size(pose.x, pose.y, sprite.width(), sprite.height()),
                    layer: MASCOT_LAYER,
                    mask: Some(mask.clone()),
                    flip_x: pose.facing_left,
                }]);
                window.request_redraw();
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::RedrawRequested => {
                    if let Err(e) = presenter.draw(&sprite, pose) {
                        tracing::warn!("Failed to draw overlay: {:#}", e);
                    }
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => ctx.drag_window(),
                WindowEvent::CloseRequested => {
                    if let Some(mut service) = tray.take() {
                        service.shutdown();
                    }
                    elwt.exit();
                }
                _ => {}
            },
            Event::LoopExiting => {
                if let Some(mut service) = tray.take() {
                    service.shutdown();
                }
                tracing::info!("Overlay closed");
            }
            _ => {}
        })
        .map_err(|e| anyhow!("Event loop failed: {}", e))?;

    Ok(())
}

fn window_hwnd(window: &Window) -> Result<HWND> {
    let handle = window
        .window_handle()
        .map_err(|e| anyhow!("Overlay window has no native handle: {}", e))?;
    match handle.as_raw() {
        RawWindowHandle::Win32(handle) => Ok(HWND(handle.hwnd.get())),
        _ => Err(anyhow!("Overlay window is not a Win32 window")),
    }
}

fn load_sprite(config: &AppConfig) -> Sprite {
    let Some(path) = config::resolve_asset(&config.sprite_path) else {
        tracing::warn!(path = %config.sprite_path.display(), "Sprite not found, drawing placeholder");
        return Sprite::placeholder(PLACEHOLDER_SIZE);
    };
    match Sprite::load(&path) {
        Ok(sprite) => {
            tracing::info!(path = %path.display(), "Loaded sprite");
            sprite
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to load sprite, drawing placeholder: {}", e);
            Sprite::placeholder(PLACEHOLDER_SIZE)
        }
    }
}

/// A tray that fails to start leaves the overlay running without it
fn start_tray(config: &AppConfig, ctx: Arc<OverlayContext>) -> TrayIconService<Win32TrayBackend> {
    let icon_path = config::resolve_asset(&config.icon_path).unwrap_or_else(|| config.icon_path.clone());
    let settings = TraySettings {
        icon_path: Some(icon_path),
        tooltip: config.tooltip.clone(),
    };
    let menu = ContextMenuPresenter::new(ctx.clone(), config.exit_label.clone());
    let handler = Arc::new(TrayDispatcher::new(ctx, menu));

    let mut service = TrayIconService::new(Win32TrayBackend::new(), settings, handler);
    if let Err(e) = service.start() {
        tracing::error!("Tray icon disabled: {}", e);
    }
    service
}
