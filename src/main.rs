use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{error, info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use shading_demos::app::print_summary;
use shading_demos::render::GpuContext;
use shading_demos::{
    ControlEvent, DemoConfig, DemoRenderer, DemoState, FrameLoop, KeyCode, LabelSink,
    MaterialGroup, MouseButton, NamedKey, Tick, Viewport,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = DemoConfig::load(&options.path)
        .with_context(|| format!("failed to load demo {}", options.path))?;
    info!("starting {} demo from {}", config.kind.name(), options.path);

    if options.summary_only {
        return run_headless(&config);
    }
    match run_interactive(&config) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(&config)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(config: &DemoConfig) -> Result<()> {
    let state = DemoState::load(config, DEFAULT_ASPECT, false)?;
    print_summary(&state);
    Ok(())
}

const DEFAULT_ASPECT: f32 = 1.0;

fn run_interactive(config: &DemoConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("Shading demo: {}", config.kind.name()))
            .with_inner_size(LogicalSize::new(800.0, 800.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let size = window.inner_size();
    let viewport = Viewport::new(size.width, size.height);
    let state = DemoState::load(config, viewport.aspect(), true)?;
    let gpu = block_on(GpuContext::for_window(&window))?;
    let renderer = DemoRenderer::new(&gpu, &state);

    let mut app = AppState {
        gpu,
        renderer,
        state,
        frames: FrameLoop::new(),
        viewport,
        labels: WindowLabels {
            window: Arc::clone(&window),
        },
        window,
        last_error: None,
    };
    app.state.publish_labels(&mut app.labels);

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    info!("rendered {} frames", app.frames.frames());
    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(())
}

/// Shows slider labels in the log and diagnostics in the window title.
struct WindowLabels {
    window: Arc<Window>,
}

impl LabelSink for WindowLabels {
    fn set_label(&mut self, _group: MaterialGroup, text: &str) {
        info!("{text}");
    }

    fn show_diagnostic(&mut self, message: &str) {
        error!("{message}");
        self.window.set_title(message);
    }
}

struct AppState {
    // Dropped before `window`, which backs the surface.
    gpu: GpuContext,
    renderer: DemoRenderer,
    state: DemoState,
    frames: FrameLoop,
    viewport: Viewport,
    labels: WindowLabels,
    window: Arc<Window>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.window.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.resize(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let keys = &self.state.session.keys;
                        let movement =
                            keys.move_mouse_to(Vec2::new(position.x as f32, position.y as f32));
                        let event = ControlEvent::PointerMoved {
                            buttons: keys.mouse_buttons(),
                            movement,
                        };
                        self.state.handle(event, &mut self.labels);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        self.state.session.keys.clear_mouse_position();
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.window.id() => {
                let Self {
                    gpu,
                    renderer,
                    state,
                    frames,
                    labels,
                    ..
                } = self;
                match frames.tick(|_| renderer.frame(gpu, state, labels)) {
                    Ok(Tick::Reschedule) => {}
                    Ok(Tick::Stop) => control_flow.set_exit(),
                    Err(err) => match err.downcast_ref::<wgpu::SurfaceError>() {
                        Some(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Some(wgpu::SurfaceError::OutOfMemory) => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        _ => return Err(err),
                    },
                }
            }
            Event::MainEventsCleared => {
                self.window.request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.viewport.update(width, height);
        let (width, height) = self.viewport.size();
        self.state.resize(width, height);
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput) {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        match input.state {
            ElementState::Pressed => {
                if keycode == KeyCode::Named(NamedKey::Escape) {
                    self.frames.cancel_handle().cancel();
                }
                self.state.key_pressed(keycode, &mut self.labels);
            }
            ElementState::Released => {
                self.state
                    .handle(ControlEvent::KeyUp(keycode), &mut self.labels);
            }
        }
    }

    fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Other(value) => value.min(15),
        } as u8;
        let button = MouseButton::new(index);
        let keys = &self.state.session.keys;
        match state {
            ElementState::Pressed => keys.set_mouse_button_down(button),
            ElementState::Released => keys.set_mouse_button_up(button),
        }
    }
}

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Return | Key::NumpadEnter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Up => KeyCode::Named(NamedKey::Up),
        Key::Down => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Back => KeyCode::Named(NamedKey::Backspace),
        Key::Delete => KeyCode::Named(NamedKey::Delete),
        Key::Insert => KeyCode::Named(NamedKey::Insert),
        Key::Capital => KeyCode::Named(NamedKey::CapsLock),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::End => KeyCode::Named(NamedKey::End),
        Key::PageUp => KeyCode::Named(NamedKey::PageUp),
        Key::PageDown => KeyCode::Named(NamedKey::PageDown),
        Key::LShift => KeyCode::Named(NamedKey::LeftShift),
        Key::RShift => KeyCode::Named(NamedKey::RightShift),
        Key::LControl => KeyCode::Named(NamedKey::LeftCtrl),
        Key::RControl => KeyCode::Named(NamedKey::RightCtrl),
        Key::LAlt => KeyCode::Named(NamedKey::LeftAlt),
        Key::RAlt => KeyCode::Named(NamedKey::RightAlt),
        Key::LWin => KeyCode::Named(NamedKey::LeftMeta),
        Key::RWin => KeyCode::Named(NamedKey::RightMeta),
        Key::Key0 | Key::Numpad0 => KeyCode::Digit(0),
        Key::Key1 | Key::Numpad1 => KeyCode::Digit(1),
        Key::Key2 | Key::Numpad2 => KeyCode::Digit(2),
        Key::Key3 | Key::Numpad3 => KeyCode::Digit(3),
        Key::Key4 | Key::Numpad4 => KeyCode::Digit(4),
        Key::Key5 | Key::Numpad5 => KeyCode::Digit(5),
        Key::Key6 | Key::Numpad6 => KeyCode::Digit(6),
        Key::Key7 | Key::Numpad7 => KeyCode::Digit(7),
        Key::Key8 | Key::Numpad8 => KeyCode::Digit(8),
        Key::Key9 | Key::Numpad9 => KeyCode::Digit(9),
        Key::A => KeyCode::Character('A'),
        Key::B => KeyCode::Character('B'),
        Key::C => KeyCode::Character('C'),
        Key::D => KeyCode::Character('D'),
        Key::E => KeyCode::Character('E'),
        Key::F => KeyCode::Character('F'),
        Key::G => KeyCode::Character('G'),
        Key::H => KeyCode::Character('H'),
        Key::I => KeyCode::Character('I'),
        Key::J => KeyCode::Character('J'),
        Key::K => KeyCode::Character('K'),
        Key::L => KeyCode::Character('L'),
        Key::M => KeyCode::Character('M'),
        Key::N => KeyCode::Character('N'),
        Key::O => KeyCode::Character('O'),
        Key::P => KeyCode::Character('P'),
        Key::Q => KeyCode::Character('Q'),
        Key::R => KeyCode::Character('R'),
        Key::S => KeyCode::Character('S'),
        Key::T => KeyCode::Character('T'),
        Key::U => KeyCode::Character('U'),
        Key::V => KeyCode::Character('V'),
        Key::W => KeyCode::Character('W'),
        Key::X => KeyCode::Character('X'),
        Key::Y => KeyCode::Character('Y'),
        Key::Z => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        Key::Minus | Key::NumpadSubtract => KeyCode::Character('-'),
        Key::Equals | Key::NumpadEquals => KeyCode::Character('='),
        Key::Comma | Key::NumpadComma => KeyCode::Character(','),
        Key::Period | Key::NumpadDecimal => KeyCode::Character('.'),
        Key::Slash | Key::NumpadDivide => KeyCode::Character('/'),
        Key::Semicolon => KeyCode::Character(';'),
        Key::Apostrophe => KeyCode::Character('\''),
        Key::Grave => KeyCode::Character('`'),
        Key::LBracket => KeyCode::Character('['),
        Key::RBracket => KeyCode::Character(']'),
        Key::Backslash => KeyCode::Character('\\'),
        Key::NumpadAdd => KeyCode::Character('+'),
        Key::NumpadMultiply => KeyCode::Character('*'),
        _ => return None,
    })
}

struct CliOptions {
    path: String,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!("Usage: shading-demos <demo.xml> [--summary-only]"));
        };
        let mut summary_only = false;
        for arg in args {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --summary-only"
                    ));
                }
            }
        }
        Ok(Self { path, summary_only })
    }
}
