use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use stepboy::{
    config::{EmulatorConfig, TraceConfig},
    gameboy::GameBoy,
    hardware::AccessGating,
    input::Button,
    ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
    serial::StdoutSink,
};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Frames run in headless mode when neither `--frames` nor `--cycles` is given.
const DEFAULT_HEADLESS_FRAMES: u64 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TraceTarget {
    Cpu,
    Ppu,
    Boot,
    Mem,
}

impl TraceTarget {
    fn module(self) -> &'static str {
        match self {
            TraceTarget::Cpu => "stepboy::cpu",
            TraceTarget::Ppu => "stepboy::ppu",
            TraceTarget::Boot => "stepboy::gameboy",
            TraceTarget::Mem => "stepboy::mmu",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Gating {
    Open,
    Dma,
    Strict,
}

impl From<Gating> for AccessGating {
    fn from(value: Gating) -> Self {
        match value {
            Gating::Open => AccessGating::Open,
            Gating::Dma => AccessGating::DmaOnly,
            Gating::Strict => AccessGating::Strict,
        }
    }
}

#[derive(Parser)]
#[command(name = "stepboy", version, about = "Cycle-stepped DMG Game Boy emulator")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Path to a 256-byte DMG boot ROM
    #[arg(long)]
    bootrom: Option<PathBuf>,

    /// Verbose logging; stop when the watchdog reports an anomaly
    #[arg(short, long)]
    debug: bool,

    /// Subsystems to trace (cpu, ppu, boot, mem)
    #[arg(long, value_enum, value_delimiter = ',')]
    trace: Vec<TraceTarget>,

    /// Bus access gating policy
    #[arg(long, value_enum, default_value = "dma")]
    gating: Gating,

    /// Drop writes into the cartridge ROM window instead of storing them
    #[arg(long)]
    protect_rom: bool,

    /// Run without opening a window
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long)]
    frames: Option<u64>,

    /// Number of CPU cycles to run in headless mode
    #[arg(long)]
    cycles: Option<u64>,

    /// Print serial output to stdout
    #[arg(long)]
    serial: bool,

    /// Write the last frame of a headless run to this PNG file
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Window scale factor
    #[arg(long, default_value_t = 3)]
    scale: u32,
}

impl Args {
    fn config(&self) -> EmulatorConfig {
        let mut trace = TraceConfig::default();
        for target in &self.trace {
            match target {
                TraceTarget::Cpu => trace.cpu = true,
                TraceTarget::Ppu => trace.ppu = true,
                TraceTarget::Boot => trace.boot = true,
                TraceTarget::Mem => trace.mem = true,
            }
        }
        EmulatorConfig {
            rom: self.rom.clone(),
            boot_rom: self.bootrom.clone(),
            trace,
            gating: self.gating.into(),
            protect_rom: self.protect_rom,
            debug: self.debug,
        }
    }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if args.debug {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    });
    for target in &args.trace {
        builder.filter_module(target.module(), LevelFilter::Trace);
    }
    // RUST_LOG wins over the flags.
    builder.parse_env(env_logger::Env::default());
    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let mut gb = match GameBoy::from_config(&args.config()) {
        Ok(gb) => gb,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if args.serial {
        gb.set_serial_sink(Box::new(StdoutSink));
    }

    if args.headless {
        run_headless(&mut gb, &args)
    } else {
        run_window(gb, &args)
    }
}

fn run_headless(gb: &mut GameBoy, args: &Args) -> ExitCode {
    let frame_limit = match (args.frames, args.cycles) {
        (None, None) => Some(DEFAULT_HEADLESS_FRAMES),
        (frames, _) => frames,
    };

    let mut frames = 0u64;
    loop {
        gb.run_frame();
        gb.clear_frame_flag();
        frames += 1;
        log_serial(gb);

        if args.debug
            && let Some(anomaly) = gb.take_anomaly()
        {
            warn!("stopping on {anomaly:?}");
            break;
        }
        if frame_limit.is_some_and(|max| frames >= max)
            || args.cycles.is_some_and(|max| gb.cpu.cycles >= max)
        {
            break;
        }
    }
    info!("ran {frames} frames ({} cycles)", gb.cpu.cycles);
    if args.debug {
        info!("{}", gb.cpu.debug_state());
    }

    if let Some(path) = &args.screenshot {
        if let Err(e) = save_screenshot(gb, path) {
            eprintln!("error: failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        info!("wrote {}", path.display());
    }
    ExitCode::SUCCESS
}

fn log_serial(gb: &mut GameBoy) {
    let serial = gb.take_serial();
    if !serial.is_empty() {
        debug!("serial: {}", String::from_utf8_lossy(&serial).escape_debug());
    }
}

fn save_screenshot(gb: &GameBoy, path: &Path) -> Result<(), image::ImageError> {
    let mut img = image::RgbaImage::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    for (px, &rgba) in img.pixels_mut().zip(gb.framebuffer().iter()) {
        *px = image::Rgba(rgba.to_be_bytes());
    }
    img.save(path)
}

fn button_for(code: KeyCode) -> Option<Button> {
    match code {
        KeyCode::ArrowRight => Some(Button::Right),
        KeyCode::ArrowLeft => Some(Button::Left),
        KeyCode::ArrowUp => Some(Button::Up),
        KeyCode::ArrowDown => Some(Button::Down),
        KeyCode::KeyZ | KeyCode::KeyS => Some(Button::A),
        KeyCode::KeyX | KeyCode::KeyA => Some(Button::B),
        KeyCode::Enter => Some(Button::Start),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Select),
        _ => None,
    }
}

/// Copy 0xRRGGBBAA pixels into the RGBA8 surface.
fn draw_frame(surface: &mut [u8], frame: &[u32]) {
    let surface: &mut [[u8; 4]] = bytemuck::cast_slice_mut(surface);
    for (dst, src) in surface.iter_mut().zip(frame) {
        *dst = src.to_be_bytes();
    }
}

struct App {
    gb: GameBoy,
    scale: u32,
    stop_on_anomaly: bool,
    // Declared before `window` so the surface is dropped first.
    pixels: Option<Pixels>,
    window: Option<Window>,
    failed: bool,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, msg: String) {
        error!("{msg}");
        self.failed = true;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.gb.run_frame();
        self.gb.clear_frame_flag();
        log_serial(&mut self.gb);

        if self.stop_on_anomaly
            && let Some(anomaly) = self.gb.take_anomaly()
        {
            warn!("stopping on {anomaly:?}");
            event_loop.exit();
            return;
        }

        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };
        draw_frame(pixels.frame_mut(), self.gb.framebuffer());
        if let Err(e) = pixels.render() {
            self.fail(event_loop, format!("render failed: {e}"));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let width = SCREEN_WIDTH as u32;
        let height = SCREEN_HEIGHT as u32;
        let attrs = Window::default_attributes()
            .with_title("stepboy")
            .with_inner_size(LogicalSize::new(width * self.scale, height * self.scale))
            .with_min_inner_size(LogicalSize::new(width, height));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => return self.fail(event_loop, format!("failed to create window: {e}")),
        };

        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, &window);
        match Pixels::new(width, height, surface) {
            Ok(pixels) => self.pixels = Some(pixels),
            Err(e) => return self.fail(event_loop, format!("failed to create surface: {e}")),
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut()
                    && let Err(e) = pixels.resize_surface(size.width, size.height)
                {
                    self.fail(event_loop, format!("resize failed: {e}"));
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if code == KeyCode::Escape {
                    if pressed {
                        event_loop.exit();
                    }
                } else if let Some(button) = button_for(code) {
                    self.gb.set_button(button, pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_window(gb: GameBoy, args: &Args) -> ExitCode {
    let event_loop = match EventLoop::new() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: failed to create event loop: {e}");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        gb,
        scale: args.scale.max(1),
        stop_on_anomaly: args.debug,
        pixels: None,
        window: None,
        failed: false,
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    if app.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
