//! Heartbeat Reveal - tap the heart, hear it beat, reveal the video
//!
//! The window title stands in for the page: it reads the reveal flag and the
//! companion media state each time the controller may have changed them.

use clap::Parser;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use heartbeat_reveal::audio::{AudioSessionManager, CpalBackend, ThreadTimer};
use heartbeat_reveal::cli::{Args, RunMode};
use heartbeat_reveal::params::{SessionConfig, HEARTBEAT_PATTERN};
use heartbeat_reveal::render::{render_heartbeat, write_wav};
use heartbeat_reveal::reveal::{TransitionController, VideoPlayback};

/// Companion media handle; starts muted and paused like an autoplay-muted video
#[derive(Debug)]
struct CompanionMedia {
    muted: bool,
    playing: bool,
}

impl Default for CompanionMedia {
    fn default() -> Self {
        Self {
            muted: true,
            playing: false,
        }
    }
}

impl VideoPlayback for CompanionMedia {
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn play(&mut self) -> heartbeat_reveal::Result<()> {
        self.playing = true;
        tracing::info!("companion media playing");
        Ok(())
    }
}

type Controller = TransitionController<CompanionMedia, AudioSessionManager>;

fn device_controller(config: SessionConfig) -> Controller {
    let manager =
        AudioSessionManager::with_config(Arc::new(CpalBackend), Arc::new(ThreadTimer), config);
    TransitionController::new(manager)
}

/// Main application state
struct App {
    window: Option<Window>,
    controller: Controller,
}

impl App {
    fn new(config: SessionConfig) -> Self {
        Self {
            window: None,
            controller: device_controller(config),
        }
    }

    /// Presentation derived from the reveal flag
    fn title(&self) -> String {
        if !self.controller.is_revealed() {
            return "Heartbeat Reveal - tap the heart".to_string();
        }
        self.controller.with_video_ref(|media| match media {
            Some(media) if media.playing && !media.muted => {
                "Heartbeat Reveal - revealed, media playing with sound".to_string()
            }
            _ => "Heartbeat Reveal - revealed".to_string(),
        })
    }

    fn on_gesture(&mut self) {
        self.controller.trigger();
        if let Some(window) = &self.window {
            window.set_title(&self.title());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.title())
            .with_inner_size(winit::dpi::LogicalSize::new(480.0, 480.0));

        match event_loop.create_window(window_attributes) {
            Ok(window) => {
                self.window = Some(window);
                // Media handle exists only once there is something to show it in
                self.controller.attach_video(CompanionMedia::default());
                println!("Click the window (or press Space) to reveal, ESC to quit\n");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Space | KeyCode::Enter),
                        repeat: false,
                        ..
                    },
                ..
            } => self.on_gesture(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.on_gesture(),
            _ => {}
        }
    }
}

fn run_render(
    path: &std::path::Path,
    config: &SessionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let samples = render_heartbeat(&HEARTBEAT_PATTERN, config)?;
    write_wav(path, &samples, config.sample_rate_hz)?;
    println!(
        "Rendered {} frames @ {}Hz to {}",
        samples.len(),
        config.sample_rate_hz,
        path.display()
    );
    Ok(())
}

fn run_headless(config: SessionConfig) {
    let teardown_after = config.teardown_after;
    let controller = device_controller(config).with_video(CompanionMedia::default());

    controller.trigger();
    tracing::info!(revealed = controller.is_revealed(), "triggered");

    // Outlive the session so the teardown runs before exit
    thread::sleep(teardown_after + Duration::from_millis(100));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.session_config();

    println!("Heartbeat Reveal");

    match args.run_mode() {
        RunMode::Render(path) => run_render(&path, &config)?,
        RunMode::Headless => run_headless(config),
        RunMode::Windowed => {
            let mut app = App::new(config);
            let event_loop = EventLoop::new()?;
            event_loop.run_app(&mut app)?;
        }
    }

    Ok(())
}
