use log::{error, info, warn};
use playfield::audio::MixerAudio;
use playfield::host::{EventTranslator, HostAction};
use playfield::surface::sdl::SdlSurface;
use playfield::{Engine, FrameStatus, RuntimeConfig, RuntimeError};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod demo;

const FRAME_TIME: Duration = Duration::new(0, 1_000_000_000u32 / 60);

struct Args {
    project_dir: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut project_dir = None;
    let mut config = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let file = args.next().ok_or("--config needs a file")?;
                config = Some(PathBuf::from(file));
            }
            "-h" | "--help" => {
                println!("usage: playfield [PROJECT_DIR] [--config FILE]");
                std::process::exit(0);
            }
            _ if project_dir.is_none() => project_dir = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument: {}", arg)),
        }
    }
    Ok(Args {
        project_dir: project_dir.unwrap_or_else(|| PathBuf::from(".")),
        config,
    })
}

/// Largest whole-number scale that fits the logical size on the desktop.
fn calculate_window_scale(
    video_subsystem: &sdl2::VideoSubsystem,
    width: u32,
    height: u32,
) -> u32 {
    match video_subsystem.desktop_display_mode(0) {
        Ok(display_mode) => {
            // Leave 10% margin for taskbars/decorations
            let usable_w = (display_mode.w as f32 * 0.9) as u32;
            let usable_h = (display_mode.h as f32 * 0.9) as u32;
            let scale = (usable_w / width.max(1)).min(usable_h / height.max(1));
            scale.clamp(1, 3)
        }
        Err(e) => {
            warn!("could not detect monitor size ({}), using 1x scale", e);
            1
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = RuntimeConfig::discover(&args.project_dir, args.config.as_deref())
        .map_err(|e| e.to_string())?;

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context =
        sdl2::image::init(sdl2::image::InitFlag::PNG | sdl2::image::InitFlag::JPG)?;

    let window_scale = calculate_window_scale(&video_subsystem, config.width, config.height);
    let window_width = config.width * window_scale;
    let window_height = config.height * window_scale;
    info!("window {}x{} ({}x scale)", window_width, window_height, window_scale);

    let window = video_subsystem
        .window(&config.title, window_width, window_height)
        .position_centered()
        .resizable()
        .build()
        .map_err(|e| e.to_string())?;
    let canvas = window
        .into_canvas()
        .present_vsync()
        .build()
        .map_err(|e| e.to_string())?;
    let mut event_pump = sdl_context.event_pump()?;
    video_subsystem.text_input().start();
    let mut translator = EventTranslator::new();

    let (width, height) = (config.width, config.height);
    let mut engine = Engine::new(config);
    engine.initialize(Box::new(SdlSurface::new(canvas, width, height)?));

    match MixerAudio::new() {
        Ok(audio) => engine.context_mut().set_audio(Box::new(audio)),
        Err(e) => warn!("audio unavailable: {}", e),
    }

    demo::install(&mut engine);
    engine.start(Instant::now()).map_err(|e| e.to_string())?;

    'running: loop {
        for action in translator.poll(&mut event_pump) {
            match action {
                HostAction::Quit => break 'running,
                HostAction::Input(event) => {
                    if let Err(e) = engine.handle_input(event) {
                        error!("{}", e);
                    }
                }
            }
        }

        match engine.frame(Instant::now()) {
            Ok(FrameStatus::Running) => {}
            Ok(FrameStatus::Stopped) => std::thread::sleep(FRAME_TIME),
            Err(RuntimeError::Script(e)) => error!("script stopped: {}", e),
            Err(e) => error!("{}", e),
        }
    }

    Ok(())
}
